//! Property-based tests for the SPH pipeline using proptest
//!
//! Invariants checked over random particle layouts:
//! - density never drops below the density epsilon
//! - neighbor sets contain every particle within h, never self, sorted
//! - boundary resolution always leaves particles inside the box
//! - short simulations stay finite and contained

use glam::{IVec3, Vec3};
use proptest::prelude::*;
use sph_core::boundary::resolve_collision;
use sph_core::fluids::SphKernels;
use sph_core::grid::{hash_of, update_spatial_index, SortedHashGrid, SpatialHashGrid};
use sph_core::{FluidConfig, GridBackend, ParticleSet, Solver};

const SIMULATION_STEPS: usize = 10;

fn vec3_in(lo: f32, hi: f32) -> impl Strategy<Value = Vec3> {
    (lo..hi, lo..hi, lo..hi).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Positions anywhere in the reference tank.
fn tank_position() -> impl Strategy<Value = Vec3> {
    (0.05f32..8.0, 0.05f32..8.0, 0.05f32..4.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn particle_set() -> impl Strategy<Value = (Vec<Vec3>, Vec<Vec3>)> {
    (1usize..=60).prop_flat_map(|count| {
        (
            prop::collection::vec(tank_position(), count..=count),
            prop::collection::vec(vec3_in(-5.0, 5.0), count..=count),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_density_at_least_epsilon(
        positions in prop::collection::vec(vec3_in(-3.0, 3.0), 1..80),
        include_self in any::<bool>(),
    ) {
        let config = FluidConfig {
            include_self_density: include_self,
            ..FluidConfig::default()
        };
        let mut solver = Solver::new(ParticleSet::from_positions(&positions), config)
            .expect("valid config");
        solver.update_spatial_index();
        solver.compute_density_pressure();

        let eps = solver.config().density_epsilon;
        for (i, &rho) in solver.particles.density.iter().enumerate() {
            prop_assert!(rho.is_finite());
            prop_assert!(rho >= eps, "density[{}] = {} below {}", i, rho, eps);
        }
    }

    #[test]
    fn test_neighbor_sets_are_complete(
        positions in prop::collection::vec(vec3_in(-4.0, 4.0), 1..120),
        h in 0.2f32..1.5,
        table_size in 1usize..256,
    ) {
        let mut counting = ParticleSet::from_positions(&positions);
        let mut sorted = counting.clone();
        update_spatial_index(&mut counting, &mut SpatialHashGrid::new(table_size), h);
        update_spatial_index(&mut sorted, &mut SortedHashGrid::new(), h);

        for particles in [&counting, &sorted] {
            for i in 0..positions.len() {
                let found = particles.neighbors_of(i);
                prop_assert!(!found.contains(&(i as u32)), "{} lists itself", i);
                prop_assert!(found.windows(2).all(|w| w[0] < w[1]), "unsorted or duplicated");
                for j in 0..positions.len() {
                    if i != j && positions[i].distance(positions[j]) < h {
                        prop_assert!(found.contains(&(j as u32)), "{} missed neighbor {}", i, j);
                    }
                }
            }
        }
    }

    #[test]
    fn test_boundary_resolution_contains(
        position in vec3_in(-20.0, 20.0),
        velocity in vec3_in(-50.0, 50.0),
        damping in -1.0f32..-0.01,
    ) {
        let bounds = FluidConfig::default().bounds;
        let mut p = position;
        let mut v = velocity;
        resolve_collision(&mut p, &mut v, &bounds, damping, 0.0);

        prop_assert!(bounds.contains(p), "{} left the box", p);
        for axis in 0..3 {
            if position[axis] > bounds.min[axis] && position[axis] < bounds.max[axis] {
                prop_assert_eq!(p[axis], position[axis]);
                prop_assert_eq!(v[axis], velocity[axis]);
            } else {
                prop_assert!(v[axis].abs() <= velocity[axis].abs());
            }
        }
    }

    #[test]
    fn test_kernels_vanish_outside_support(h in 0.05f32..3.0, t in 1.0f32..4.0) {
        let k = SphKernels::new(h);
        let d = h * t;
        prop_assert_eq!(k.poly6(d * d), 0.0);
        prop_assert_eq!(k.spiky_gradient_magnitude(d), 0.0);
        prop_assert_eq!(k.viscosity_laplacian(d), 0.0);

        let inside = h / t;
        prop_assert!(k.poly6(inside * inside) >= 0.0);
        prop_assert!(k.spiky_gradient_magnitude(inside) <= 0.0);
        prop_assert!(k.viscosity_laplacian(inside) >= 0.0);
    }

    #[test]
    fn test_hash_matches_wrapping_formula(x in any::<i32>(), y in any::<i32>(), z in any::<i32>()) {
        let expected = (x as u32).wrapping_mul(73_856_093)
            ^ (y as u32).wrapping_mul(19_349_663)
            ^ (z as u32).wrapping_mul(83_492_791);
        prop_assert_eq!(hash_of(IVec3::new(x, y, z)), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn test_simulation_stays_finite_and_contained(
        (positions, velocities) in particle_set(),
        sorted_backend in any::<bool>(),
    ) {
        let config = FluidConfig {
            grid_backend: if sorted_backend { GridBackend::SortedKeys } else { GridBackend::CountingSort },
            ..FluidConfig::default()
        };
        let bounds = config.bounds;
        let particles = ParticleSet::from_positions(&positions).with_velocities(&velocities);
        let mut solver = Solver::new(particles, config).expect("valid config");

        solver.step_n(SIMULATION_STEPS);

        prop_assert_eq!(solver.particles.count, positions.len());
        prop_assert_eq!(solver.particles.first_non_finite(), None);
        for &p in &solver.particles.position {
            prop_assert!(bounds.contains(p), "{} escaped", p);
        }
    }
}
