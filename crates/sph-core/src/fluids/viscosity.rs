use glam::Vec3;

use crate::config::FluidConfig;
use crate::fluids::SphKernels;
use crate::particle::ParticleSet;

/// Viscous acceleration of particle `i`.
///
/// a_i = mu / rho_i * sum_j (v_j - v_i) * lap_visc(|x_j - x_i|)
///
/// Pulls each velocity toward its neighbors' velocities. Uses the same
/// self and near-coincident pair exclusions as the pressure term.
pub fn viscosity_acceleration(
    particles: &ParticleSet,
    i: usize,
    kernels: &SphKernels,
    config: &FluidConfig,
) -> Vec3 {
    let pos_i = particles.position[i];
    let vel_i = particles.velocity[i];
    let mut acc = Vec3::ZERO;

    for &j in particles.neighbors_of(i) {
        let j = j as usize;
        if particles.id[j] == particles.id[i] {
            continue;
        }
        let dist = pos_i.distance(particles.position[j]);
        if dist < config.distance_epsilon {
            continue;
        }
        acc += (particles.velocity[j] - vel_i) * kernels.viscosity_laplacian(dist);
    }

    acc * config.viscosity / particles.density[i]
}
