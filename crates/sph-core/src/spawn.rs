use glam::{UVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::particle::ParticleSet;

/// Fills a block with particles on a regular lattice, each nudged by a random
/// offset so the initial state is not perfectly symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeSpawner {
    /// Particles per axis.
    pub rows: UVec3,
    /// Lattice spacing.
    pub spacing: f32,
    /// Position of lattice point (0, 0, 0).
    pub origin: Vec3,
    /// Length of the random offset added to every lattice point.
    pub jitter: f32,
    pub seed: u64,
    pub initial_velocity: Vec3,
}

impl LatticeSpawner {
    pub fn new(rows: UVec3, spacing: f32, origin: Vec3) -> Self {
        Self {
            rows,
            spacing,
            origin,
            jitter: 0.0,
            seed: 0,
            initial_velocity: Vec3::ZERO,
        }
    }

    /// `rows` particles along every axis.
    pub fn cube(rows: u32, spacing: f32, origin: Vec3) -> Self {
        Self::new(UVec3::splat(rows), spacing, origin)
    }

    /// The 10x10x10 block of the CPU reference scene, centered in its tank.
    pub fn reference_block() -> Self {
        Self::cube(10, 0.2, Vec3::ZERO)
            .centered_on(Vec3::new(4.0, 4.0, 2.0))
            .with_jitter(0.2)
    }

    /// Move the origin so the lattice is centered on `center`.
    pub fn centered_on(mut self, center: Vec3) -> Self {
        let extent = (self.rows.saturating_sub(UVec3::ONE)).as_vec3() * self.spacing;
        self.origin = center - extent * 0.5;
        self
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.initial_velocity = velocity;
        self
    }

    pub fn count(&self) -> usize {
        self.rows.x as usize * self.rows.y as usize * self.rows.z as usize
    }

    /// Lattice positions with jitter applied, x varying slowest.
    pub fn positions(&self) -> Vec<Vec3> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut positions = Vec::with_capacity(self.count());
        for x in 0..self.rows.x {
            for y in 0..self.rows.y {
                for z in 0..self.rows.z {
                    let lattice = self.origin + UVec3::new(x, y, z).as_vec3() * self.spacing;
                    let offset = if self.jitter > 0.0 {
                        random_unit_vector(&mut rng) * self.jitter
                    } else {
                        Vec3::ZERO
                    };
                    positions.push(lattice + offset);
                }
            }
        }
        positions
    }

    pub fn spawn(&self) -> ParticleSet {
        let mut particles = ParticleSet::from_positions(&self.positions());
        particles.velocity.fill(self.initial_velocity);
        particles
    }
}

/// Uniformly distributed direction, by rejection sampling the unit ball.
fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        let len2 = v.length_squared();
        if len2 > 1e-6 && len2 <= 1.0 {
            return v / len2.sqrt();
        }
    }
}
