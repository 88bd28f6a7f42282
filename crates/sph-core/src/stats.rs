use crate::particle::ParticleSet;

/// Summary of the particle store after a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    /// Number of completed steps.
    pub step: u64,
    pub min_density: f32,
    pub max_density: f32,
    pub mean_density: f32,
    pub max_speed: f32,
    pub mean_neighbors: f32,
    pub max_neighbors: usize,
    /// Sum of 0.5 * m * |v|^2.
    pub kinetic_energy: f64,
}

impl StepStats {
    /// Collect stats over `particles`. An empty store gives all zeros.
    pub fn collect(particles: &ParticleSet, particle_mass: f32, step: u64) -> Self {
        if particles.is_empty() {
            return Self {
                step,
                ..Self::default()
            };
        }

        let n = particles.count;
        let mut min_density = f32::INFINITY;
        let mut max_density = f32::NEG_INFINITY;
        let mut density_sum = 0.0_f64;
        let mut max_speed_sq = 0.0_f32;
        let mut kinetic_energy = 0.0_f64;
        let mut max_neighbors = 0;

        for i in 0..n {
            let rho = particles.density[i];
            min_density = min_density.min(rho);
            max_density = max_density.max(rho);
            density_sum += rho as f64;

            let speed_sq = particles.velocity[i].length_squared();
            max_speed_sq = max_speed_sq.max(speed_sq);
            kinetic_energy += 0.5 * particle_mass as f64 * speed_sq as f64;

            max_neighbors = max_neighbors.max(particles.neighbors_of(i).len());
        }

        Self {
            step,
            min_density,
            max_density,
            mean_density: (density_sum / n as f64) as f32,
            max_speed: max_speed_sq.sqrt(),
            mean_neighbors: particles.neighbors.total() as f32 / n as f32,
            max_neighbors,
            kinetic_energy,
        }
    }
}
