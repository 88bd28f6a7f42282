use crate::boundary::resolve_boundaries;
use crate::config::FluidConfig;
use crate::error::ConfigError;
use crate::fluids::{self, SphKernels};
use crate::grid::{self, NeighborSearch};
use crate::particle::ParticleSet;
use crate::stats::StepStats;
use glam::Vec3;

/// Fixed-timestep SPH solver over a fixed particle population.
///
/// Each [`step`](Solver::step) runs six stages, every one finishing for all
/// particles before the next starts:
///
/// 1. external forces (gravity)
/// 2. spatial index (cells, hashes, grid rebuild, neighbor sets)
/// 3. density and pressure
/// 4. pressure and viscosity accelerations -> velocity
/// 5. position integration
/// 6. boundary resolution
///
/// The stages are public so an embedder can run or inspect them one at a time.
pub struct Solver {
    pub particles: ParticleSet,
    config: FluidConfig,
    kernels: SphKernels,
    grid: Box<dyn NeighborSearch>,
    accel_scratch: Vec<Vec3>,
    steps: u64,
}

impl Solver {
    /// Validate `config` and take ownership of the initial particle state.
    pub fn new(particles: ParticleSet, config: FluidConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let table_size = config.table_size_for(particles.count);
        tracing::info!(
            particles = particles.count,
            backend = ?config.grid_backend,
            table_size,
            h = config.smoothing_radius,
            dt = config.time_step,
            "SPH solver created"
        );

        Ok(Self {
            kernels: SphKernels::new(config.smoothing_radius),
            grid: grid::make_grid(config.grid_backend, table_size),
            accel_scratch: Vec::with_capacity(particles.count),
            particles,
            config,
            steps: 0,
        })
    }

    /// Advance the simulation by one `time_step`.
    pub fn step(&mut self) {
        let dt = self.config.time_step;

        self.apply_external_forces(dt);
        self.update_spatial_index();
        self.compute_density_pressure();
        self.apply_pressure_viscosity(dt);
        self.integrate(dt);
        self.resolve_boundaries();
        self.steps += 1;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let stats = self.stats();
            tracing::debug!(
                step = stats.step,
                min_density = stats.min_density,
                max_density = stats.max_density,
                max_speed = stats.max_speed,
                mean_neighbors = stats.mean_neighbors,
                "step complete"
            );
        }

        #[cfg(debug_assertions)]
        self.assert_finite();
    }

    /// Run `n` steps.
    pub fn step_n(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Stage 1: `v += dt * gravity`.
    pub fn apply_external_forces(&mut self, dt: f32) {
        let dv = self.config.gravity * dt;
        for vel in self.particles.velocity.iter_mut() {
            *vel += dv;
        }
    }

    /// Stage 2: recompute cells and hashes, rebuild the grid and every
    /// particle's neighbor set.
    pub fn update_spatial_index(&mut self) {
        grid::update_spatial_index(
            &mut self.particles,
            self.grid.as_mut(),
            self.config.smoothing_radius,
        );
    }

    /// Stage 3: density and pressure from the current neighbor sets.
    pub fn compute_density_pressure(&mut self) {
        fluids::compute_density_pressure(&mut self.particles, &self.kernels, &self.config);
    }

    /// Stage 4: pressure and viscosity accelerations, scaled by `dt`, into velocity.
    pub fn apply_pressure_viscosity(&mut self, dt: f32) {
        fluids::apply_pressure_viscosity(
            &mut self.particles,
            &self.kernels,
            &self.config,
            dt,
            &mut self.accel_scratch,
        );
    }

    /// Stage 5: `x += v * dt`.
    pub fn integrate(&mut self, dt: f32) {
        for (pos, vel) in self
            .particles
            .position
            .iter_mut()
            .zip(self.particles.velocity.iter())
        {
            *pos += *vel * dt;
        }
    }

    /// Stage 6: clamp into the boundary box and bounce.
    pub fn resolve_boundaries(&mut self) {
        resolve_boundaries(
            &mut self.particles,
            &self.config.bounds,
            self.config.collision_damping,
            self.config.rest_velocity_threshold,
        );
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSet {
        &mut self.particles
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    pub fn kernels(&self) -> &SphKernels {
        &self.kernels
    }

    /// The grid as built by the last spatial index pass.
    pub fn grid(&self) -> &dyn NeighborSearch {
        self.grid.as_ref()
    }

    /// Swap in a new configuration. The old one stays on error.
    pub fn set_config(&mut self, config: FluidConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.kernels = SphKernels::new(config.smoothing_radius);
        self.grid = grid::make_grid(
            config.grid_backend,
            config.table_size_for(self.particles.count),
        );
        self.config = config;
        Ok(())
    }

    /// Replace the particle store and restart the step counter.
    pub fn reset(&mut self, particles: ParticleSet) {
        self.grid = grid::make_grid(
            self.config.grid_backend,
            self.config.table_size_for(particles.count),
        );
        self.particles = particles;
        self.accel_scratch.clear();
        self.steps = 0;
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    pub fn stats(&self) -> StepStats {
        StepStats::collect(&self.particles, self.config.particle_mass, self.steps)
    }

    #[cfg(debug_assertions)]
    fn assert_finite(&self) {
        if let Some(i) = self.particles.first_non_finite() {
            tracing::warn!(
                particle = i,
                step = self.steps,
                position = ?self.particles.position[i],
                velocity = ?self.particles.velocity[i],
                density = self.particles.density[i],
                "non-finite particle state"
            );
            panic!("particle {i} has non-finite state after step {}", self.steps);
        }
    }
}
