use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Smallest bucket table the counting-sort grid will allocate.
const MIN_TABLE_SIZE: usize = 1024;

/// Axis-aligned box the particles are confined to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundaryBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box spanning `origin .. origin + size`.
    pub fn from_origin_size(origin: Vec3, size: Vec3) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive on both walls.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

impl Default for BoundaryBox {
    fn default() -> Self {
        Self::new(Vec3::splat(0.05), Vec3::new(8.0, 8.0, 4.0))
    }
}

/// Which neighbor-search structure the solver rebuilds every step.
///
/// Both answer the same 27-cell query; they differ only in how buckets are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridBackend {
    /// Fixed-size bucket table filled by counting sort. Hashes are reduced
    /// modulo the table size, so unrelated cells share buckets more often.
    #[default]
    CountingSort,
    /// `(hash, index)` pairs sorted by the full 32-bit hash with bucket starts
    /// found by binary search. Same layout an accelerator port builds with a
    /// sorting network.
    SortedKeys,
}

/// Constants an embedder sets once before stepping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidConfig {
    /// Kernel support radius `h`; also the grid cell size.
    pub smoothing_radius: f32,
    pub particle_mass: f32,
    /// Density at which pressure is zero.
    pub rest_density: f32,
    /// Stiffness of the linear equation of state.
    pub gas_constant: f32,
    pub viscosity: f32,
    pub gravity: Vec3,
    /// Fixed timestep in seconds.
    pub time_step: f32,
    pub bounds: BoundaryBox,
    /// Multiplier applied to the velocity component normal to a wall on contact.
    pub collision_damping: f32,
    /// After a bounce, velocity components below this magnitude are zeroed.
    /// `0.0` disables the cutoff.
    pub rest_velocity_threshold: f32,
    /// Floor added to every summed density.
    pub density_epsilon: f32,
    /// Pairs closer than this are skipped by the force stage.
    pub distance_epsilon: f32,
    /// Whether a particle's own `poly6(0)` term is part of its density.
    pub include_self_density: bool,
    /// Factor applied to the squared pair distance before it is fed to `poly6`
    /// in the density sum. The support cutoff still uses the unscaled distance.
    pub density_distance_scale: f32,
    pub grid_backend: GridBackend,
    /// Bucket count for [`GridBackend::CountingSort`]; `0` derives it from the
    /// particle count.
    pub grid_table_size: usize,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            density_distance_scale: 1.0,
            ..Self::reference_cpu()
        }
    }
}

impl FluidConfig {
    /// Constants of the CPU reference scene: a 10x10x10 block dropped into an
    /// 8x8x4 tank, including the rescaled density distance.
    pub fn reference_cpu() -> Self {
        Self {
            smoothing_radius: 1.5,
            particle_mass: 1.0,
            rest_density: 3.0,
            gas_constant: 50.0,
            viscosity: 0.003,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            time_step: 0.03,
            bounds: BoundaryBox::default(),
            collision_damping: -0.3,
            rest_velocity_threshold: 0.0,
            density_epsilon: 1e-2,
            distance_epsilon: 1e-2,
            include_self_density: true,
            density_distance_scale: 0.004,
            grid_backend: GridBackend::CountingSort,
            grid_table_size: 0,
        }
    }

    /// Constants of the accelerator scene: small support radius, 4x10x3 tank
    /// at the origin, sort-based neighbor buckets.
    pub fn reference_gpu() -> Self {
        Self {
            smoothing_radius: 0.1,
            particle_mass: 1.0,
            rest_density: 1.0,
            gas_constant: 1.0,
            viscosity: 1.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            time_step: 0.003,
            bounds: BoundaryBox::from_origin_size(Vec3::ZERO, Vec3::new(4.0, 10.0, 3.0)),
            collision_damping: -0.3,
            rest_velocity_threshold: 0.0,
            density_epsilon: 1e-5,
            distance_epsilon: 1e-5,
            include_self_density: true,
            density_distance_scale: 1.0,
            grid_backend: GridBackend::SortedKeys,
            grid_table_size: 0,
        }
    }

    /// Parse a JSON document and validate it. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FluidConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reject any configuration the solver must not run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("smoothing_radius", self.smoothing_radius),
            ("particle_mass", self.particle_mass),
            ("rest_density", self.rest_density),
            ("time_step", self.time_step),
            ("density_epsilon", self.density_epsilon),
            ("distance_epsilon", self.distance_epsilon),
            ("density_distance_scale", self.density_distance_scale),
        ];
        let non_negative = [
            ("gas_constant", self.gas_constant),
            ("viscosity", self.viscosity),
            ("rest_velocity_threshold", self.rest_velocity_threshold),
        ];

        for &(field, value) in positive.iter().chain(non_negative.iter()) {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFinite { field: "gravity" });
        }
        if !self.bounds.min.is_finite() || !self.bounds.max.is_finite() {
            return Err(ConfigError::NonFinite { field: "bounds" });
        }
        if !self.collision_damping.is_finite() {
            return Err(ConfigError::NonFinite { field: "collision_damping" });
        }

        for &(field, value) in &positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for &(field, value) in &non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(-1.0..0.0).contains(&self.collision_damping) {
            return Err(ConfigError::InvalidDamping(self.collision_damping));
        }
        if self.bounds.min.cmpge(self.bounds.max).any() {
            return Err(ConfigError::InvalidBounds {
                min: self.bounds.min.to_array(),
                max: self.bounds.max.to_array(),
            });
        }
        Ok(())
    }

    /// Bucket count the counting-sort grid uses for `particle_count` particles.
    pub fn table_size_for(&self, particle_count: usize) -> usize {
        if self.grid_table_size > 0 {
            self.grid_table_size
        } else {
            (particle_count * 2).next_power_of_two().max(MIN_TABLE_SIZE)
        }
    }
}
