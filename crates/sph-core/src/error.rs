use std::fmt;

/// Error returned when a [`FluidConfig`](crate::config::FluidConfig) cannot be
/// used to run a simulation.
#[derive(Debug)]
pub enum ConfigError {
    /// A scale parameter that must be strictly positive was zero or negative.
    NonPositive { field: &'static str, value: f32 },
    /// A coefficient that must be non-negative was negative.
    Negative { field: &'static str, value: f32 },
    /// A parameter was NaN or infinite.
    NonFinite { field: &'static str },
    /// Collision damping must lie in `[-1, 0)` so a bounce reverses and loses energy.
    InvalidDamping(f32),
    /// The boundary box has an axis where `min >= max`.
    InvalidBounds { min: [f32; 3], max: [f32; 3] },
    /// The configuration file could not be read.
    Io(std::io::Error),
    /// The configuration file was not valid JSON for a `FluidConfig`.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{field} must be non-negative, got {value}")
            }
            ConfigError::NonFinite { field } => write!(f, "{field} must be finite"),
            ConfigError::InvalidDamping(d) => {
                write!(f, "collision_damping must be in [-1, 0), got {d}")
            }
            ConfigError::InvalidBounds { min, max } => {
                write!(f, "boundary box min {min:?} must be below max {max:?} on every axis")
            }
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config JSON: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
