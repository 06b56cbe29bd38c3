use thiserror::Error;

/// Errors raised by the simulation engine and its configuration.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("tps must be a positive finite number, got {0}")]
    InvalidTps(f64),
    #[error("range `{name}` is inverted or not finite: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("invalid value for `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("sample is missing a value for `{0}`")]
    MissingSeries(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for SimError {
    fn from(err: serde_yaml::Error) -> Self {
        SimError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
