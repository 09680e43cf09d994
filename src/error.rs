//! Error taxonomy
//!
//! Only configuration problems are errors. Missing entities and components are
//! treated as no-ops at the call site, and an exhausted sampler falls back to its
//! default item, so neither ever surfaces here.

use thiserror::Error;

/// Fatal problems detected while building a world from balance data.
///
/// Any of these prevents the session from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no levels configured")]
    NoLevels,

    #[error("level {level} has an empty spawn pool")]
    EmptySpawnPool { level: usize },

    #[error("unknown enemy id `{0}`")]
    UnknownEnemy(String),

    #[error("unknown boss id `{0}`")]
    UnknownBoss(String),

    #[error("unknown collision layer `{0}`")]
    UnknownLayer(String),

    #[error("invalid weight {weight} for `{item}`")]
    InvalidWeight { item: String, weight: f32 },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
