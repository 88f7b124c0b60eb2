use thiserror::Error;

use super::config::ConfigError;
use crate::core::forcefield::params::ForcefieldError;
use crate::core::models::annotation::AnnotationError;
use crate::core::models::sequence::SequenceError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The run cannot start: no usable annotation, unreadable input, or bad settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The annotation file was read but its content is unusable.
    #[error("Failed to parse annotation '{path}': {source}", path = path.display())]
    Annotation {
        path: PathBuf,
        #[source]
        source: AnnotationError,
    },

    /// Annotation files disagree on frame count or chain set.
    #[error("Inconsistent annotation files: {source}")]
    Consistency {
        #[source]
        source: AnnotationError,
    },

    #[error("Invalid sequence: {source}")]
    Sequence {
        #[from]
        source: SequenceError,
    },

    #[error("Invalid layout configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Forcefield error: {source}")]
    Forcefield {
        #[from]
        source: ForcefieldError,
    },
}
