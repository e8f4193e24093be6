//! Load-time errors.
//!
//! Scheduled updates have no failure path; everything that can go wrong is
//! caught while the configuration is read and the behaviours are built.

use std::io;

use thiserror::Error;

/// Errors raised while loading configuration or building liquid behaviours.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),
    /// The config file is not valid JSON5 or does not match the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json5::Error),
    /// A value is out of range or contradicts another value.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// A liquid references a block code the registry does not know.
    #[error("liquid `{liquid}` references unknown block `{code}`")]
    UnknownBlock {
        /// The liquid whose settings hold the reference.
        liquid: String,
        /// The unresolved block code.
        code: String,
    },
}
