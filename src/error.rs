//! Error types for configuration and start-up.
//!
//! The simulation itself never fails; everything here happens before the
//! first frame is drawn.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("failed to parse config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Config values are out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid hex color '{0}', expected RRGGBB (e.g. 1a1b26)")]
    InvalidColor(String),

    /// Target timestamp does not exist in the local time zone
    #[error("invalid countdown target: {0}")]
    InvalidTarget(String),
}

pub type Result<T> = std::result::Result<T, Error>;
