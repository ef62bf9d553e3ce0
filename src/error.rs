//! Error types for the run loop and its collaborators

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for a run
#[derive(Error, Debug)]
pub enum Error {
    #[error("Machine error: {0}")]
    Machine(#[from] MachineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Program image could not be turned into a runnable machine
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is empty")]
    Empty(PathBuf),

    #[error("{path} is {len} bytes; at most {max} fit")]
    TooLarge { path: PathBuf, len: usize, max: usize },
}

/// A step of the emulated machine failed; the run cannot continue
#[derive(Error, Debug)]
pub enum MachineError {
    #[error("no program loaded")]
    NotLoaded,

    #[error("machine halted at cycle {cycle}: {reason}")]
    Halted { cycle: u64, reason: String },
}

/// Persisted settings could not be read or written
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type alias for run-loop operations
pub type Result<T> = std::result::Result<T, Error>;
