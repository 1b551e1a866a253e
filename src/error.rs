use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong below the command layer. Components return
/// these to their caller; only `main` turns them into a message and a
/// non-zero exit.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot determine the user configuration directory")]
    ConfigDirUnavailable,

    #[error("failed to create config directory {path}: {source}")]
    CreateConfigDir { path: PathBuf, source: io::Error },

    #[error("failed to read {path}: {source}")]
    ReadStore { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    WriteStore { path: PathBuf, source: io::Error },

    #[error("malformed store file {path}: {source}")]
    MalformedStore {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    SerializeStore {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Validation(String),

    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    #[error("no {kind} entry for {name} ({account})")]
    NotFound {
        kind: &'static str,
        name: String,
        account: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
