use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of a single append call.
#[derive(Debug, Error)]
pub enum AppendError {
    #[error("read termination message {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("existing content of {} is not a result array", path.display())]
    CorruptPrior {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize result records")]
    Serialize(#[source] serde_json::Error),

    #[error("termination message is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("write termination message {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure modes when reading a termination message back.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("read termination message {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse termination message JSON")]
    Parse(#[source] serde_json::Error),
}

pub type AppendResult<T> = Result<T, AppendError>;
