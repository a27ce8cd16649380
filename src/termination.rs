//! Read-merge-write of termination message files.
//!
//! A termination message is a JSON array of result records. Each append reads
//! whatever array is already on disk, puts the new records after it, and
//! writes the combined array back in one durable step.
use crate::errors::{AppendError, AppendResult};
use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

mod message;
mod persist;

pub use message::{parse_message, read_message};

/// Byte limit the container runtime applies to a termination message.
pub const KUBERNETES_MESSAGE_LIMIT: usize = 4096;

/// What to do when the existing file is not a valid record array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptPriorPolicy {
    /// Drop the unreadable content and write only the new records.
    #[default]
    Discard,
    /// Refuse to write and report the parse failure.
    Fail,
}

/// How the combined message reaches the disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Sibling temp file, fsync, rename over the target.
    #[default]
    Atomic,
    /// Truncate the target and rewrite it from offset 0.
    Truncate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOptions {
    pub on_corrupt: CorruptPriorPolicy,
    pub write_mode: WriteMode,
    pub max_bytes: Option<usize>,
}

/// Append `new_records` to the message at `path` with default options.
pub fn append<T>(path: &Path, new_records: &[T]) -> AppendResult<()>
where
    T: Serialize + DeserializeOwned,
{
    append_results(path, new_records, &AppendOptions::default())
}

/// Append `new_records` after any records already stored at `path`.
///
/// A missing file counts as an empty array. Nothing is written when reading,
/// encoding, or the size check fails.
pub fn append_results<T>(
    path: &Path,
    new_records: &[T],
    options: &AppendOptions,
) -> AppendResult<()>
where
    T: Serialize + DeserializeOwned,
{
    let prior: Vec<T> = load_prior(path, options.on_corrupt)?;
    let prior_count = prior.len();
    tracing::debug!(path = %path.display(), prior = prior_count, "loaded prior results");

    let mut combined: Vec<&T> = Vec::with_capacity(prior_count + new_records.len());
    combined.extend(prior.iter());
    combined.extend(new_records.iter());
    let bytes = serde_json::to_vec(&combined).map_err(AppendError::Serialize)?;

    if let Some(limit) = options.max_bytes {
        if bytes.len() > limit {
            return Err(AppendError::TooLarge {
                size: bytes.len(),
                limit,
            });
        }
    }

    tracing::debug!(mode = %options.write_mode, "writing termination message");
    persist::write_message(path, &bytes, options.write_mode)?;
    tracing::info!(
        path = %path.display(),
        prior = prior_count,
        appended = new_records.len(),
        bytes = bytes.len(),
        "appended results"
    );
    Ok(())
}

fn load_prior<T: DeserializeOwned>(
    path: &Path,
    on_corrupt: CorruptPriorPolicy,
) -> AppendResult<Vec<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(AppendError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice::<Option<Vec<T>>>(&bytes) {
        Ok(records) => Ok(records.unwrap_or_default()),
        Err(source) => match on_corrupt {
            CorruptPriorPolicy::Discard => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "discarding unparseable termination message content"
                );
                Ok(Vec::new())
            }
            CorruptPriorPolicy::Fail => Err(AppendError::CorruptPrior {
                path: path.to_path_buf(),
                source,
            }),
        },
    }
}

impl CorruptPriorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorruptPriorPolicy::Discard => "discard",
            CorruptPriorPolicy::Fail => "fail",
        }
    }
}

impl fmt::Display for CorruptPriorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorruptPriorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "discard" => Ok(CorruptPriorPolicy::Discard),
            "fail" => Ok(CorruptPriorPolicy::Fail),
            other => Err(anyhow!(
                "unknown corrupt-content policy {other:?} (expected discard or fail)"
            )),
        }
    }
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Atomic => "atomic",
            WriteMode::Truncate => "truncate",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "atomic" => Ok(WriteMode::Atomic),
            "truncate" => Ok(WriteMode::Truncate),
            other => Err(anyhow!(
                "unknown write mode {other:?} (expected atomic or truncate)"
            )),
        }
    }
}
