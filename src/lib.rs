//! Append step results to a JSON termination message file.
//!
//! The sidecar calls [`termination::append_results`] after a step finishes;
//! the orchestrator reads the file back with [`termination::read_message`].
pub mod config;
pub mod errors;
pub mod record;
pub mod termination;

pub use config::Settings;
pub use errors::{AppendError, AppendResult, MessageError};
pub use record::{ResourceRef, ResultRecord, ResultType};
pub use termination::{
    append, append_results, parse_message, read_message, AppendOptions, CorruptPriorPolicy,
    WriteMode,
};
