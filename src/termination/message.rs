//! Reading a termination message back into result records.
use crate::errors::MessageError;
use crate::record::ResultRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parse a termination message into one record per key, sorted by key.
///
/// Later records win over earlier ones with the same key. Records with every
/// field empty carry no result and are dropped.
pub fn parse_message(text: &str) -> Result<Vec<ResultRecord>, MessageError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Option<Vec<ResultRecord>> =
        serde_json::from_str(text).map_err(MessageError::Parse)?;

    let mut by_key = BTreeMap::new();
    for record in records.unwrap_or_default() {
        if record.is_empty() {
            tracing::warn!("termination message contains an empty result record");
            continue;
        }
        by_key.insert(record.key.clone(), record);
    }
    Ok(by_key.into_values().collect())
}

/// Read and reduce the termination message stored at `path`.
pub fn read_message(path: &Path) -> Result<Vec<ResultRecord>, MessageError> {
    let text = fs::read_to_string(path).map_err(|source| MessageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_message(&text)
}
