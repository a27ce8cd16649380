//! Result records written into termination messages.
//!
//! The appender is generic over any serde record; this is the concrete shape
//! the sidecar writes and the orchestrator reads back.
use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Discriminates what produced a result.
///
/// Type names this crate does not know are kept verbatim in `Other` so that
/// records written by newer producers survive a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ResultType {
    TaskRunResult,
    PipelineResourceResult,
    #[default]
    Unknown,
    Other(String),
}

impl ResultType {
    /// CLI spelling; `Other` keeps its wire name.
    pub fn as_str(&self) -> &str {
        match self {
            ResultType::TaskRunResult => "task-run-result",
            ResultType::PipelineResourceResult => "pipeline-resource-result",
            ResultType::Unknown => "unknown",
            ResultType::Other(name) => name,
        }
    }

    fn wire_name(&self) -> &str {
        match self {
            ResultType::TaskRunResult => "TaskRunResult",
            ResultType::PipelineResourceResult => "PipelineResourceResult",
            ResultType::Unknown => "",
            ResultType::Other(name) => name,
        }
    }

    fn from_wire_name(name: String) -> Self {
        match name.as_str() {
            "TaskRunResult" => ResultType::TaskRunResult,
            "PipelineResourceResult" => ResultType::PipelineResourceResult,
            "" => ResultType::Unknown,
            _ => ResultType::Other(name),
        }
    }

    fn is_unknown(&self) -> bool {
        *self == ResultType::Unknown
    }
}

impl Serialize for ResultType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for ResultType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name.map(ResultType::from_wire_name).unwrap_or_default())
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "task-run-result" => Ok(ResultType::TaskRunResult),
            "pipeline-resource-result" => Ok(ResultType::PipelineResourceResult),
            "unknown" => Ok(ResultType::Unknown),
            other => Err(anyhow!(
                "unknown result type {other:?} (expected task-run-result, pipeline-resource-result, or unknown)"
            )),
        }
    }
}

/// Reads a JSON `null` string field as the empty string.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Resource a result was produced for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// One key/value outcome reported by a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_ref: Option<ResourceRef>,
    #[serde(rename = "type", default, skip_serializing_if = "ResultType::is_unknown")]
    pub result_type: ResultType,
}

impl ResultRecord {
    /// Build a task run result with no resource reference.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            resource_ref: None,
            result_type: ResultType::TaskRunResult,
        }
    }

    pub fn with_type(mut self, result_type: ResultType) -> Self {
        self.result_type = result_type;
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>) -> Self {
        self.resource_ref = Some(ResourceRef {
            name: name.into(),
            api_version: None,
        });
        self
    }

    /// True when every field holds its default value.
    pub fn is_empty(&self) -> bool {
        *self == ResultRecord::default()
    }
}

/// Split a `KEY=VALUE` argument at the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("result {raw:?} must be KEY=VALUE"))?;
    if key.trim().is_empty() {
        return Err(anyhow!("result {raw:?} has an empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}
