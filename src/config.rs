//! Environment-derived defaults for the sidecar.
//!
//! Every setting can be overridden by a CLI flag; the environment only fills
//! in what the invocation leaves out.
use crate::termination::{
    AppendOptions, CorruptPriorPolicy, WriteMode, KUBERNETES_MESSAGE_LIMIT,
};
use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MESSAGE_PATH: &str = "/tekton/termination";

pub const ENV_PATH: &str = "TERMWRITE_PATH";
pub const ENV_ON_CORRUPT: &str = "TERMWRITE_ON_CORRUPT";
pub const ENV_WRITE_MODE: &str = "TERMWRITE_WRITE_MODE";
pub const ENV_MAX_BYTES: &str = "TERMWRITE_MAX_BYTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub path: PathBuf,
    pub append: AppendOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MESSAGE_PATH),
            append: AppendOptions::default(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        if let Some(path) = non_empty(lookup(ENV_PATH)) {
            settings.path = PathBuf::from(path);
        }
        if let Some(raw) = non_empty(lookup(ENV_ON_CORRUPT)) {
            settings.append.on_corrupt = parse_var::<CorruptPriorPolicy>(ENV_ON_CORRUPT, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_WRITE_MODE)) {
            settings.append.write_mode = parse_var::<WriteMode>(ENV_WRITE_MODE, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_MAX_BYTES)) {
            let limit = parse_max_bytes(&raw).with_context(|| format!("parse {ENV_MAX_BYTES}"))?;
            settings.append.max_bytes = Some(limit);
        }
        Ok(settings)
    }
}

/// Parse a byte limit: a positive integer, or `kubernetes` for the runtime limit.
pub fn parse_max_bytes(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    if raw == "kubernetes" {
        return Ok(KUBERNETES_MESSAGE_LIMIT);
    }
    let limit: usize = raw
        .parse()
        .with_context(|| format!("byte limit {raw:?} is not a number"))?;
    if limit == 0 {
        return Err(anyhow!("byte limit must be positive"));
    }
    Ok(limit)
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    raw.trim().parse().with_context(|| format!("parse {name}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<BTreeMap<_, _>>();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let settings = settings_from(&[]).expect("load settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.path, PathBuf::from("/tekton/termination"));
        assert_eq!(settings.append.on_corrupt, CorruptPriorPolicy::Discard);
        assert_eq!(settings.append.write_mode, WriteMode::Atomic);
        assert_eq!(settings.append.max_bytes, None);
    }

    #[test]
    fn reads_every_variable() {
        let settings = settings_from(&[
            (ENV_PATH, "/tmp/results.json"),
            (ENV_ON_CORRUPT, "fail"),
            (ENV_WRITE_MODE, "truncate"),
            (ENV_MAX_BYTES, "kubernetes"),
        ])
        .expect("load settings");
        assert_eq!(settings.path, PathBuf::from("/tmp/results.json"));
        assert_eq!(settings.append.on_corrupt, CorruptPriorPolicy::Fail);
        assert_eq!(settings.append.write_mode, WriteMode::Truncate);
        assert_eq!(settings.append.max_bytes, Some(4096));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let settings =
            settings_from(&[(ENV_PATH, ""), (ENV_WRITE_MODE, "  ")]).expect("load settings");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = settings_from(&[(ENV_ON_CORRUPT, "maybe")]).expect_err("bad policy");
        assert!(format!("{err:#}").contains(ENV_ON_CORRUPT), "got {err:#}");

        let err = settings_from(&[(ENV_MAX_BYTES, "lots")]).expect_err("bad limit");
        assert!(format!("{err:#}").contains(ENV_MAX_BYTES), "got {err:#}");
    }

    #[test]
    fn max_bytes_must_be_positive() {
        assert_eq!(parse_max_bytes("512").expect("parse"), 512);
        assert!(parse_max_bytes("0").is_err());
        assert!(parse_max_bytes("-1").is_err());
    }
}
