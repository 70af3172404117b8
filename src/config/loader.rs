//! Configuration file loader.

use std::path::Path;

use tracing::warn;

use super::error::{ConfigError, ConfigResult};
use super::types::Config;

/// Fields accepted per entry of each known section list.
const FRONTEND_LISTS: &[(&str, &[&str])] = &[("tcp", &["name", "listenAddr", "target"])];

const BACKEND_LISTS: &[(&str, &[&str])] = &[
    ("echo", &["name"]),
    ("tcpForwarder", &["name", "targetAddr"]),
    (
        "wolForwarder",
        &["name", "targetAddr", "wolMACAddr", "wolBroadcastAddr"],
    ),
];

/// Loads and decodes configuration files.
///
/// Keys outside the schema do not fail the load; they are collected and
/// reported with a single warning so typos surface without taking the
/// daemon down.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or the
    /// TOML does not decode.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let value: toml::Value = toml::from_str(&content)?;

        let unknown = unknown_keys(&value);
        if !unknown.is_empty() {
            warn!(
                path = %path.display(),
                keys = ?unknown,
                "found unknown keys in config"
            );
        }

        Ok(value.try_into()?)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not decode.
    pub fn load_str(&self, content: &str) -> ConfigResult<Config> {
        let value: toml::Value = toml::from_str(content)?;

        let unknown = unknown_keys(&value);
        if !unknown.is_empty() {
            warn!(keys = ?unknown, "found unknown keys in config");
        }

        Ok(value.try_into()?)
    }
}

/// Collect dotted paths of all keys outside the configuration schema.
fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let mut unknown = Vec::new();

    let Some(root) = value.as_table() else {
        return unknown;
    };

    for (key, section) in root {
        match key.as_str() {
            "frontends" => collect_section(section, "frontends", FRONTEND_LISTS, &mut unknown),
            "backends" => collect_section(section, "backends", BACKEND_LISTS, &mut unknown),
            _ => unknown.push(key.clone()),
        }
    }

    unknown
}

fn collect_section(
    value: &toml::Value,
    section: &str,
    lists: &[(&str, &[&str])],
    unknown: &mut Vec<String>,
) {
    let Some(table) = value.as_table() else {
        unknown.push(section.to_string());
        return;
    };

    for (key, entries) in table {
        let Some((list, fields)) = lists.iter().find(|(list, _)| *list == key.as_str()) else {
            unknown.push(format!("{section}.{key}"));
            continue;
        };

        let Some(entries) = entries.as_array() else {
            continue;
        };

        for (index, entry) in entries.iter().enumerate() {
            let Some(entry) = entry.as_table() else {
                continue;
            };
            for field in entry.keys() {
                if !fields.contains(&field.as_str()) {
                    unknown.push(format!("{section}.{list}[{index}].{field}"));
                }
            }
        }
    }
}
