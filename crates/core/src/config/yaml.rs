// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/yaml.rs
use std::{fs, path::Path};

use super::{Config, IN_MEMORY};
use crate::error::{Error, Result};
use crate::log_info;

/// Load a YAML file into a [`Config`].
///
/// Empty, comment-only and `null` documents fail with `EmptyConfig`, as do
/// documents whose top level is a scalar or a sequence.
pub fn read_yaml<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let config = parse_yaml(&text, path)?.with_source(path);
    log_info!("yaml file: {} loaded successfully", path.display());
    Ok(config)
}

/// Same rules as [`read_yaml`], for text already in memory.
pub fn read_yaml_str(text: &str) -> Result<Config> {
    parse_yaml(text, Path::new(IN_MEMORY))
}

/// Convert YAML to pretty-printed JSON.
pub fn yaml_to_json(yaml_str: &str) -> Result<String> {
    let origin = Path::new(IN_MEMORY);
    let yaml_value = load_value(yaml_str, origin)?;
    serde_json::to_string_pretty(&yaml_value).map_err(|e| Error::parse(origin, "yaml", e))
}

/// Parse `text` and resolve `<<` merge keys.
fn load_value(text: &str, path: &Path) -> Result<serde_yaml::Value> {
    let mut value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| Error::parse(path, "yaml", e))?;
    value.apply_merge().map_err(|e| Error::parse(path, "yaml", e))?;
    Ok(value)
}

fn parse_yaml(text: &str, path: &Path) -> Result<Config> {
    if is_blank_document(text) {
        return Err(Error::empty_config(path, "document has no content"));
    }

    let raw = load_value(text, path)?;
    if raw.is_null() {
        return Err(Error::empty_config(path, "document is null"));
    }

    // YAML and JSON configs share one value model.
    let value = serde_json::to_value(&raw).map_err(|e| Error::parse(path, "yaml", e))?;
    Config::from_value(value).map_err(|e| match e {
        Error::NotAMapping { found } => {
            Error::empty_config(path, format!("top level is a {found}, not a mapping"))
        }
        other => other,
    })
}

fn is_blank_document(text: &str) -> bool {
    text.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}
