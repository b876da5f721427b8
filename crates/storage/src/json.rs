// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/storage/src/json.rs
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;

use artifact_io_core::{log_info, Config, Error, Result};

use crate::posix::{read_all, write_atomic};

/// Write `data` to `path` as JSON indented with four spaces, replacing any
/// existing file.
pub fn save_json<P, T>(path: P, data: &T) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let bytes = to_pretty_json(data).map_err(|e| Error::serialization(path, e))?;
    write_atomic(path, &bytes)?;
    log_info!("json file saved at: {}", path.display());
    Ok(())
}

/// Load a JSON object from `path` as a [`Config`].
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let bytes = read_all(path)?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| Error::parse(path, "json", e))?;
    let config = Config::from_value(value)?.with_source(path);
    log_info!("json file loaded successfully from: {}", path.display());
    Ok(config)
}

/// Load `path` straight into a typed value.
pub fn load_json_as<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = read_all(path)?;
    let value = serde_json::from_slice(&bytes).map_err(|e| Error::parse(path, "json", e))?;
    log_info!("json file loaded successfully from: {}", path.display());
    Ok(value)
}

fn to_pretty_json<T: Serialize + ?Sized>(data: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut ser)?;
    Ok(buf)
}
