// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/storage/src/binary.rs
//
// Binary artifacts (trained models, encoders, ...) in a small envelope:
//
//   magic "AIOB" | version u8 | flags u8 | payload
//
// The payload is the serde_json encoding of the value, zstd-compressed when
// flag bit 0 is set.
//
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

use artifact_io_core::{log_info, Error, Result};

use crate::finite::first_non_finite;
use crate::posix::{read_all, write_atomic};

const MAGIC: &[u8; 4] = b"AIOB";
pub const FORMAT_VERSION: u8 = 1;
const FLAG_ZSTD: u8 = 0b0000_0001;
const HEADER_LEN: usize = 6;

pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// How [`save_bin_with`] encodes the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinOptions {
    /// zstd level, or `None` to store the payload uncompressed.
    pub compression_level: Option<i32>,
}

impl Default for BinOptions {
    fn default() -> Self {
        Self {
            compression_level: Some(DEFAULT_COMPRESSION_LEVEL),
        }
    }
}

impl BinOptions {
    pub fn uncompressed() -> Self {
        Self {
            compression_level: None,
        }
    }

    pub fn with_level(level: i32) -> Self {
        Self {
            compression_level: Some(level),
        }
    }
}

/// Serialize `data` to `path` with the default options.
pub fn save_bin<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    save_bin_with(data, path, BinOptions::default())
}

/// Serialize `data` to `path`.
///
/// NaN and infinite floats cannot be restored from the payload, so a value
/// holding one fails with `Serialization` and nothing is written.
pub fn save_bin_with<T, P>(data: &T, path: P, options: BinOptions) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(found) = first_non_finite(data) {
        return Err(Error::serialization(
            path,
            format!("{found} cannot be stored (only finite floats round-trip)"),
        ));
    }
    let payload = serde_json::to_vec(data).map_err(|e| Error::serialization(path, e))?;
    let uncompressed_size = payload.len();

    let (flags, body) = match options.compression_level {
        Some(level) => {
            let compressed = zstd::encode_all(payload.as_slice(), level)
                .map_err(|e| Error::serialization(path, e))?;
            (FLAG_ZSTD, compressed)
        }
        None => (0, payload),
    };

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(FORMAT_VERSION);
    bytes.push(flags);
    bytes.extend_from_slice(&body);
    write_atomic(path, &bytes)?;

    debug!(
        "binary payload {} bytes -> {} bytes on disk (zstd: {})",
        uncompressed_size,
        bytes.len(),
        flags & FLAG_ZSTD != 0
    );
    log_info!("binary file saved at: {}", path.display());
    Ok(())
}

/// Restore a value written by [`save_bin`].
///
/// Files from another serializer or a newer envelope version fail with
/// `Deserialization`, as does a payload that does not match `T`.
pub fn load_bin<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = read_all(path)?;
    let payload = open_envelope(&bytes).map_err(|m| Error::deserialization(path, m))?;
    let value = serde_json::from_slice(&payload).map_err(|e| Error::deserialization(path, e))?;
    log_info!("binary file loaded from: {}", path.display());
    Ok(value)
}

fn open_envelope(bytes: &[u8]) -> std::result::Result<Cow<'_, [u8]>, String> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err("not a binary artifact (bad magic)".to_string());
    }
    let version = bytes[4];
    if version != FORMAT_VERSION {
        return Err(format!(
            "unsupported format version {version} (this build reads version {FORMAT_VERSION})"
        ));
    }
    let flags = bytes[5];
    if flags & !FLAG_ZSTD != 0 {
        return Err(format!("unknown flags {flags:#010b}"));
    }

    let body = &bytes[HEADER_LEN..];
    if flags & FLAG_ZSTD != 0 {
        zstd::decode_all(body)
            .map(Cow::Owned)
            .map_err(|e| format!("corrupt zstd payload: {e}"))
    } else {
        Ok(Cow::Borrowed(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifact_io_core::ErrorKind;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct LabelEncoder {
        classes: Vec<String>,
        index: BTreeMap<String, u32>,
    }

    fn encoder() -> LabelEncoder {
        let classes = vec!["normal".to_string(), "adenocarcinoma".to_string()];
        let index = classes.iter().cloned().zip(0u32..).collect();
        LabelEncoder { classes, index }
    }

    #[test]
    fn test_round_trip_compressed_and_plain() {
        let dir = tempdir().unwrap();
        for (name, options) in [
            ("zstd.bin", BinOptions::default()),
            ("plain.bin", BinOptions::uncompressed()),
            ("zstd19.bin", BinOptions::with_level(19)),
        ] {
            let path = dir.path().join(name);
            save_bin_with(&encoder(), &path, options).unwrap();
            let restored: LabelEncoder = load_bin(&path).unwrap();
            assert_eq!(restored, encoder(), "{}", name);
        }
    }

    #[test]
    fn test_header_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enc.bin");
        save_bin(&encoder(), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"AIOB");
        assert_eq!(bytes[4], FORMAT_VERSION);
        assert_eq!(bytes[5], FLAG_ZSTD);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enc.bin");
        save_bin(&vec![1u8; 4096], &path).unwrap();
        save_bin(&encoder(), &path).unwrap();
        let restored: LabelEncoder = load_bin(&path).unwrap();
        assert_eq!(restored, encoder());
    }

    #[test]
    fn test_foreign_and_corrupt_files() {
        let dir = tempdir().unwrap();

        let foreign = dir.path().join("model.pkl");
        fs::write(&foreign, b"\x80\x04\x95 pickled").unwrap();
        let err = load_bin::<LabelEncoder, _>(&foreign).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);

        let newer = dir.path().join("newer.bin");
        fs::write(&newer, b"AIOB\x02\x00{}").unwrap();
        let err = load_bin::<LabelEncoder, _>(&newer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
        assert!(err.to_string().contains("version 2"));

        let flags = dir.path().join("flags.bin");
        fs::write(&flags, b"AIOB\x01\x80{}").unwrap();
        assert_eq!(
            load_bin::<LabelEncoder, _>(&flags).unwrap_err().kind(),
            ErrorKind::Deserialization
        );

        let truncated = dir.path().join("truncated.bin");
        save_bin(&encoder(), &truncated).unwrap();
        let bytes = fs::read(&truncated).unwrap();
        fs::write(&truncated, &bytes[..bytes.len() - 5]).unwrap();
        assert_eq!(
            load_bin::<LabelEncoder, _>(&truncated).unwrap_err().kind(),
            ErrorKind::Deserialization
        );
    }

    #[test]
    fn test_wrong_target_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enc.bin");
        save_bin(&encoder(), &path).unwrap();
        let err = load_bin::<Vec<f32>, _>(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn test_missing_file_is_io() {
        let dir = tempdir().unwrap();
        let err = load_bin::<LabelEncoder, _>(dir.path().join("absent.bin")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_non_finite_weights_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.bin");
        for weights in [
            vec![0.5f32, f32::NAN],
            vec![f32::INFINITY, 0.5],
            vec![0.5, 1.0, f32::NEG_INFINITY],
        ] {
            let err = save_bin(&weights, &path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Serialization);
            assert_eq!(err.path(), Some(path.as_path()));
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_non_finite_save_keeps_previous_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.bin");
        save_bin(&vec![0.5f32, 0.25], &path).unwrap();

        let err = save_bin(&vec![0.5f32, f32::NAN, f32::INFINITY], &path).unwrap_err();
        assert!(err.to_string().contains("[1] = NaN"), "{}", err);

        let restored: Vec<f32> = load_bin(&path).unwrap();
        assert_eq!(restored, vec![0.5, 0.25]);
    }

    #[test]
    fn test_unserializable_value_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pairs.bin");
        let mut pairs = BTreeMap::new();
        pairs.insert((0u8, 1u8), "normal");

        let err = save_bin(&pairs, &path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert!(!path.exists());
    }

    #[traced_test]
    #[test]
    fn test_logs_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enc.bin");
        save_bin(&encoder(), &path).unwrap();
        load_bin::<LabelEncoder, _>(&path).unwrap();

        assert!(logs_contain(&format!("binary file saved at: {}", path.display())));
        assert!(logs_contain(&format!("binary file loaded from: {}", path.display())));
    }
}
