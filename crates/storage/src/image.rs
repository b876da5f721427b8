// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/storage/src/image.rs
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

use artifact_io_core::{Error, Result};

use crate::posix::{read_all, write_atomic};

const BASE64_MARKER: &[u8] = b";base64,";

/// Base64 (standard alphabet, padded, unwrapped) of the file at `path`.
pub fn encode_image_to_base64<P: AsRef<Path>>(path: P) -> Result<String> {
    let bytes = read_all(path)?;
    Ok(STANDARD.encode(bytes))
}

/// The file at `path` as a `data:<mime>;base64,...` URI.
pub fn encode_image_to_data_uri<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let payload = encode_image_to_base64(path)?;
    Ok(format!("data:{};base64,{}", mime_for(path), payload))
}

/// Decode a base64 payload (bare, or wrapped in a data URI) into `path`.
///
/// The payload is validated before the target is touched: invalid input
/// leaves no new file behind and an existing file keeps its contents.
pub fn decode_image<E, P>(encoded: E, path: P) -> Result<()>
where
    E: AsRef<[u8]>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = decode_payload(encoded.as_ref())?;
    write_atomic(path, &bytes)?;
    debug!("decoded {} image bytes into {}", bytes.len(), path.display());
    Ok(())
}

fn decode_payload(raw: &[u8]) -> Result<Vec<u8>> {
    let raw = raw.trim_ascii();
    let body = if raw.starts_with(b"data:") {
        raw.windows(BASE64_MARKER.len())
            .position(|w| w == BASE64_MARKER)
            .map(|pos| &raw[pos + BASE64_MARKER.len()..])
            .ok_or_else(|| Error::decode("data URI without a ';base64,' payload"))?
    } else {
        raw
    };
    STANDARD.decode(body).map_err(Error::decode)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifact_io_core::ErrorKind;
    use std::fs;
    use tempfile::tempdir;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_known_encoding() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        fs::write(&path, PNG_SIGNATURE).unwrap();
        assert_eq!(encode_image_to_base64(&path).unwrap(), "iVBORw0KGgo=");
    }

    #[test]
    fn test_data_uri_round_trip() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("scan.JPG");
        fs::write(&src, [0xFFu8, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();

        let uri = encode_image_to_data_uri(&src).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));

        let out = dir.path().join("decoded.jpg");
        decode_image(&uri, &out).unwrap();
        assert_eq!(fs::read(&out).unwrap(), fs::read(&src).unwrap());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("input.png");
        decode_image("  iVBORw0KGgo=\r\n", &out).unwrap();
        assert_eq!(fs::read(&out).unwrap(), PNG_SIGNATURE);
    }

    #[test]
    fn test_invalid_payload_creates_no_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("input.png");
        for bad in ["not base64!", "iVBORw0KGgo", "data:image/png,iVBORw0KGgo="] {
            let err = decode_image(bad, &out).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decode, "{}", bad);
            assert!(!out.exists());
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_payload_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("input.png");
        fs::write(&out, PNG_SIGNATURE).unwrap();

        assert!(decode_image("%%%", &out).is_err());
        assert_eq!(fs::read(&out).unwrap(), PNG_SIGNATURE);
    }

    #[test]
    fn test_unwritable_target_is_io() {
        let dir = tempdir().unwrap();
        let err = decode_image("iVBORw0KGgo=", dir.path().join("missing/input.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for(Path::new("a.png")), "image/png");
        assert_eq!(mime_for(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.tiff")), "image/tiff");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }
}
