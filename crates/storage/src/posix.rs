// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/storage/src/posix.rs
//
// Whole-file reads and crash-safe whole-file writes on the local filesystem.
//
use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicU64, Ordering},
};

use artifact_io_core::{Error, Result};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// Same bound as Linux ELOOP.
const MAX_SYMLINK_HOPS: usize = 40;

/// Temp file beside the destination. Removed on drop unless it was renamed
/// into place.
struct TempSibling {
    path: PathBuf,
    committed: bool,
}

impl TempSibling {
    fn for_target(target: &Path) -> Self {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            path: target.with_file_name(format!(".{name}.{}.{n}.tmp", process::id())),
            committed: false,
        }
    }
}

impl Drop for TempSibling {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Replace the file at `path` with `data`.
///
/// Readers see either the old contents or the new ones, never a partial
/// write. The parent directory must already exist. When `path` is a
/// symlink the file it points to is replaced and the link is kept; a
/// dangling link gets its target created.
pub fn write_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let target = resolve_symlinks(path)?;
    let mut tmp = TempSibling::for_target(&target);
    {
        let mut f = File::create(&tmp.path).map_err(|e| Error::io(path, e))?;
        f.write_all(data).map_err(|e| Error::io(path, e))?;
        f.sync_all().map_err(|e| Error::io(path, e))?;
    }
    fs::rename(&tmp.path, &target).map_err(|e| Error::io(path, e))?;
    tmp.committed = true;
    Ok(())
}

/// Follow `path` through any chain of symlinks to the path that holds the
/// data. The final component need not exist.
fn resolve_symlinks(path: &Path) -> Result<PathBuf> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let link = fs::read_link(&current).map_err(|e| Error::io(path, e))?;
                current = match current.parent() {
                    Some(parent) if link.is_relative() => parent.join(link),
                    _ => link,
                };
            }
            _ => return Ok(current),
        }
    }
    Err(Error::io(path, io::Error::other("too many levels of symbolic links")))
}

/// Read the entire file at `path`.
pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| Error::io(path, e))
}
