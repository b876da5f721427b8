// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/files.rs
//
// Directory provisioning and file size inspection.
//
use std::{fs, path::Path};

use crate::error::{Error, Result};
use crate::log_info;

/// Create every directory in `paths`, in order, including missing parents.
///
/// Directories that already exist are left alone. Stops at the first
/// genuine filesystem error (permissions, a regular file in the way, ...).
pub fn create_directories<I, P>(paths: I, verbose: bool) -> Result<()>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for path in paths {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        if verbose {
            log_info!("created directory at: {}", path.display());
        }
    }
    Ok(())
}

/// Make sure the directory that will hold `file` exists.
pub fn ensure_parent_dir<P: AsRef<Path>>(file: P) -> Result<()> {
    match file.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Size of the file at `path` as `"~ N KB"`.
pub fn get_size<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::metadata(path).map_err(|e| Error::io(path, e))?.len();
    Ok(format!("~ {} KB", size_in_kb(bytes)))
}

/// `bytes / 1024` rounded half-to-even, so 1.5 KB → 2 and 2.5 KB → 2.
pub fn size_in_kb(bytes: u64) -> u64 {
    let whole = bytes / 1024;
    let rem = bytes % 1024;
    match rem.cmp(&512) {
        std::cmp::Ordering::Less => whole,
        std::cmp::Ordering::Greater => whole + 1,
        std::cmp::Ordering::Equal => whole + (whole & 1),
    }
}
