// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/error.rs
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure surfaced by the artifact helpers.
///
/// Nothing is retried or swallowed here; callers branch on [`Error::kind`]
/// to decide their own retry/abort policy.
#[derive(Error, Debug)]
pub enum Error {
    #[error("yaml file is empty: {path}: {reason}")]
    EmptyConfig { path: PathBuf, reason: String },

    #[error("failed to parse {format} at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid base64 payload: {message}")]
    Decode { message: String },

    #[error("failed to deserialize binary artifact {path}: {message}")]
    Deserialization { path: PathBuf, message: String },

    #[error("failed to serialize artifact for {path}: {message}")]
    Serialization { path: PathBuf, message: String },

    #[error("expected a mapping at the top level, found {found}")]
    NotAMapping { found: &'static str },

    #[error("config key '{path}' is missing")]
    MissingKey { path: String },
}

/// Copyable discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyConfig,
    Parse,
    Io,
    Decode,
    Deserialization,
    Serialization,
    NotAMapping,
    MissingKey,
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, format: &'static str, message: impl ToString) -> Self {
        Error::Parse {
            path: path.as_ref().to_path_buf(),
            format,
            message: message.to_string(),
        }
    }

    pub fn empty_config(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::EmptyConfig {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn deserialization(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Error::Deserialization {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn serialization(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Error::Serialization {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn decode(message: impl ToString) -> Self {
        Error::Decode {
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyConfig { .. } => ErrorKind::EmptyConfig,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Io { .. } => ErrorKind::Io,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Deserialization { .. } => ErrorKind::Deserialization,
            Error::Serialization { .. } => ErrorKind::Serialization,
            Error::NotAMapping { .. } => ErrorKind::NotAMapping,
            Error::MissingKey { .. } => ErrorKind::MissingKey,
        }
    }

    /// Path the failure relates to, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::EmptyConfig { path, .. }
            | Error::Parse { path, .. }
            | Error::Io { path, .. }
            | Error::Deserialization { path, .. }
            | Error::Serialization { path, .. } => Some(path),
            Error::Decode { .. } | Error::NotAMapping { .. } | Error::MissingKey { .. } => None,
        }
    }
}
