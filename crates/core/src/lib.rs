//! Core file helpers for ML pipeline tooling ─ YAML config loading, directory
//! provisioning and file size inspection, plus the shared error type and
//! logging seam used by `artifact_io_storage`.

pub mod config;
pub mod error;
pub mod files;
pub mod logging;

pub use config::{read_yaml, read_yaml_str, yaml_to_json, Config};
pub use error::{Error, ErrorKind, Result};
pub use files::{create_directories, ensure_parent_dir, get_size, size_in_kb};
pub use logging::{init_tracing, install_logger, installed_logger, InfoLog, TracingLog};
