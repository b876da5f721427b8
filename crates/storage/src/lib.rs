//! Artifact stores for ML pipeline tooling ─ JSON documents, binary model
//! artifacts and base64-transported images, all written crash-safely.

pub mod binary;
mod finite;
pub mod image;
pub mod json;
pub mod posix;

pub use binary::{load_bin, save_bin, save_bin_with, BinOptions};
pub use image::{decode_image, encode_image_to_base64, encode_image_to_data_uri};
pub use json::{load_json, load_json_as, save_json};
pub use posix::{read_all, write_atomic};
