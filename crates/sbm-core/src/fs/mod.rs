//! Filesystem primitives shared across features.

pub mod atomic;
pub mod checksum;

pub use atomic::{
    Placement, ensure_parent_dir, remove_file_if_exists, replace_file_atomic, unique_temp_path,
    write_file_atomic,
};
pub use checksum::hash_file;
