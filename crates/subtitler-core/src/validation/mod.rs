//! Validation modules

pub mod media;

pub use media::{
    validate_extension, validate_media_file, validate_size, DEFAULT_ALLOWED_EXTENSIONS,
    DEFAULT_MAX_FILE_SIZE_MB,
};
