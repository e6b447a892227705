//! Subtitler Core Library
//!
//! Error types, client configuration, and media pre-validation shared by the
//! upload client and the command-line front end.

pub mod config;
pub mod error;
pub mod validation;

pub use config::ClientConfig;
pub use error::{CancelSource, UploadError};
