//! feedship core
//!
//! Pure building blocks for the image pipeline: revision to tag derivation,
//! the closed set of build targets, registry coordinates and the explicit
//! configuration populated once at pipeline start.

pub mod config;
pub mod error;
pub mod registry;
pub mod tag;
pub mod target;

pub use config::{Credentials, PipelineConfig, Secret};
pub use error::{CoreError, Result};
pub use registry::{ImageRef, RegistryReference};
pub use tag::{ImageTag, RevisionIdentifier, TAG_LENGTH, resolve};
pub use target::ImageTarget;
