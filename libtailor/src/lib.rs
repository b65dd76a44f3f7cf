//! Tailor - Image Metadata Resolution Library
//!
//! Tailor resolves a docker image reference to the image's metadata record
//! on a v1 registry, falling back across the registry's mirrors, and
//! persists the parts of it that describe how the image runs.
//!
//! # Quick Start
//!
//! ```no_run
//! use libtailor::{Config, ImageReference, Resolver};
//! use libtailor::writer::save_metadata;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Resolver::new(&Config::default())?;
//!
//!     // Both surface forms are accepted
//!     let reference: ImageReference = "docker://localhost:5000/team/app#1.0".parse()?;
//!     let image = resolver.resolve(&reference)?;
//!
//!     save_metadata(Path::new("/tmp/result/result.json"), &image.config)?;
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`Resolver`] - Main entry point, resolves references to metadata
//! - [`ResolverBuilder`] - Builder for credentials and custom transports
//! - [`ImageReference`] - Parsed `repository:tag` pair
//! - [`ImageMetadata`] - Decoded image JSON record
//! - [`Credentials`] - Credentials presented to the registry index
//!
//! # Architecture
//!
//! A resolution runs in stages, each in its own module:
//!
//! 1. [`reference`] parses the user's input
//! 2. [`registry`] decides which registry serves the repository
//! 3. [`session`] speaks the registry protocol over a [`transport`]
//! 4. [`resolver`] drives the stages and the mirror fallback
//! 5. [`writer`] persists the result

#![warn(clippy::all)]

/// Returns the libtailor crate version.
///
/// # Examples
///
/// ```
/// let version = libtailor::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod resolver;
pub use resolver::{Resolver, ResolverBuilder};

// Re-export commonly used types for convenience
pub use auth::Credentials;
pub use config::Config;
pub use error::{Result, TailorError};
pub use image::ImageMetadata;
pub use reference::ImageReference;

pub mod auth;
pub mod config;
pub mod error;
pub mod image;
pub mod reference;
pub mod registry;
pub mod session;
pub mod transport;
pub mod writer;
