//! Image tools
//!
//! Decoding, resizing and format conversion. Re-encoding with a quality
//! setting lives in [`crate::compression`].

pub mod transformer;

pub use transformer::ImageTransformer;
