//! StudentHub Processing Library
//!
//! The transformations behind each tool. Every codec is a call into an
//! established crate: `image` for raster formats, `pdf-extract` for text
//! extraction and `lopdf` for PDF page surgery and authoring. The text
//! utilities are plain string processing.

#[cfg(feature = "image")]
pub mod compression;
#[cfg(feature = "document")]
pub mod document;
pub mod error;
#[cfg(feature = "image")]
pub mod image;
pub mod jobs;
pub mod text;
pub mod validator;

#[cfg(feature = "image")]
pub use compression::ImageCompressor;
#[cfg(feature = "document")]
pub use document::{PageSelection, PdfTransformer, TextPdfWriter};
pub use error::ProcessingError;
#[cfg(feature = "image")]
pub use crate::image::ImageTransformer;
pub use jobs::{ToolJob, ToolOutput};
pub use validator::{MediaValidator, ToolKind, ValidationError};
