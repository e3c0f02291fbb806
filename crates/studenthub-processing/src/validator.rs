use std::path::Path;
use studenthub_core::{AppError, Config};

/// Common validation errors for uploaded files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File content does not look like {expected}")]
    SignatureMismatch { expected: &'static str },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::InvalidExtension { .. }
            | ValidationError::InvalidContentType { .. }
            | ValidationError::SignatureMismatch { .. } => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            ValidationError::InvalidFilename(_) | ValidationError::EmptyFile => {
                AppError::InvalidInput(err.to_string())
            }
        }
    }
}

/// Family of uploads a tool accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Image,
    Document,
}

/// Upload validator
///
/// Checks size, extension and content type against the configured allowlists,
/// then sniffs the leading bytes so a renamed file is rejected before any
/// decoder sees it.
pub struct MediaValidator {
    kind: ToolKind,
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(
        kind: ToolKind,
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            kind,
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    /// Build the validator for a tool family from configuration
    pub fn for_tool(kind: ToolKind, config: &Config) -> Self {
        match kind {
            ToolKind::Image => Self::new(
                kind,
                config.max_image_size_bytes(),
                config.image_allowed_extensions().to_vec(),
                config.image_allowed_content_types().to_vec(),
            ),
            ToolKind::Document => Self::new(
                kind,
                config.max_document_size_bytes(),
                config.document_allowed_extensions().to_vec(),
                config.document_allowed_content_types().to_vec(),
            ),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = extension_of(filename)?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = normalize_content_type(content_type);

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate that Content-Type matches the file extension
    pub fn validate_extension_content_type_match(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let extension = extension_of(filename)?;
        let normalized_content_type = normalize_content_type(content_type);

        let expected_content_types: &[&str] = match extension.as_str() {
            "jpg" | "jpeg" => &["image/jpeg"],
            "png" => &["image/png"],
            "gif" => &["image/gif"],
            "webp" => &["image/webp"],
            "bmp" => &["image/bmp", "image/x-ms-bmp"],
            "pdf" => &["application/pdf"],
            "txt" => &["text/plain"],
            _ => {
                tracing::debug!(
                    extension = %extension,
                    content_type = %content_type,
                    "Unknown extension, skipping Content-Type/extension cross-validation"
                );
                return Ok(());
            }
        };

        if !expected_content_types
            .iter()
            .any(|ct| *ct == normalized_content_type)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: format!(
                    "{} (does not match extension '{}'. Expected one of: {})",
                    content_type,
                    extension,
                    expected_content_types.join(", ")
                ),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Check the leading bytes against the tool family
    pub fn validate_signature(&self, data: &[u8]) -> Result<(), ValidationError> {
        match self.kind {
            ToolKind::Document => {
                if !data.starts_with(b"%PDF-") {
                    return Err(ValidationError::SignatureMismatch { expected: "a PDF" });
                }
            }
            ToolKind::Image => {
                if !looks_like_image(data) {
                    return Err(ValidationError::SignatureMismatch {
                        expected: "an image",
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate all aspects of an upload and return its normalized extension
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, ValidationError> {
        self.validate_file_size(data.len())?;
        let extension = self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        self.validate_extension_content_type_match(filename, content_type)?;
        self.validate_signature(data)?;
        Ok(extension)
    }
}

fn extension_of(filename: &str) -> Result<String, ValidationError> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))
}

/// Lowercase and strip parameters such as `; charset=utf-8`
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(feature = "image")]
fn looks_like_image(data: &[u8]) -> bool {
    ::image::guess_format(data).is_ok()
}

#[cfg(not(feature = "image"))]
fn looks_like_image(data: &[u8]) -> bool {
    const SIGNATURES: &[&[u8]] = &[
        b"\xFF\xD8\xFF",
        b"\x89PNG\r\n\x1a\n",
        b"GIF87a",
        b"GIF89a",
        b"BM",
    ];
    SIGNATURES.iter().any(|sig| data.starts_with(sig))
        || (data.len() > 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP")
}
