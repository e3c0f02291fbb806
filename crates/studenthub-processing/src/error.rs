use studenthub_core::AppError;
use thiserror::Error;

/// Errors raised while transforming a tool's input
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[cfg(feature = "image")]
    #[error("Image error: {0}")]
    Image(#[from] ::image::ImageError),

    #[cfg(feature = "document")]
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Text extraction failed: {0}")]
    TextExtraction(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessingError {
    /// Message safe to show to the person who uploaded the file
    pub fn user_message(&self) -> String {
        match self {
            #[cfg(feature = "image")]
            ProcessingError::Image(_) => "The image could not be decoded or encoded".to_string(),
            #[cfg(feature = "document")]
            ProcessingError::Pdf(_) => "The PDF could not be read".to_string(),
            ProcessingError::TextExtraction(_) => {
                "No text could be extracted from the PDF".to_string()
            }
            ProcessingError::InvalidParameters(msg) => msg.clone(),
            ProcessingError::UnsupportedInput(msg) => msg.clone(),
            ProcessingError::Encode(_) => "The output file could not be produced".to_string(),
            ProcessingError::Io(_) => "The output file could not be produced".to_string(),
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            #[cfg(feature = "image")]
            ProcessingError::Image(e) => AppError::ImageProcessing(e.to_string()),
            #[cfg(feature = "document")]
            ProcessingError::Pdf(e) => AppError::DocumentProcessing(e.to_string()),
            ProcessingError::TextExtraction(msg) => AppError::DocumentProcessing(msg),
            ProcessingError::InvalidParameters(msg) => AppError::InvalidInput(msg),
            ProcessingError::UnsupportedInput(msg) => AppError::UnsupportedMediaType(msg),
            ProcessingError::Encode(msg) => AppError::Internal(msg),
            ProcessingError::Io(e) => AppError::from(e),
        }
    }
}
