use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Parameters for the image resize tool
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ImageResizeParams {
    #[validate(range(min = 1, max = 10000, message = "Width must be between 1 and 10000"))]
    pub width: u32,
    #[validate(range(min = 1, max = 10000, message = "Height must be between 1 and 10000"))]
    pub height: u32,
    /// Fit inside the box instead of stretching to it
    #[serde(default = "default_keep_aspect")]
    pub keep_aspect: bool,
}

fn default_keep_aspect() -> bool {
    true
}

/// Parameters for the image compress tool
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ImageCompressParams {
    #[serde(default = "default_quality")]
    #[validate(range(min = 1, max = 100, message = "Quality must be between 1 and 100"))]
    pub quality: u8,
}

fn default_quality() -> u8 {
    75
}

impl Default for ImageCompressParams {
    fn default() -> Self {
        Self {
            quality: default_quality(),
        }
    }
}

/// Target formats for the image convert tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageOutputFormat {
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    Webp,
    Gif,
    Bmp,
}

impl ImageOutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageOutputFormat::Jpeg => "jpg",
            ImageOutputFormat::Png => "png",
            ImageOutputFormat::Webp => "webp",
            ImageOutputFormat::Gif => "gif",
            ImageOutputFormat::Bmp => "bmp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageOutputFormat::Jpeg => "image/jpeg",
            ImageOutputFormat::Png => "image/png",
            ImageOutputFormat::Webp => "image/webp",
            ImageOutputFormat::Gif => "image/gif",
            ImageOutputFormat::Bmp => "image/bmp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Some(ImageOutputFormat::Jpeg),
            "png" => Some(ImageOutputFormat::Png),
            "webp" => Some(ImageOutputFormat::Webp),
            "gif" => Some(ImageOutputFormat::Gif),
            "bmp" => Some(ImageOutputFormat::Bmp),
            _ => None,
        }
    }
}

/// Parameters for the image convert tool
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImageConvertParams {
    pub format: ImageOutputFormat,
}

/// Parameters for the PDF split tool
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct PdfSplitParams {
    /// 1-based page ranges to keep, e.g. `1-3,5`
    #[validate(length(min = 1, max = 1000, message = "Pages must be between 1 and 1000 characters"))]
    pub pages: String,
}

/// Request body for the text to PDF tool
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct TextToPdfRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,
}

/// Request body for the JSON text utilities
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct TextRequest {
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,
}

/// Request body for the summarizer
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SummarizeRequest {
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,
    #[serde(default = "default_summary_sentences")]
    #[validate(range(min = 1, max = 20, message = "Sentences must be between 1 and 20"))]
    pub sentences: usize,
}

fn default_summary_sentences() -> usize {
    3
}
