//! Image re-encoding with a quality setting

use crate::error::ProcessingError;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use studenthub_core::ImageOutputFormat;

/// Quality at or below which PNG output uses the slowest, smallest setting
const PNG_BEST_COMPRESSION_THRESHOLD: u8 = 60;

pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode `img` as `format`.
    ///
    /// `quality` (1-100) drives the JPEG quantizer and the PNG compression
    /// level. WebP is written lossless; GIF and BMP ignore it.
    pub fn compress(
        img: &DynamicImage,
        format: ImageOutputFormat,
        quality: u8,
    ) -> Result<Bytes, ProcessingError> {
        if !(1..=100).contains(&quality) {
            return Err(ProcessingError::InvalidParameters(format!(
                "Quality must be between 1 and 100, got {}",
                quality
            )));
        }

        match format {
            ImageOutputFormat::Jpeg => Self::compress_jpeg(img, quality),
            ImageOutputFormat::Png => Self::compress_png(img, quality),
            ImageOutputFormat::Webp => Self::compress_webp(img),
            ImageOutputFormat::Gif => Self::write_plain(
                &DynamicImage::ImageRgba8(img.to_rgba8()),
                ImageFormat::Gif,
            ),
            ImageOutputFormat::Bmp => {
                Self::write_plain(&DynamicImage::ImageRgb8(img.to_rgb8()), ImageFormat::Bmp)
            }
        }
    }

    fn compress_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, ProcessingError> {
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)?;
        Ok(Bytes::from(buffer))
    }

    fn compress_png(img: &DynamicImage, quality: u8) -> Result<Bytes, ProcessingError> {
        let compression = if quality <= PNG_BEST_COMPRESSION_THRESHOLD {
            CompressionType::Best
        } else {
            CompressionType::Default
        };

        let mut buffer = Vec::new();
        let encoder = PngEncoder::new_with_quality(&mut buffer, compression, FilterType::Adaptive);
        img.write_with_encoder(encoder)?;
        Ok(Bytes::from(buffer))
    }

    fn compress_webp(img: &DynamicImage) -> Result<Bytes, ProcessingError> {
        let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
        let mut buffer = Vec::new();
        let encoder = WebPEncoder::new_lossless(&mut buffer);
        rgba.write_with_encoder(encoder)?;
        Ok(Bytes::from(buffer))
    }

    fn write_plain(img: &DynamicImage, format: ImageFormat) -> Result<Bytes, ProcessingError> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format)?;
        Ok(Bytes::from(buffer))
    }
}
