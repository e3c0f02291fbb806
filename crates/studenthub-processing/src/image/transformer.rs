use crate::compression::ImageCompressor;
use crate::error::ProcessingError;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use studenthub_core::ImageOutputFormat;

/// Default quality used when a tool re-encodes without an explicit setting
const DEFAULT_QUALITY: u8 = 85;

/// Stateless image operations backing the image tools
pub struct ImageTransformer;

impl ImageTransformer {
    /// Decode an image, sniffing the format from its bytes
    pub fn decode(data: &[u8]) -> Result<(DynamicImage, ImageFormat), ProcessingError> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader.format().ok_or_else(|| {
            ProcessingError::UnsupportedInput("Unrecognized image format".to_string())
        })?;
        let img = reader.decode()?;
        Ok((img, format))
    }

    /// Map a decoded container format onto the formats the tools can write
    pub fn output_format_for(format: ImageFormat) -> ImageOutputFormat {
        match format {
            ImageFormat::Png => ImageOutputFormat::Png,
            ImageFormat::WebP => ImageOutputFormat::Webp,
            ImageFormat::Gif => ImageOutputFormat::Gif,
            ImageFormat::Bmp => ImageOutputFormat::Bmp,
            _ => ImageOutputFormat::Jpeg,
        }
    }

    /// Resize to the requested box and re-encode in the source format.
    ///
    /// With `keep_aspect` the image is fitted inside `width`x`height`;
    /// otherwise it is stretched to exactly that size.
    pub fn resize(
        data: &[u8],
        width: u32,
        height: u32,
        keep_aspect: bool,
    ) -> Result<(Bytes, ImageOutputFormat), ProcessingError> {
        if width == 0 || height == 0 {
            return Err(ProcessingError::InvalidParameters(
                "Width and height must be greater than zero".to_string(),
            ));
        }

        let (img, format) = Self::decode(data)?;
        let resized = Self::apply_resize(&img, width, height, keep_aspect);
        let output_format = Self::output_format_for(format);

        tracing::debug!(
            from = ?img.dimensions(),
            to = ?resized.dimensions(),
            keep_aspect,
            "Resized image"
        );

        let encoded = ImageCompressor::compress(&resized, output_format, DEFAULT_QUALITY)?;
        Ok((encoded, output_format))
    }

    pub fn apply_resize(
        img: &DynamicImage,
        width: u32,
        height: u32,
        keep_aspect: bool,
    ) -> DynamicImage {
        if keep_aspect {
            img.resize(width, height, FilterType::Lanczos3)
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        }
    }

    /// Re-encode an image into another format
    pub fn convert(data: &[u8], format: ImageOutputFormat) -> Result<Bytes, ProcessingError> {
        let (img, source) = Self::decode(data)?;
        tracing::debug!(source = ?source, target = ?format, "Converting image");
        ImageCompressor::compress(&img, format, DEFAULT_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_decode_detects_format() {
        let (img, format) = ImageTransformer::decode(&sample_png(8, 4)).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(img.dimensions(), (8, 4));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(ImageTransformer::decode(b"definitely not an image").is_err());
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let (data, format) = ImageTransformer::resize(&sample_png(200, 100), 50, 50, true).unwrap();
        assert_eq!(format, ImageOutputFormat::Png);

        let (img, _) = ImageTransformer::decode(&data).unwrap();
        assert_eq!(img.dimensions(), (50, 25));
    }

    #[test]
    fn test_resize_exact_stretches() {
        let (data, _) = ImageTransformer::resize(&sample_png(200, 100), 40, 60, false).unwrap();
        let (img, _) = ImageTransformer::decode(&data).unwrap();
        assert_eq!(img.dimensions(), (40, 60));
    }

    #[test]
    fn test_resize_rejects_zero_dimensions() {
        assert!(matches!(
            ImageTransformer::resize(&sample_png(10, 10), 0, 10, true),
            Err(ProcessingError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_convert_png_to_jpeg() {
        let data = ImageTransformer::convert(&sample_png(16, 16), ImageOutputFormat::Jpeg).unwrap();
        let (img, format) = ImageTransformer::decode(&data).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!(img.dimensions(), (16, 16));
    }

    #[test]
    fn test_convert_to_bmp() {
        let data = ImageTransformer::convert(&sample_png(4, 4), ImageOutputFormat::Bmp).unwrap();
        assert!(data.starts_with(b"BM"));
    }

    #[test]
    fn test_output_format_for_unknown_falls_back_to_jpeg() {
        assert_eq!(
            ImageTransformer::output_format_for(ImageFormat::Tiff),
            ImageOutputFormat::Jpeg
        );
    }
}
