//! Test fixtures: real PNG and PDF blobs produced by the codecs themselves.

use image::{ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;
use studenthub_processing::TextPdfWriter;

/// Gradient PNG of the given size
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode test PNG");
    out.into_inner()
}

/// PDF with roughly `pages` pages of numbered lines
pub fn create_test_pdf(pages: usize) -> Vec<u8> {
    // 53 lines fit on a page
    let text = (0..pages * 53)
        .map(|i| format!("Line {} of the study notes.", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    TextPdfWriter::render(None, &text)
        .expect("Failed to render test PDF")
        .to_vec()
}
