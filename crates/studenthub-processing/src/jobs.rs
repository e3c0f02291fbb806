//! The file-producing tools as a single dispatchable unit of work

use crate::error::ProcessingError;
use bytes::Bytes;
use studenthub_core::ImageOutputFormat;

/// One file-to-file transformation, run against the session's input bytes
#[derive(Debug, Clone, PartialEq)]
pub enum ToolJob {
    ResizeImage {
        width: u32,
        height: u32,
        keep_aspect: bool,
    },
    CompressImage {
        quality: u8,
    },
    ConvertImage {
        format: ImageOutputFormat,
    },
    PdfToText,
    SplitPdf {
        pages: String,
    },
    CompressPdf,
    /// The input is the source PDFs stored back to back; `part_lengths`
    /// gives each one's size in merge order
    MergePdf {
        part_lengths: Vec<usize>,
    },
    TextToPdf {
        title: Option<String>,
    },
}

/// Bytes produced by a job plus how to store and serve them
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub data: Bytes,
    pub extension: &'static str,
    pub content_type: &'static str,
}

impl ToolOutput {
    fn pdf(data: Bytes) -> Self {
        Self {
            data,
            extension: "pdf",
            content_type: "application/pdf",
        }
    }

    #[cfg(feature = "image")]
    fn image(data: Bytes, format: ImageOutputFormat) -> Self {
        Self {
            data,
            extension: format.extension(),
            content_type: format.content_type(),
        }
    }
}

impl ToolJob {
    /// Stable name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ToolJob::ResizeImage { .. } => "image.resize",
            ToolJob::CompressImage { .. } => "image.compress",
            ToolJob::ConvertImage { .. } => "image.convert",
            ToolJob::PdfToText => "pdf.to_text",
            ToolJob::SplitPdf { .. } => "pdf.split",
            ToolJob::CompressPdf => "pdf.compress",
            ToolJob::MergePdf { .. } => "pdf.merge",
            ToolJob::TextToPdf { .. } => "text.to_pdf",
        }
    }

    /// Run the job. CPU bound; call from a blocking thread.
    pub fn run(&self, input: &[u8]) -> Result<ToolOutput, ProcessingError> {
        match self {
            #[cfg(feature = "image")]
            ToolJob::ResizeImage {
                width,
                height,
                keep_aspect,
            } => {
                let (data, format) =
                    crate::image::ImageTransformer::resize(input, *width, *height, *keep_aspect)?;
                Ok(ToolOutput::image(data, format))
            }
            #[cfg(feature = "image")]
            ToolJob::CompressImage { quality } => {
                use crate::image::ImageTransformer;
                let (img, source) = ImageTransformer::decode(input)?;
                let format = ImageTransformer::output_format_for(source);
                let data = crate::compression::ImageCompressor::compress(&img, format, *quality)?;
                Ok(ToolOutput::image(data, format))
            }
            #[cfg(feature = "image")]
            ToolJob::ConvertImage { format } => {
                let data = crate::image::ImageTransformer::convert(input, *format)?;
                Ok(ToolOutput::image(data, *format))
            }
            #[cfg(feature = "document")]
            ToolJob::PdfToText => {
                let text = crate::document::PdfTransformer::extract_text(input)?;
                Ok(ToolOutput {
                    data: Bytes::from(text),
                    extension: "txt",
                    content_type: "text/plain; charset=utf-8",
                })
            }
            #[cfg(feature = "document")]
            ToolJob::SplitPdf { pages } => {
                let selection = crate::document::PageSelection::parse(pages)?;
                let data = crate::document::PdfTransformer::split(input, &selection)?;
                Ok(ToolOutput::pdf(data))
            }
            #[cfg(feature = "document")]
            ToolJob::CompressPdf => {
                let data = crate::document::PdfTransformer::compress(input)?;
                Ok(ToolOutput::pdf(data))
            }
            #[cfg(feature = "document")]
            ToolJob::MergePdf { part_lengths } => {
                let parts = split_parts(input, part_lengths)?;
                let data = crate::document::PdfTransformer::merge(&parts)?;
                Ok(ToolOutput::pdf(data))
            }
            #[cfg(feature = "document")]
            ToolJob::TextToPdf { title } => {
                let text = std::str::from_utf8(input).map_err(|_| {
                    ProcessingError::InvalidParameters("Text must be valid UTF-8".to_string())
                })?;
                let data = crate::document::TextPdfWriter::render(title.as_deref(), text)?;
                Ok(ToolOutput::pdf(data))
            }
            #[allow(unreachable_patterns)]
            other => Err(ProcessingError::UnsupportedInput(format!(
                "{} is not enabled in this build",
                other.name()
            ))),
        }
    }
}

#[cfg(feature = "document")]
fn split_parts<'a>(input: &'a [u8], lengths: &[usize]) -> Result<Vec<&'a [u8]>, ProcessingError> {
    if lengths.iter().sum::<usize>() != input.len() {
        return Err(ProcessingError::InvalidParameters(
            "The uploaded files could not be read back".to_string(),
        ));
    }

    let mut rest = input;
    Ok(lengths
        .iter()
        .map(|&len| {
            let (part, tail) = rest.split_at(len);
            rest = tail;
            part
        })
        .collect())
}
