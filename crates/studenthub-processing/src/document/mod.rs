//! PDF tools

pub mod pages;
pub mod transformer;
pub mod writer;

pub use pages::PageSelection;
pub use transformer::PdfTransformer;
pub use writer::TextPdfWriter;
