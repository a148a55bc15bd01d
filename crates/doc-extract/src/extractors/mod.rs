//! Extraction strategies
//!
//! Each strategy turns the bytes of one document into plain text:
//! - Embedded: reads the text layer of a PDF (pdf-extract)
//! - Optical: runs OCR over an image or over rasterised PDF pages
//! - Structured: pulls paragraph text out of a DOCX package

pub mod embedded;
pub mod optical;
pub mod structured;

pub use embedded::EmbeddedTextExtractor;
pub use optical::{
    normalize_ocr_text, OcrEngine, OpticalExtractor, PageRasterizer, PdftoppmRasterizer,
    ProgressCallback, RecognitionProgress, TesseractCli,
};
pub use structured::StructuredDocumentExtractor;

use crate::error::ExtractError;
use shared_types::{DocumentFormat, ExtractionMethod};

/// Untrimmed extractor output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawText {
    pub text: String,
    pub page_count: Option<u32>,
}

impl RawText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_count: None,
        }
    }

    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }

    /// Characters left after trimming surrounding whitespace
    pub fn meaningful_chars(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// Trait for text extraction strategies
pub trait TextExtractor: Send + Sync {
    /// Strategy tag recorded on the extracted text
    fn method(&self) -> ExtractionMethod;

    /// Extract text from a complete document payload
    fn extract(&self, data: &[u8], format: DocumentFormat) -> Result<RawText, ExtractError>;
}
