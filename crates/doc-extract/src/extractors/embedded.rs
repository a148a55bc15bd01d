//! Embedded-text backend using pdf-extract/lopdf
//!
//! Fast and exact for digitally produced PDFs. Scans come back empty or
//! nearly so, which the dispatcher uses as its cue to switch to OCR.

use std::panic;

use super::{RawText, TextExtractor};
use crate::error::ExtractError;
use shared_types::{DocumentFormat, ExtractionMethod};
use tracing::debug;

pub struct EmbeddedTextExtractor;

impl EmbeddedTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Cheap header check, does not parse
    pub fn looks_like_pdf(data: &[u8]) -> bool {
        data.len() > 4 && &data[0..4] == b"%PDF"
    }
}

impl Default for EmbeddedTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for EmbeddedTextExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::EmbeddedText
    }

    fn extract(&self, data: &[u8], _format: DocumentFormat) -> Result<RawText, ExtractError> {
        if !Self::looks_like_pdf(data) {
            return Err(ExtractError::failed(self.method(), "Invalid PDF header"));
        }

        // pdf-extract panics on some malformed font tables
        let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
            .map_err(|_| ExtractError::failed(self.method(), "PDF parser panicked"))?
            .map_err(|e| ExtractError::failed(self.method(), e.to_string()))?;

        let mut raw = RawText::new(text);
        if let Ok(doc) = lopdf::Document::load_mem(data) {
            raw = raw.with_page_count(doc.get_pages().len() as u32);
        }

        debug!(
            chars = raw.meaningful_chars(),
            pages = ?raw.page_count,
            "Embedded text extracted"
        );
        Ok(raw)
    }
}
