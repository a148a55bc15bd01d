//! Format dispatcher - picks an extraction strategy with a scanned-PDF fallback
//!
//! ## Routing
//!
//! | Declared type | Strategy | Fallback |
//! |---------------|----------|----------|
//! | `application/pdf` | Embedded text | OCR when the text is shorter than `min_embedded_chars` or parsing fails |
//! | `image/*` | OCR | none |
//! | DOCX / DOC | Structured document | none |
//! | anything else | - | `UnsupportedFormat`, nothing is attempted |

use tracing::{info, warn};

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extractors::{
    EmbeddedTextExtractor, OpticalExtractor, RawText, StructuredDocumentExtractor, TextExtractor,
};
use shared_types::{DocumentFormat, ExtractedText, SourceDocument};

pub struct FormatDispatcher {
    config: ExtractionConfig,
    embedded: Box<dyn TextExtractor>,
    optical: Box<dyn TextExtractor>,
    structured: Box<dyn TextExtractor>,
}

impl FormatDispatcher {
    pub fn new(config: ExtractionConfig) -> Self {
        let optical = OpticalExtractor::new(&config.ocr);
        Self::with_extractors(
            config,
            Box::new(EmbeddedTextExtractor::new()),
            Box::new(optical),
            Box::new(StructuredDocumentExtractor::new()),
        )
    }

    /// Build with explicit strategies (custom OCR engines, test doubles)
    pub fn with_extractors(
        config: ExtractionConfig,
        embedded: Box<dyn TextExtractor>,
        optical: Box<dyn TextExtractor>,
        structured: Box<dyn TextExtractor>,
    ) -> Self {
        Self {
            config,
            embedded,
            optical,
            structured,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Main extraction entry point
    pub fn extract(&self, document: &SourceDocument<'_>) -> Result<ExtractedText, ExtractError> {
        let format = document
            .format()
            .ok_or_else(|| ExtractError::UnsupportedFormat(document.mime_type.to_string()))?;

        let (raw, extractor, fallback) = match format {
            DocumentFormat::Pdf => self.extract_pdf(document.bytes)?,
            DocumentFormat::Image => (
                self.optical.extract(document.bytes, format)?,
                self.optical.as_ref(),
                false,
            ),
            DocumentFormat::WordProcessor => (
                self.structured.extract(document.bytes, format)?,
                self.structured.as_ref(),
                false,
            ),
        };

        let text = raw.text.trim();
        if text.is_empty() {
            return Err(ExtractError::EmptyText);
        }

        let mut extracted = ExtractedText::new(text, extractor.method()).with_fallback(fallback);
        if let Some(pages) = raw.page_count {
            extracted = extracted.with_page_count(pages);
        }
        Ok(extracted)
    }

    /// Embedded text first, OCR when the text layer is missing, thin, or unreadable
    fn extract_pdf(
        &self,
        data: &[u8],
    ) -> Result<(RawText, &dyn TextExtractor, bool), ExtractError> {
        match self.embedded.extract(data, DocumentFormat::Pdf) {
            Ok(raw) if raw.meaningful_chars() >= self.config.min_embedded_chars => {
                Ok((raw, self.embedded.as_ref(), false))
            }
            Ok(raw) => {
                info!(
                    chars = raw.meaningful_chars(),
                    threshold = self.config.min_embedded_chars,
                    "PDF appears to be scanned, trying OCR"
                );
                let mut ocr = self.optical.extract(data, DocumentFormat::Pdf)?;
                ocr.page_count = ocr.page_count.or(raw.page_count);
                Ok((ocr, self.optical.as_ref(), true))
            }
            Err(e) => {
                warn!(error = %e, "Embedded text extraction failed, trying OCR");
                let ocr = self.optical.extract(data, DocumentFormat::Pdf)?;
                Ok((ocr, self.optical.as_ref(), true))
            }
        }
    }
}

impl Default for FormatDispatcher {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
