//! Text extraction for uploaded contract documents
//!
//! Turns `(bytes, mime-type)` into a single trimmed string, choosing the
//! cheapest strategy that works:
//! - Embedded: reads the PDF text layer (pdf-extract/lopdf)
//! - Optical: Tesseract OCR for images and scanned PDFs
//! - Structured: paragraph text from DOCX packages (zip + quick-xml)
//!
//! ## Usage
//!
//! ```no_run
//! use doc_extract::{ExtractionConfig, FormatDispatcher};
//! use shared_types::SourceDocument;
//!
//! let bytes = std::fs::read("contract.pdf").unwrap();
//! let dispatcher = FormatDispatcher::new(ExtractionConfig::default());
//! let text = dispatcher
//!     .extract(&SourceDocument::new(&bytes, "application/pdf"))
//!     .unwrap();
//! println!("{} via {}", text.text().len(), text.method());
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extractors;

pub use config::{ExtractionConfig, OcrConfig};
pub use dispatcher::FormatDispatcher;
pub use error::ExtractError;
pub use extractors::{
    OcrEngine, PageRasterizer, ProgressCallback, RawText, RecognitionProgress, TextExtractor,
};
