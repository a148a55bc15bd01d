//! Extraction settings

use serde::{Deserialize, Serialize};

/// Minimum trimmed character count for embedded PDF text to be trusted.
/// Anything shorter is treated as a scan and re-read with OCR.
pub const DEFAULT_MIN_EMBEDDED_CHARS: usize = 100;

/// Configuration for extraction behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fallback threshold for the embedded-text fast path
    pub min_embedded_chars: usize,
    /// Optical recognition settings
    pub ocr: OcrConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_embedded_chars: DEFAULT_MIN_EMBEDDED_CHARS,
            ocr: OcrConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable
    pub tesseract_bin: String,
    /// Tesseract language pack(s), e.g. "eng" or "eng+deu"
    pub language: String,
    /// `--oem`
    pub engine_mode: u8,
    /// `--psm`; 6 assumes a single uniform block of text
    pub page_segmentation_mode: u8,
    /// Poppler `pdftoppm` executable used to rasterise scanned PDFs
    pub pdftoppm_bin: String,
    /// Rasterisation resolution for PDF pages
    pub dpi: u32,
    /// Repair line-wrapping artifacts in recognised text
    pub normalize: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_bin: "tesseract".to_string(),
            language: "eng".to_string(),
            engine_mode: 3,
            page_segmentation_mode: 6,
            pdftoppm_bin: "pdftoppm".to_string(),
            dpi: 300,
            normalize: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.min_embedded_chars, 100);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.dpi, 300);
        assert!(config.ocr.normalize);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{"ocr": {"language": "deu", "dpi": 150}}"#).unwrap();
        assert_eq!(config.min_embedded_chars, DEFAULT_MIN_EMBEDDED_CHARS);
        assert_eq!(config.ocr.language, "deu");
        assert_eq!(config.ocr.dpi, 150);
        assert_eq!(config.ocr.tesseract_bin, "tesseract");
    }
}
