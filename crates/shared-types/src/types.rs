use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_MSWORD: &str = "application/msword";

/// Raw upload handed to the analysis core for the duration of one call
#[derive(Debug, Clone, Copy)]
pub struct SourceDocument<'a> {
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
}

impl<'a> SourceDocument<'a> {
    pub fn new(bytes: &'a [u8], mime_type: &'a str) -> Self {
        Self { bytes, mime_type }
    }

    /// Recognised format for the declared mime-type, if any
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_mime(self.mime_type)
    }
}

/// Source formats the dispatcher knows how to route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Text-native, may still be a scan
    Pdf,
    /// Any `image/*`
    Image,
    /// DOCX / DOC
    WordProcessor,
}

impl DocumentFormat {
    /// Parse a declared mime-type. Case and parameters (`; charset=...`) are ignored.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = normalize_mime(mime_type);
        match essence.as_str() {
            MIME_PDF => Some(DocumentFormat::Pdf),
            MIME_DOCX | MIME_MSWORD => Some(DocumentFormat::WordProcessor),
            m if m.starts_with("image/") && m.len() > "image/".len() => {
                Some(DocumentFormat::Image)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Image => write!(f, "image"),
            DocumentFormat::WordProcessor => write!(f, "word-processor"),
        }
    }
}

/// Lower-case essence of a mime-type without parameters
pub fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// How the text of a document was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    EmbeddedText,
    OpticalRecognition,
    StructuredDocument,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::EmbeddedText => write!(f, "embedded-text"),
            ExtractionMethod::OpticalRecognition => write!(f, "optical-recognition"),
            ExtractionMethod::StructuredDocument => write!(f, "structured-document"),
        }
    }
}

/// Text pulled out of a document. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedText {
    text: String,
    method: ExtractionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_count: Option<u32>,
    /// True when the embedded-text fast path was abandoned for OCR
    fallback_occurred: bool,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, method: ExtractionMethod) -> Self {
        Self {
            text: text.into(),
            method,
            page_count: None,
            fallback_occurred: false,
        }
    }

    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }

    pub fn with_fallback(mut self, occurred: bool) -> Self {
        self.fallback_occurred = occurred;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    pub fn fallback_occurred(&self) -> bool {
        self.fallback_occurred
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// A sentence-like unit with byte offsets into the text it was cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub text: &'a str,
    pub start_index: usize,
    pub end_index: usize,
}

/// Rule taxonomy tier, declared in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Tiers in evaluation priority
    pub const PRIORITY: [RiskLevel; 3] = [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseFinding {
    pub text: String,
    pub level: RiskLevel,
    pub category: String,
    pub reason: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// Finding counts per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl RiskSummary {
    pub fn from_findings(findings: &[ClauseFinding]) -> Self {
        findings.iter().fold(Self::default(), |mut acc, f| {
            match f.level {
                RiskLevel::High => acc.high += 1,
                RiskLevel::Medium => acc.medium += 1,
                RiskLevel::Low => acc.low += 1,
            }
            acc.total += 1;
            acc
        })
    }
}

/// Output record of one document analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub text: String,
    pub risks: Vec<ClauseFinding>,
    pub risk_score: u8,
    pub summary: RiskSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<ExtractionMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}
