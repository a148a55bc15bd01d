pub mod types;

pub use types::{
    AnalysisReport, ClauseFinding, DocumentFormat, ExtractedText, ExtractionMethod, RiskLevel,
    RiskSummary, Sentence, SourceDocument,
};
