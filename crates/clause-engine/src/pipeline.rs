//! End-to-end analysis: bytes + declared mime-type in, report out.
//!
//! Stages run in order (dispatch, extract, segment, classify, score) and hold
//! no state between documents, so one analyzer can serve concurrent calls.

use tracing::{info, instrument};

use crate::error::AnalysisError;
use crate::{ClauseAnalysis, ClauseEngine, RuleSet};
use doc_extract::{ExtractionConfig, FormatDispatcher};
use shared_types::{AnalysisReport, SourceDocument};

pub struct RiskAnalyzer {
    dispatcher: FormatDispatcher,
    engine: ClauseEngine,
}

impl RiskAnalyzer {
    pub fn new(config: ExtractionConfig, rules: RuleSet) -> Self {
        Self::with_parts(FormatDispatcher::new(config), ClauseEngine::with_rules(rules))
    }

    pub fn with_parts(dispatcher: FormatDispatcher, engine: ClauseEngine) -> Self {
        Self { dispatcher, engine }
    }

    pub fn engine(&self) -> &ClauseEngine {
        &self.engine
    }

    pub fn dispatcher(&self) -> &FormatDispatcher {
        &self.dispatcher
    }

    /// Analyze an uploaded document. Any extraction failure aborts the whole
    /// analysis; there is no partial report.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn analyze(&self, bytes: &[u8], mime_type: &str) -> Result<AnalysisReport, AnalysisError> {
        let extracted = self
            .dispatcher
            .extract(&SourceDocument::new(bytes, mime_type))?;

        let method = extracted.method();
        let page_count = extracted.page_count();
        let ClauseAnalysis {
            risks,
            risk_score,
            summary,
        } = self.engine.analyze(extracted.text());

        info!(
            method = %method,
            fallback = extracted.fallback_occurred(),
            findings = summary.total,
            risk_score,
            "Document analyzed"
        );

        Ok(AnalysisReport {
            text: extracted.into_text(),
            risks,
            risk_score,
            summary,
            extraction_method: Some(method),
            page_count,
        })
    }

    /// Analyze text that has already been extracted. The text is used as-is.
    pub fn analyze_text(&self, text: &str) -> AnalysisReport {
        let ClauseAnalysis {
            risks,
            risk_score,
            summary,
        } = self.engine.analyze(text);

        AnalysisReport {
            text: text.to_string(),
            risks,
            risk_score,
            summary,
            extraction_method: None,
            page_count: None,
        }
    }
}

impl Default for RiskAnalyzer {
    fn default() -> Self {
        Self::new(ExtractionConfig::default(), RuleSet::default())
    }
}
