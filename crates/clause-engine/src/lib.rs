//! Contract clause risk analysis
//!
//! Segments extracted text into sentences, classifies each against a
//! three-tier keyword taxonomy and folds the findings into a 0-100 score.
//! [`RiskAnalyzer`] puts extraction in front of that for raw uploads.

pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod rules;
pub mod scorer;
pub mod segmenter;

use std::sync::Arc;

use tracing::debug;

pub use classifier::ClauseClassifier;
pub use error::AnalysisError;
pub use pipeline::RiskAnalyzer;
pub use rules::{RiskRule, RuleSet, RuleSetError, RuleSpec, RuleTable};
pub use scorer::risk_score;
pub use segmenter::split_sentences;

use shared_types::{ClauseFinding, RiskSummary};

/// Result of analysing a block of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseAnalysis {
    pub risks: Vec<ClauseFinding>,
    pub risk_score: u8,
    pub summary: RiskSummary,
}

/// ClauseEngine entry point
#[derive(Debug, Clone)]
pub struct ClauseEngine {
    rules: Arc<RuleSet>,
}

impl ClauseEngine {
    /// Engine over the built-in taxonomy
    pub fn new() -> Self {
        Self::with_rules(RuleSet::default())
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Segment, classify and score `text`. Never fails; text without any
    /// qualifying sentence scores 0.
    pub fn analyze(&self, text: &str) -> ClauseAnalysis {
        let sentences = split_sentences(text);
        let risks = ClauseClassifier::new(&self.rules).classify_all(&sentences);
        let risk_score = risk_score(&risks);
        let summary = RiskSummary::from_findings(&risks);

        debug!(
            sentences = sentences.len(),
            findings = risks.len(),
            high = summary.high,
            risk_score,
            "Clause analysis complete"
        );

        ClauseAnalysis {
            risks,
            risk_score,
            summary,
        }
    }
}

impl Default for ClauseEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::RiskLevel;

    #[test]
    fn test_engine_scores_high_and_low_findings() {
        let engine = ClauseEngine::new();
        let analysis = engine.analyze(
            "This agreement includes a waiver of liability for all damages. Notices must be sent by mail.",
        );

        let levels: Vec<RiskLevel> = analysis.risks.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![RiskLevel::High, RiskLevel::Low]);
        assert_eq!(analysis.risks[0].category, "Liability & Indemnification");
        assert_eq!(analysis.risks[1].category, "Communication");
        assert_eq!(analysis.risk_score, 64);
        assert_eq!(
            analysis.summary,
            RiskSummary {
                high: 1,
                medium: 0,
                low: 1,
                total: 2
            }
        );
    }

    #[test]
    fn test_engine_without_matches_scores_zero() {
        let analysis =
            ClauseEngine::new().analyze("The parties met on a sunny Tuesday in the park.");
        assert!(analysis.risks.is_empty());
        assert_eq!(analysis.risk_score, 0);
        assert_eq!(analysis.summary.total, 0);
    }

    #[test]
    fn test_engine_with_empty_text() {
        let analysis = ClauseEngine::default().analyze("");
        assert!(analysis.risks.is_empty());
        assert_eq!(analysis.risk_score, 0);
    }

    #[test]
    fn test_engine_with_custom_rules() {
        let rules = RuleSet::from_json(
            r#"{"medium": [{"keywords": ["escrow"], "category": "Escrow", "reason": "Funds held by a third party"}]}"#,
        )
        .unwrap();
        let engine = ClauseEngine::with_rules(rules);

        let analysis = engine
            .analyze("The deposit is held in escrow until closing. Waiver of liability applies.");
        assert_eq!(analysis.risks.len(), 1);
        assert_eq!(analysis.risks[0].category, "Escrow");
        assert_eq!(engine.rules().len(), 1);
    }
}
