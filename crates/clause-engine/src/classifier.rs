//! Sentence classification against the tiered rule table.
//!
//! Per sentence: walk the High tier in declared order, then Medium, then
//! Low. The first rule with a keyword contained in the sentence (ignoring
//! case) produces the finding and evaluation of that sentence stops. At most
//! one finding per sentence.

use crate::rules::{RiskRule, RuleSet};
use shared_types::{ClauseFinding, Sentence};

pub struct ClauseClassifier<'r> {
    rules: &'r RuleSet,
}

impl<'r> ClauseClassifier<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Highest-priority rule matching the sentence, if any
    pub fn first_match(&self, sentence: &str) -> Option<&'r RiskRule> {
        let lower = sentence.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matched_keyword(&lower).is_some())
    }

    pub fn classify(&self, sentence: &Sentence<'_>) -> Option<ClauseFinding> {
        self.first_match(sentence.text).map(|rule| ClauseFinding {
            text: sentence.text.to_string(),
            level: rule.level,
            category: rule.category.clone(),
            reason: rule.reason.clone(),
            start_index: sentence.start_index,
            end_index: sentence.end_index,
        })
    }

    /// Findings in sentence order
    pub fn classify_all(&self, sentences: &[Sentence<'_>]) -> Vec<ClauseFinding> {
        sentences.iter().filter_map(|s| self.classify(s)).collect()
    }
}
