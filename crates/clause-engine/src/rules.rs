//! Risk taxonomy: keyword sets mapped to a category and reason, grouped into
//! three ordered tiers.
//!
//! The taxonomy is data. Adding or tuning a rule means editing the tables
//! below (or supplying a JSON rule file), never the classifier.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use shared_types::RiskLevel;
use thiserror::Error;

// ============================================================
// Built-in High tier
// ============================================================

pub const LIABILITY_KEYWORDS: &[&str] = &[
    "waiver of liability",
    "no liability",
    "not responsible",
    "hold harmless",
    "indemnification",
    "arbitration clause",
    "class action waiver",
    "binding arbitration",
    "no refund",
    "non-refundable",
    "as-is",
    "no warranty",
    "disclaimer",
    "exclusive remedy",
    "limitation of liability",
    "liquidated damages",
    "penalty clause",
    "automatic renewal",
    "cancellation fee",
    "early termination fee",
];

pub const CONFIDENTIALITY_KEYWORDS: &[&str] = &[
    "confidential information",
    "non-disclosure",
    "proprietary",
    "trade secret",
    "non-compete",
    "restrictive covenant",
    "exclusive agreement",
];

/// "automatic renewal" is also a liability keyword; the liability rule is
/// declared first so it wins for that phrase.
pub const RENEWAL_KEYWORDS: &[&str] = &[
    "automatic renewal",
    "auto-renew",
    "renewal term",
    "evergreen clause",
    "continuous service",
];

// ============================================================
// Built-in Medium tier
// ============================================================

pub const TERMINATION_KEYWORDS: &[&str] = &[
    "termination",
    "cancellation",
    "breach",
    "default",
    "penalty",
    "late fee",
    "interest rate",
    "annual percentage rate",
    "apr",
];

pub const JURISDICTION_KEYWORDS: &[&str] = &[
    "jurisdiction",
    "governing law",
    "venue",
    "dispute resolution",
    "mediation",
];

pub const MODIFICATION_KEYWORDS: &[&str] =
    &["modification", "amendment", "change", "update", "revise"];

// ============================================================
// Built-in Low tier
// ============================================================

pub const COMMUNICATION_KEYWORDS: &[&str] = &[
    "notice",
    "notification",
    "communication",
    "contact",
    "address",
];

pub const BOILERPLATE_KEYWORDS: &[&str] = &[
    "severability",
    "entire agreement",
    "force majeure",
    "assignment",
];

/// (keywords, category, reason) per tier, in declared order
type StaticTier = &'static [(&'static [&'static str], &'static str, &'static str)];

const BUILTIN_HIGH: StaticTier = &[
    (
        LIABILITY_KEYWORDS,
        "Liability & Indemnification",
        "Contains high-risk liability waivers or indemnification clauses",
    ),
    (
        CONFIDENTIALITY_KEYWORDS,
        "Confidentiality & Restrictions",
        "Contains restrictive confidentiality or non-compete clauses",
    ),
    (
        RENEWAL_KEYWORDS,
        "Renewal Terms",
        "Contains automatic renewal clauses that may lock you in",
    ),
];

const BUILTIN_MEDIUM: StaticTier = &[
    (
        TERMINATION_KEYWORDS,
        "Termination & Fees",
        "Contains termination or fee-related clauses that require attention",
    ),
    (
        JURISDICTION_KEYWORDS,
        "Legal Jurisdiction",
        "Contains jurisdiction or dispute resolution clauses",
    ),
    (
        MODIFICATION_KEYWORDS,
        "Modification Rights",
        "Contains clauses about contract modification rights",
    ),
];

const BUILTIN_LOW: StaticTier = &[
    (
        COMMUNICATION_KEYWORDS,
        "Communication",
        "Contains standard communication or notice clauses",
    ),
    (
        BOILERPLATE_KEYWORDS,
        "Standard Terms",
        "Contains standard legal boilerplate clauses",
    ),
];

lazy_static! {
    static ref BUILTIN: RuleSet = RuleSet::builtin_uncached();
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RuleSetError {
    #[error("{level} rule #{index} has an empty category")]
    EmptyCategory { level: RiskLevel, index: usize },

    #[error("{level} rule #{index} ({category}) has no keywords")]
    NoKeywords {
        level: RiskLevel,
        index: usize,
        category: String,
    },

    #[error("Rule table has no rules at all")]
    Empty,

    #[error("Invalid rule file: {0}")]
    Parse(String),
}

/// One taxonomy entry. Keywords are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskRule {
    pub level: RiskLevel,
    pub category: String,
    pub reason: String,
    pub keywords: Vec<String>,
}

impl RiskRule {
    /// First keyword contained in an already lower-cased sentence
    pub fn matched_keyword(&self, sentence_lower: &str) -> Option<&str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .find(|kw| sentence_lower.contains(kw))
    }
}

/// Rule entry as written in a rule file (level comes from the tier it sits in)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub keywords: Vec<String>,
    pub category: String,
    pub reason: String,
}

/// On-disk rule table: `{"high": [...], "medium": [...], "low": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    pub high: Vec<RuleSpec>,
    pub medium: Vec<RuleSpec>,
    pub low: Vec<RuleSpec>,
}

/// Validated, read-only taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    high: Vec<RiskRule>,
    medium: Vec<RiskRule>,
    low: Vec<RiskRule>,
}

impl RuleSet {
    /// The built-in contract taxonomy
    pub fn builtin() -> &'static RuleSet {
        &BUILTIN
    }

    fn builtin_uncached() -> RuleSet {
        let tier = |level: RiskLevel, rules: StaticTier| -> Vec<RiskRule> {
            rules
                .iter()
                .map(|(keywords, category, reason)| RiskRule {
                    level,
                    category: category.to_string(),
                    reason: reason.to_string(),
                    keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
                .collect()
        };

        RuleSet {
            high: tier(RiskLevel::High, BUILTIN_HIGH),
            medium: tier(RiskLevel::Medium, BUILTIN_MEDIUM),
            low: tier(RiskLevel::Low, BUILTIN_LOW),
        }
    }

    /// Validate a rule table. Keywords are trimmed, lower-cased and de-duplicated
    /// (first occurrence keeps its position); blank keywords are dropped.
    pub fn from_table(table: RuleTable) -> Result<RuleSet, RuleSetError> {
        fn tier(level: RiskLevel, specs: Vec<RuleSpec>) -> Result<Vec<RiskRule>, RuleSetError> {
            specs
                .into_iter()
                .enumerate()
                .map(|(index, spec)| {
                    let category = spec.category.trim().to_string();
                    if category.is_empty() {
                        return Err(RuleSetError::EmptyCategory { level, index });
                    }

                    let mut keywords: Vec<String> = Vec::new();
                    for keyword in spec.keywords {
                        let keyword = keyword.trim().to_lowercase();
                        if !keyword.is_empty() && !keywords.contains(&keyword) {
                            keywords.push(keyword);
                        }
                    }
                    if keywords.is_empty() {
                        return Err(RuleSetError::NoKeywords {
                            level,
                            index,
                            category,
                        });
                    }

                    Ok(RiskRule {
                        level,
                        category,
                        reason: spec.reason.trim().to_string(),
                        keywords,
                    })
                })
                .collect()
        }

        let rules = RuleSet {
            high: tier(RiskLevel::High, table.high)?,
            medium: tier(RiskLevel::Medium, table.medium)?,
            low: tier(RiskLevel::Low, table.low)?,
        };

        if rules.is_empty() {
            return Err(RuleSetError::Empty);
        }
        Ok(rules)
    }

    /// Parse and validate a JSON rule table
    pub fn from_json(json: &str) -> Result<RuleSet, RuleSetError> {
        let table: RuleTable =
            serde_json::from_str(json).map_err(|e| RuleSetError::Parse(e.to_string()))?;
        Self::from_table(table)
    }

    /// Rules of one tier, in declared order
    pub fn tier(&self, level: RiskLevel) -> &[RiskRule] {
        match level {
            RiskLevel::High => &self.high,
            RiskLevel::Medium => &self.medium,
            RiskLevel::Low => &self.low,
        }
    }

    /// All rules, highest tier first
    pub fn iter(&self) -> impl Iterator<Item = &RiskRule> {
        RiskLevel::PRIORITY
            .into_iter()
            .flat_map(move |level| self.tier(level).iter())
    }

    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

impl From<&RuleSet> for RuleTable {
    fn from(rules: &RuleSet) -> Self {
        let specs = |level: RiskLevel| -> Vec<RuleSpec> {
            rules
                .tier(level)
                .iter()
                .map(|r| RuleSpec {
                    keywords: r.keywords.clone(),
                    category: r.category.clone(),
                    reason: r.reason.clone(),
                })
                .collect()
        };
        RuleTable {
            high: specs(RiskLevel::High),
            medium: specs(RiskLevel::Medium),
            low: specs(RiskLevel::Low),
        }
    }
}
