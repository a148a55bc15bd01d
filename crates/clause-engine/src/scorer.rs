//! Aggregate findings into a single 0-100 document score.

use shared_types::{ClauseFinding, RiskLevel};

/// Weight of the most severe tier; also the per-finding maximum
pub const MAX_WEIGHT: u32 = 10;

/// Flat bonus per finding, independent of severity
pub const PER_FINDING_BONUS: f64 = 2.0;

pub fn weight(level: RiskLevel) -> u32 {
    match level {
        RiskLevel::High => MAX_WEIGHT,
        RiskLevel::Medium => 5,
        RiskLevel::Low => 2,
    }
}

/// Score a document from its findings.
///
/// No findings scores 0. Otherwise the raw weight sum is normalized against
/// `count * MAX_WEIGHT`, then `2 * count` is added and the result rounded and
/// capped at 100.
pub fn risk_score(findings: &[ClauseFinding]) -> u8 {
    if findings.is_empty() {
        return 0;
    }

    let count = findings.len() as f64;
    let raw: u32 = findings.iter().map(|f| weight(f.level)).sum();
    let max_possible = count * f64::from(MAX_WEIGHT);

    let normalized = (f64::from(raw) / max_possible * 100.0).min(100.0);
    let boosted = (normalized + count * PER_FINDING_BONUS).round();

    boosted.clamp(0.0, 100.0) as u8
}
