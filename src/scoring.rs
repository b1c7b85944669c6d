//! Combines per-dimension subscores into a total score, confidence
//! label, and matching/differing field diff.

use crate::config::DetectorConfig;
use crate::model::Sex;
use crate::text::{normalize_name, string_similarity};

/// Confidence label bucketed from a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    Exact,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::Exact => "exact",
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        f.write_str(s)
    }
}

/// Per-dimension subscores for one compared pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscoreBreakdown {
    pub name: f64,
    pub date: f64,
    pub place: f64,
    pub sex: f64,
    pub relationship: f64,
}

/// Name subscore: exact normalized match, then component-based, then
/// full-name fuzzy, then a containment fallback.
///
/// `phonetic` blends in [`crate::phonetic::phonetic_similarity`] when
/// phonetic matching is enabled; it is folded into the surname
/// component score the caller supplies, not recomputed here.
pub fn name_subscore(
    full1: &str,
    full2: &str,
    given1: &str,
    given2: &str,
    surname1: &str,
    surname2: &str,
    given_similarity: f64,
    surname_similarity: f64,
) -> f64 {
    let n1 = normalize_name(full1);
    let n2 = normalize_name(full2);
    if n1 == n2 && !n1.is_empty() {
        return 1.0;
    }

    let given_present = !given1.trim().is_empty() && !given2.trim().is_empty();
    let surname_present = !surname1.trim().is_empty() && !surname2.trim().is_empty();

    if given_present && surname_present {
        if given_similarity >= 0.8 && surname_similarity >= 0.8 {
            return (given_similarity + surname_similarity) / 2.0;
        }

        let component_mean = (given_similarity + surname_similarity) / 2.0;
        let full_fuzzy = string_similarity(&n1, &n2);
        return full_fuzzy.max(component_mean);
    }

    if given_present || surname_present {
        let present_similarity = if surname_present {
            surname_similarity
        } else {
            given_similarity
        };
        return 0.7 * present_similarity;
    }

    if !n1.is_empty() && !n2.is_empty() && (n1.contains(&n2) || n2.contains(&n1)) {
        return 0.6;
    }

    string_similarity(&n1, &n2)
}

/// Sex subscore: unknown on either side is neutral, equal sexes match
/// fully, opposite sexes are a hard mismatch.
pub fn sex_subscore(a: Sex, b: Sex) -> f64 {
    match (a, b) {
        (Sex::Unknown, _) | (_, Sex::Unknown) => 0.5,
        (x, y) if x == y => 1.0,
        _ => 0.0,
    }
}

/// Score at or above which a match is labeled `medium` rather than
/// `low`. Not configurable — the option table only exposes the
/// `min_threshold`/`high_confidence_threshold`/`exact_match_threshold`
/// boundaries.
const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 0.70;

/// Confidence label from a total score, using configured boundaries.
pub fn confidence(total: f64, config: &DetectorConfig) -> Confidence {
    if total >= config.exact_match_threshold {
        Confidence::Exact
    } else if total >= config.high_confidence_threshold {
        Confidence::High
    } else if total >= MEDIUM_CONFIDENCE_THRESHOLD {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Weighted combination of subscores into a total.
pub fn total_score(s: &SubscoreBreakdown, config: &DetectorConfig) -> f64 {
    config.name_weight * s.name
        + config.date_weight * s.date
        + config.place_weight * s.place
        + config.sex_weight * s.sex
        + config.relationship_weight * s.relationship
}

/// Field-level diff: subscores at or above 0.8 count as matching;
/// subscores above 0 (but `sex` specifically only below 0.5) count as
/// differing.
pub fn field_diff(s: &SubscoreBreakdown) -> (Vec<&'static str>, Vec<&'static str>) {
    let mut matching = Vec::new();
    let mut differing = Vec::new();

    let fields: [(&str, f64); 5] = [
        ("name", s.name),
        ("date", s.date),
        ("place", s.place),
        ("sex", s.sex),
        ("relationship", s.relationship),
    ];

    for (name, value) in fields {
        if value >= 0.8 {
            matching.push(name);
        }
        let differs = if name == "sex" { value < 0.5 } else { value > 0.0 };
        if differs {
            differing.push(name);
        }
    }

    (matching, differing)
}
