//! Structured place comparison with an abbreviation-aware state rule.

use crate::model::ParsedPlace;
use crate::text::{normalize, string_similarity};

/// Score two raw place strings, using parsed components when both sides
/// have them and falling back to raw string similarity otherwise.
///
/// Two raw strings that normalize equal always score 1.0 first, ahead
/// of any component-wise comparison.
pub fn score(raw1: &str, raw2: &str, parsed1: &ParsedPlace, parsed2: &ParsedPlace) -> f64 {
    if normalize(raw1) == normalize(raw2) {
        return 1.0;
    }

    let mut total = 0.0;
    let mut count = 0;

    if let (Some(c1), Some(c2)) = (&parsed1.city, &parsed2.city) {
        total += component_score(c1, c2, false);
        count += 1;
    }
    if let (Some(s1), Some(s2)) = (&parsed1.state, &parsed2.state) {
        total += component_score(s1, s2, true);
        count += 1;
    }
    if let (Some(c1), Some(c2)) = (&parsed1.country, &parsed2.country) {
        total += component_score(c1, c2, false);
        count += 1;
    }

    if count == 0 {
        return string_similarity(raw1, raw2);
    }

    total / count as f64
}

fn component_score(a: &str, b: &str, try_abbreviation: bool) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);

    if na == nb {
        return 1.0;
    }

    if try_abbreviation && is_prefix_abbreviation(&na, &nb) {
        return 0.9;
    }

    0.7 * string_similarity(&na, &nb)
}

/// True when one normalized string is a 2-letter form that is a literal
/// prefix of the other. `"ca"` matches `"california"` this way, but
/// `"ny"` does NOT match `"new york"` (which starts with "ne") — postal
/// abbreviations that aren't literal prefixes never match under this
/// strict rule, by design.
fn is_prefix_abbreviation(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() == 2 && b.len() > 2 {
        (a, b)
    } else if b.len() == 2 && a.len() > 2 {
        (b, a)
    } else {
        return false;
    };
    long.starts_with(short)
}
