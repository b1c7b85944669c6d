//! Date range conversion and the date subscore.

use crate::model::{DateKind, ParsedDate};
use crate::text::{normalize, string_similarity};

/// A closed integer year interval. `(0, 0)` means "no usable year".
pub type YearRange = (i32, i32);

/// Extract the first plausible 4-digit year (1000-2999) from a raw date
/// string, used as a fallback when a parsed date's year fields are 0.
fn extract_year(raw: &str) -> i32 {
    let digits: Vec<char> = raw.chars().collect();
    for i in 0..digits.len() {
        if i + 4 > digits.len() {
            break;
        }
        let candidate: String = digits[i..i + 4].iter().collect();
        if candidate.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(year) = candidate.parse::<i32>() {
                if (1000..=2999).contains(&year) {
                    return year;
                }
            }
        }
    }
    0
}

/// Map a parsed date plus tolerance to a closed year interval.
///
/// Falls back to extracting a year from `raw` when the parsed date's
/// year fields are both 0 (the parser found a qualifier but no year).
pub fn date_range(d: &ParsedDate, raw: &str, tolerance: i32) -> YearRange {
    let start_year = if d.start_year != 0 {
        d.start_year
    } else {
        extract_year(raw)
    };
    let end_year = if d.end_year != 0 {
        d.end_year
    } else {
        extract_year(raw)
    };

    if start_year == 0 && end_year == 0 {
        return (0, 0);
    }

    match d.kind {
        DateKind::Exact | DateKind::Unknown => (start_year, start_year),
        DateKind::About => (start_year - tolerance, start_year + tolerance),
        DateKind::Before => (start_year - 2 * tolerance, start_year),
        DateKind::After => (start_year, start_year + 2 * tolerance),
        DateKind::Between | DateKind::FromTo => (start_year, end_year),
        DateKind::From => (start_year, start_year + 50),
        DateKind::To => (end_year - 50, end_year),
    }
}

/// Score the overlap between two year ranges.
///
/// When there is no overlap but both ranges are degenerate points, falls
/// back to an absolute-year-difference bucket. When there is no overlap
/// otherwise, scores 0. Otherwise buckets the overlap ratio.
pub fn score_ranges(r1: YearRange, r2: YearRange) -> f64 {
    let (start1, end1) = r1;
    let (start2, end2) = r2;

    let overlap = (end1.min(end2) - start1.max(start2) + 1).max(0);

    if overlap == 0 {
        if start1 == end1 && start2 == end2 {
            let delta = (start1 - start2).abs();
            return delta_bucket(delta);
        }
        return 0.0;
    }

    let size1 = (end1 - start1 + 1) as f64;
    let size2 = (end2 - start2 + 1) as f64;
    // Containment ratio against the *smaller* range: when one range (an
    // exact date, say) sits fully inside a wider tolerance window, that
    // should read as strong agreement rather than be diluted by the
    // window's own width.
    let ratio = overlap as f64 / size1.min(size2);

    if ratio >= 1.0 {
        1.0
    } else if ratio >= 0.8 {
        0.9
    } else if ratio >= 0.6 {
        0.8
    } else if ratio >= 0.4 {
        0.7
    } else if ratio >= 0.2 {
        0.5
    } else {
        0.3
    }
}

fn delta_bucket(delta: i32) -> f64 {
    match delta {
        0 => 1.0,
        1 => 0.9,
        2 => 0.8,
        3..=5 => 0.7,
        6..=10 => 0.5,
        _ => 0.0,
    }
}

/// Score two dates by parsing them with the supplied parser. Falls back
/// to a string comparison when both ranges come back as "no usable
/// year" (i.e. parsing failed on both sides).
pub fn score<P: crate::model::DateParser>(
    parser: &P,
    raw1: Option<&str>,
    raw2: Option<&str>,
    tolerance: i32,
) -> f64 {
    let (raw1, raw2) = match (raw1, raw2) {
        (Some(a), Some(b)) => (a, b),
        _ => return 0.0,
    };

    let d1 = parser.parse_date(raw1);
    let d2 = parser.parse_date(raw2);

    let r1 = date_range(&d1, raw1, tolerance);
    let r2 = date_range(&d2, raw2, tolerance);

    if r1 == (0, 0) || r2 == (0, 0) {
        return string_fallback(raw1, raw2);
    }

    score_ranges(r1, r2)
}

/// String fallback used when structured date parsing yields no year on
/// either side: identical normalized strings score 1.0, else the same
/// delta-bucket rule on any extractable years, else a plain string
/// similarity.
fn string_fallback(raw1: &str, raw2: &str) -> f64 {
    if normalize(raw1) == normalize(raw2) {
        return 1.0;
    }

    let y1 = extract_year(raw1);
    let y2 = extract_year(raw2);
    if y1 != 0 && y2 != 0 {
        return delta_bucket((y1 - y2).abs());
    }

    0.5 * string_similarity(raw1, raw2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateKind;

    #[test]
    fn exact_date_is_a_point() {
        let d = ParsedDate::new(DateKind::Exact, 1800, 0);
        assert_eq!(date_range(&d, "1800", 2), (1800, 1800));
    }

    #[test]
    fn about_widens_by_tolerance() {
        let d = ParsedDate::new(DateKind::About, 1800, 0);
        assert_eq!(date_range(&d, "ABT 1800", 2), (1798, 1802));
    }

    #[test]
    fn before_and_after_do_not_exceed_end_start() {
        let before = ParsedDate::new(DateKind::Before, 1850, 0);
        assert_eq!(date_range(&before, "BEF 1850", 2), (1846, 1850));

        let after = ParsedDate::new(DateKind::After, 1840, 0);
        assert_eq!(date_range(&after, "AFT 1840", 2), (1840, 1844));
    }

    #[test]
    fn non_overlapping_ranges_score_zero() {
        let r1 = (1846, 1850);
        let r2 = (1840, 1844);
        assert_eq!(score_ranges(r1, r2), 0.0);
    }

    #[test]
    fn degenerate_points_use_delta_bucket() {
        assert_eq!(score_ranges((1800, 1800), (1800, 1800)), 1.0);
        assert_eq!(score_ranges((1800, 1800), (1801, 1801)), 0.9);
        assert_eq!(score_ranges((1800, 1800), (1810, 1810)), 0.5);
        assert_eq!(score_ranges((1800, 1800), (1900, 1900)), 0.0);
    }

    #[test]
    fn ranges_never_invert() {
        for kind in [
            DateKind::Exact,
            DateKind::About,
            DateKind::Before,
            DateKind::After,
            DateKind::Unknown,
        ] {
            let d = ParsedDate::new(kind, 1800, 1800);
            let (start, end) = date_range(&d, "1800", 2);
            assert!(start <= end);
        }
    }

    #[test]
    fn high_overlap_ratio_scores_at_least_half() {
        // overlap ratio >= 0.2 implies score >= 0.5 per the invariant.
        let r1 = (1800, 1804);
        let r2 = (1804, 1820);
        let overlap = (r1.1.min(r2.1) - r1.0.max(r2.0) + 1).max(0) as f64;
        let size1 = (r1.1 - r1.0 + 1) as f64;
        let size2 = (r2.1 - r2.0 + 1) as f64;
        let ratio = overlap / size1.min(size2);
        assert!(ratio >= 0.2);
        assert!(score_ranges(r1, r2) >= 0.5);
    }

    #[test]
    fn point_fully_inside_wide_range_scores_high() {
        // An exact date sitting inside a wide "about" window should read
        // as strong agreement, not be diluted by the window's width.
        let about = (1798, 1802);
        let exact = (1800, 1800);
        assert_eq!(score_ranges(about, exact), 1.0);
    }
}
