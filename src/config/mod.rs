//! Configuration for the duplicate-detection core

use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, Result};

/// Configuration recognized by [`crate::Detector`].
///
/// Five scoring weights, three confidence/threshold boundaries, toggles
/// for the optional scoring signals and execution strategy, and a
/// handful of sizing knobs for the blocking index and worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Matches scoring below this are discarded.
    pub min_threshold: f64,
    /// Total score at or above this is labeled `high`.
    pub high_confidence_threshold: f64,
    /// Total score at or above this is labeled `exact`.
    pub exact_match_threshold: f64,

    pub name_weight: f64,
    pub date_weight: f64,
    pub place_weight: f64,
    pub sex_weight: f64,
    pub relationship_weight: f64,

    /// Enables the phonetic (soundex) contribution to the name subscore.
    pub use_phonetic_matching: bool,
    /// Enables the relationship subscore; requires a family provider.
    pub use_relationship_data: bool,
    /// Selects the parallel worker-pool execution mode (auto-switches
    /// off for small inputs regardless of this flag).
    pub use_parallel_processing: bool,
    /// Selects the blocking index over the simple cross-set pre-filter
    /// for within-set detection.
    pub use_blocking: bool,

    /// Tolerance, in years, applied to "about"/"before"/"after" dates.
    pub date_tolerance: i32,
    /// Hard cap on the number of comparisons performed (0 = unlimited).
    pub max_comparisons: usize,
    /// Per-person candidate cap after blocking (0 = unlimited).
    pub max_candidates_per_person: usize,
    /// Worker pool size override (0 = auto-size from CPU count).
    pub num_workers: usize,

    /// Posting lists larger than this are skipped for every lookup.
    pub max_block_size: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_threshold: 0.60,
            high_confidence_threshold: 0.85,
            exact_match_threshold: 0.95,

            name_weight: 0.40,
            date_weight: 0.30,
            place_weight: 0.15,
            sex_weight: 0.05,
            relationship_weight: 0.10,

            use_phonetic_matching: true,
            use_relationship_data: true,
            use_parallel_processing: true,
            use_blocking: true,

            date_tolerance: 2,
            max_comparisons: 0,
            max_candidates_per_person: 200,
            num_workers: 0,

            max_block_size: 5000,
        }
    }
}

impl DetectorConfig {
    /// Reject configurations the detector cannot sensibly run with.
    ///
    /// The core does not require the five weights to sum to 1 (callers
    /// may intentionally under- or over-weight), but it rejects negative
    /// weights and thresholds outside `[0.0, 1.0]` since those can never
    /// participate in a meaningful score.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("name_weight", self.name_weight),
            ("date_weight", self.date_weight),
            ("place_weight", self.place_weight),
            ("sex_weight", self.sex_weight),
            ("relationship_weight", self.relationship_weight),
        ];
        for (name, value) in weights {
            if value < 0.0 {
                return Err(DetectorError::invalid_configuration(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        let thresholds = [
            ("min_threshold", self.min_threshold),
            ("high_confidence_threshold", self.high_confidence_threshold),
            ("exact_match_threshold", self.exact_match_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(DetectorError::invalid_configuration(format!(
                    "{name} must be in [0.0, 1.0], got {value}"
                )));
            }
        }

        Ok(())
    }
}
