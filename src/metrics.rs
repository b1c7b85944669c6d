//! Per-run blocking statistics and dataset-quality warnings.

use serde::{Deserialize, Serialize};

use crate::blocking::BlockingIndex;

/// Snapshot of blocking-index health for one detection run.
///
/// Computed once, after the index is built and all candidate lists are
/// enumerated; cheap relative to the index build itself since it only
/// scans posting-list lengths rather than re-deriving features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockingMetrics {
    /// Total posting-list size per block family, keyed by family name.
    pub totals_per_family: Vec<(String, usize)>,
    /// Candidate-count histogram over per-person candidate totals:
    /// `[count == 0, count == 1, count > 10]`.
    pub candidate_histogram: [usize; 3],
    pub max_candidates_per_person: usize,
    pub avg_candidates_per_person: f64,
    /// The `N` largest posting lists across all families, descending.
    pub top_block_sizes: Vec<usize>,
    pub has_giant_blocks: bool,
    pub largest_block_size: usize,
    pub people_in_giant_blocks: usize,
}

const TOP_N: usize = 5;

impl BlockingMetrics {
    /// Build a metrics snapshot from the built index and the
    /// per-person candidate counts observed during enumeration.
    pub fn collect(index: &BlockingIndex, candidate_counts: &[usize]) -> Self {
        let families = index.block_family_sizes();

        let mut totals_per_family = Vec::with_capacity(families.len());
        let mut all_sizes: Vec<usize> = Vec::new();
        for (name, sizes) in &families {
            totals_per_family.push((name.to_string(), sizes.iter().sum()));
            all_sizes.extend(sizes.iter().copied());
        }

        all_sizes.sort_unstable_by(|a, b| b.cmp(a));
        let top_block_sizes: Vec<usize> = all_sizes.iter().take(TOP_N).copied().collect();

        let largest_block_size = all_sizes.first().copied().unwrap_or(0);
        let has_giant_blocks = largest_block_size > index.max_block_size();
        let people_in_giant_blocks: usize = all_sizes
            .iter()
            .filter(|&&size| size > index.max_block_size())
            .sum();

        let mut candidate_histogram = [0usize; 3];
        let mut max_candidates = 0usize;
        let mut total_candidates = 0usize;
        for &count in candidate_counts {
            match count {
                0 => candidate_histogram[0] += 1,
                1 => candidate_histogram[1] += 1,
                n if n > 10 => candidate_histogram[2] += 1,
                _ => {}
            }
            max_candidates = max_candidates.max(count);
            total_candidates += count;
        }
        let avg_candidates_per_person = if candidate_counts.is_empty() {
            0.0
        } else {
            total_candidates as f64 / candidate_counts.len() as f64
        };

        Self {
            totals_per_family,
            candidate_histogram,
            max_candidates_per_person: max_candidates,
            avg_candidates_per_person,
            top_block_sizes,
            has_giant_blocks,
            largest_block_size,
            people_in_giant_blocks,
        }
    }
}
