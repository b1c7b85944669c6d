//! The detector: sequential and parallel execution over the blocking
//! index, exposing the four top-level operations.

use rayon::prelude::*;

use crate::blocking::BlockingIndex;
use crate::config::DetectorConfig;
use crate::date;
use crate::error::{DetectorError, Result};
use crate::feature::{self, PersonFeatures};
use crate::metrics::BlockingMetrics;
use crate::model::{DateParser, FamilyProvider, PersonId, PersonProvider, PlaceParser, Sex};
use crate::phonetic::phonetic_similarity;
use crate::place;
use crate::relationship;
use crate::scoring::{self, Confidence, SubscoreBreakdown};
use crate::simple_index::SimpleIndex;
use crate::text::{normalize_name, string_similarity};

/// A minimum size, below which the parallel mode never engages even if
/// enabled — thread pool setup costs more than a tiny sequential scan.
const PARALLEL_WITHIN_SET_THRESHOLD: usize = 10;
const PARALLEL_CROSS_SET_PAIR_THRESHOLD: usize = 100;

/// One emitted duplicate pair.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub person_a: PersonId,
    pub person_b: PersonId,
    pub total_score: f64,
    pub confidence: Confidence,
    pub matching_fields: Vec<&'static str>,
    pub differing_fields: Vec<&'static str>,
    pub subscores: SubscoreBreakdown,
}

/// The duplicate-detection core, parameterized by [`DetectorConfig`].
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// `FindDuplicates`: one person set, optional family provider.
    pub fn find_duplicates<P, F, D, L>(
        &self,
        persons: &[P],
        families: Option<&F>,
        date_parser: &D,
        place_parser: &L,
    ) -> Result<(Vec<MatchRecord>, usize, BlockingMetrics)>
    where
        P: PersonProvider + Sync,
        F: FamilyProvider + Sync,
        D: DateParser + Sync,
        L: PlaceParser + Sync,
    {
        if persons.len() < 2 {
            tracing::debug!(count = persons.len(), "fewer than 2 persons, returning empty result");
            return Ok((Vec::new(), 0, BlockingMetrics::default()));
        }

        let span = tracing::info_span!("blocking_index_build", persons = persons.len());
        let _guard = span.enter();

        let features: Vec<PersonFeatures> = persons
            .iter()
            .enumerate()
            .map(|(i, p)| feature::compute(i, p, date_parser, place_parser))
            .collect();

        let jobs: Vec<(usize, usize)>;
        let metrics: BlockingMetrics;

        if self.config.use_blocking {
            let index = BlockingIndex::build(&features, self.config.max_block_size);

            let per_person_candidates: Vec<Vec<(usize, usize)>> = (0..persons.len())
                .map(|i| {
                    index
                        .candidates(i, &features, self.config.max_candidates_per_person)
                        .into_iter()
                        .map(|c| (i, c.index))
                        .collect()
                })
                .collect();

            let candidate_counts: Vec<usize> = per_person_candidates.iter().map(Vec::len).collect();
            metrics = BlockingMetrics::collect(&index, &candidate_counts);
            jobs = per_person_candidates.into_iter().flatten().collect();
        } else {
            let mut naive_jobs = Vec::new();
            for i in 0..persons.len() {
                for j in (i + 1)..persons.len() {
                    naive_jobs.push((i, j));
                }
            }
            jobs = naive_jobs;
            metrics = BlockingMetrics::default();
        }
        drop(_guard);

        let jobs = self.apply_comparison_cap(jobs);
        let parallel = self.config.use_parallel_processing && persons.len() > PARALLEL_WITHIN_SET_THRESHOLD;

        let mut matches = self.run_jobs(
            &jobs,
            persons,
            persons,
            families,
            date_parser,
            place_parser,
            parallel,
        )?;
        sort_matches(&mut matches);

        Ok((matches, jobs.len(), metrics))
    }

    /// `FindDuplicatesBetween`: two disjoint person sets.
    pub fn find_duplicates_between<P, F, D, L>(
        &self,
        persons_a: &[P],
        persons_b: &[P],
        families: Option<&F>,
        date_parser: &D,
        place_parser: &L,
    ) -> Result<(Vec<MatchRecord>, usize)>
    where
        P: PersonProvider + Sync,
        F: FamilyProvider + Sync,
        D: DateParser + Sync,
        L: PlaceParser + Sync,
    {
        if persons_a.is_empty() || persons_b.is_empty() {
            tracing::debug!("one cross-set side is empty, returning empty result");
            return Ok((Vec::new(), 0));
        }

        let features_a: Vec<PersonFeatures> = persons_a
            .iter()
            .enumerate()
            .map(|(i, p)| feature::compute(i, p, date_parser, place_parser))
            .collect();
        let features_b: Vec<PersonFeatures> = persons_b
            .iter()
            .enumerate()
            .map(|(i, p)| feature::compute(i, p, date_parser, place_parser))
            .collect();

        let index_b = SimpleIndex::build(&features_b);
        let mut jobs = Vec::new();
        for fa in &features_a {
            for &j in index_b.lookup(fa) {
                jobs.push((fa.index, j));
            }
        }

        let jobs = self.apply_comparison_cap(jobs);
        // §4.8's auto-switch threshold is stated over the raw cross-set
        // pair-product of the two inputs, not the count of jobs surviving
        // the SimpleIndex pre-filter — a pair of large sets that happen to
        // share few blocking keys should still switch on this metric.
        let pair_product = persons_a.len().saturating_mul(persons_b.len());
        let parallel =
            self.config.use_parallel_processing && pair_product > PARALLEL_CROSS_SET_PAIR_THRESHOLD;

        let mut matches = self.run_jobs(
            &jobs,
            persons_a,
            persons_b,
            families,
            date_parser,
            place_parser,
            parallel,
        )?;
        sort_matches(&mut matches);

        Ok((matches, jobs.len()))
    }

    /// `FindMatches`: one person against one person set, self excluded.
    pub fn find_matches<P, F, D, L>(
        &self,
        person: &P,
        persons: &[P],
        families: Option<&F>,
        date_parser: &D,
        place_parser: &L,
    ) -> Result<Vec<MatchRecord>>
    where
        P: PersonProvider + Sync,
        F: FamilyProvider + Sync,
        D: DateParser + Sync,
        L: PlaceParser + Sync,
    {
        let mut matches = Vec::new();
        for candidate in persons {
            if candidate.stable_id() == person.stable_id() {
                continue;
            }
            if let Some(record) =
                self.score_pair(person, candidate, families, date_parser, place_parser)
            {
                matches.push(record);
            }
        }
        sort_matches(&mut matches);
        Ok(matches)
    }

    /// `Compare`: scalar total score between two persons.
    pub fn compare<P, F, D, L>(
        &self,
        a: &P,
        b: &P,
        families: Option<&F>,
        date_parser: &D,
        place_parser: &L,
    ) -> f64
    where
        P: PersonProvider,
        F: FamilyProvider,
        D: DateParser,
        L: PlaceParser,
    {
        let subscores = self.compute_subscores(a, b, families, date_parser, place_parser);
        scoring::total_score(&subscores, &self.config)
    }

    fn apply_comparison_cap(&self, mut jobs: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
        if self.config.max_comparisons > 0 && jobs.len() > self.config.max_comparisons {
            jobs.truncate(self.config.max_comparisons);
        }
        jobs
    }

    #[allow(clippy::too_many_arguments)]
    fn run_jobs<P, F, D, L>(
        &self,
        jobs: &[(usize, usize)],
        side_a: &[P],
        side_b: &[P],
        families: Option<&F>,
        date_parser: &D,
        place_parser: &L,
        parallel: bool,
    ) -> Result<Vec<MatchRecord>>
    where
        P: PersonProvider + Sync,
        F: FamilyProvider + Sync,
        D: DateParser + Sync,
        L: PlaceParser + Sync,
    {
        if parallel {
            let worker_count = self.worker_count(jobs.len());
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(worker_count)
                .build()
                .map_err(|e| DetectorError::job_queue_allocation(e.to_string()))?;

            let results: Vec<Option<MatchRecord>> = pool.install(|| {
                jobs.par_iter()
                    .map(|&(i, j)| {
                        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            self.score_pair(&side_a[i], &side_b[j], families, date_parser, place_parser)
                        }))
                        .unwrap_or_else(|_| {
                            tracing::warn!(i, j, "compare worker panicked; pair dropped");
                            None
                        })
                    })
                    .collect()
            });
            Ok(results.into_iter().flatten().collect())
        } else {
            let mut matches = Vec::with_capacity(jobs.len());
            for &(i, j) in jobs {
                if let Some(record) =
                    self.score_pair(&side_a[i], &side_b[j], families, date_parser, place_parser)
                {
                    matches.push(record);
                }
            }
            Ok(matches)
        }
    }

    fn worker_count(&self, input_size: usize) -> usize {
        let base = if self.config.num_workers != 0 {
            self.config.num_workers
        } else {
            let cpus = num_cpus::get();
            if cpus >= 4 {
                ((cpus as f64) * 1.5).floor() as usize
            } else {
                cpus
            }
        };
        base.min(input_size.max(1)).max(1)
    }

    fn score_pair<P, F, D, L>(
        &self,
        a: &P,
        b: &P,
        families: Option<&F>,
        date_parser: &D,
        place_parser: &L,
    ) -> Option<MatchRecord>
    where
        P: PersonProvider,
        F: FamilyProvider,
        D: DateParser,
        L: PlaceParser,
    {
        let subscores = self.compute_subscores(a, b, families, date_parser, place_parser);
        let total = scoring::total_score(&subscores, &self.config);

        if total < self.config.min_threshold {
            return None;
        }

        let (matching_fields, differing_fields) = scoring::field_diff(&subscores);
        let confidence = scoring::confidence(total, &self.config);

        Some(MatchRecord {
            person_a: a.stable_id(),
            person_b: b.stable_id(),
            total_score: total,
            confidence,
            matching_fields,
            differing_fields,
            subscores,
        })
    }

    fn compute_subscores<P, F, D, L>(
        &self,
        a: &P,
        b: &P,
        families: Option<&F>,
        date_parser: &D,
        place_parser: &L,
    ) -> SubscoreBreakdown
    where
        P: PersonProvider,
        F: FamilyProvider,
        D: DateParser,
        L: PlaceParser,
    {
        let given_similarity = component_similarity(a.given_name(), b.given_name());
        let mut surname_similarity = component_similarity(a.surname(), b.surname());
        if self.config.use_phonetic_matching {
            surname_similarity =
                surname_similarity.max(phonetic_similarity(a.surname(), b.surname()));
        }

        let name = scoring::name_subscore(
            &a.full_name(),
            &b.full_name(),
            a.given_name(),
            b.given_name(),
            a.surname(),
            b.surname(),
            given_similarity,
            surname_similarity,
        );

        let date_score = date::score(
            date_parser,
            a.birth_date_raw(),
            b.birth_date_raw(),
            self.config.date_tolerance,
        );

        let place_score = match (a.birth_place_raw(), b.birth_place_raw()) {
            (Some(ra), Some(rb)) => {
                let pa = place_parser.parse_place(ra);
                let pb = place_parser.parse_place(rb);
                place::score(ra, rb, &pa, &pb)
            }
            _ => 0.0,
        };

        let sex_score = scoring::sex_subscore(a.sex(), b.sex());

        let relationship_score = if self.config.use_relationship_data && families.is_some() {
            relationship::score(a, b, families.unwrap())
        } else {
            0.0
        };

        SubscoreBreakdown {
            name,
            date: date_score,
            place: place_score,
            sex: sex_score,
            relationship: relationship_score,
        }
    }
}

/// Per-name-component similarity: exact (post-normalize) equality scores
/// a true 1.0, bypassing `string_similarity`'s clamp-to-0.9 — mirrors
/// the "exact match → 1.0" shortcut the place and date comparators use.
fn component_similarity(a: &str, b: &str) -> f64 {
    let na = normalize_name(a);
    let nb = normalize_name(b);
    if !na.is_empty() && na == nb {
        1.0
    } else {
        string_similarity(&na, &nb)
    }
}

fn sort_matches(matches: &mut [MatchRecord]) {
    matches.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
