//! The multi-strategy blocking index: candidate generation without an
//! all-pairs scan.
//!
//! Six inverted indexes are built from [`PersonFeatures`] in a single
//! pass, then queried per person to produce a prioritized, capped
//! candidate list. Keys are plain Rust tuples rather than concatenated
//! strings, so `("AB", "C")` and `("A", "BC")` are distinct by
//! construction — no manual delimiter is needed to avoid that collision.

use ahash::AHashMap;

use crate::feature::PersonFeatures;

const DEFAULT_MAX_BLOCK_SIZE: usize = 5000;
const DEFAULT_MAX_CANDIDATES_PER_PERSON: usize = 200;

/// One candidate produced for a person, before scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Dense sequence index of the candidate person.
    pub index: usize,
    pub priority: i32,
    pub year_diff: i32,
    pub place_match: bool,
}

type Postings = AHashMap<(String, i32), Vec<usize>>;
type StringPostings = AHashMap<(String, String), Vec<usize>>;
type CharPostings = AHashMap<(String, char), Vec<usize>>;
type RescuePostings = AHashMap<(String, String, String), Vec<usize>>;

/// Built once per detection run, then queried read-only.
pub struct BlockingIndex {
    primary: Postings,
    expanded_year: Postings,
    year_bucket: Postings,
    surname_initial: CharPostings,
    surname_given_prefix: StringPostings,
    surname_prefix_place: StringPostings,
    rescue: RescuePostings,
    max_block_size: usize,
}

impl BlockingIndex {
    /// Build the index from a full feature set. `max_block_size` of 0
    /// is treated as "no cap" (the default is still applied by callers
    /// that pass it through from configuration).
    pub fn build(features: &[PersonFeatures], max_block_size: usize) -> Self {
        let max_block_size = if max_block_size == 0 {
            usize::MAX
        } else {
            max_block_size
        };

        let mut primary: Postings = AHashMap::new();
        let mut expanded_year: Postings = AHashMap::new();
        let mut year_bucket: Postings = AHashMap::new();
        let mut surname_initial: CharPostings = AHashMap::new();
        let mut surname_given_prefix: StringPostings = AHashMap::new();
        let mut surname_prefix_place: StringPostings = AHashMap::new();
        let mut rescue: RescuePostings = AHashMap::new();

        for f in features {
            let has_surname = !f.surname_soundex.is_empty();
            let has_year = f.birth_year != 0;
            let has_surname_prefix = !f.surname_prefix.trim().is_empty();
            let has_given_prefix = !f.given_prefix.is_empty();

            if has_surname && has_year {
                primary
                    .entry((f.surname_soundex.clone(), f.birth_year))
                    .or_default()
                    .push(f.index);

                for offset in -1..=1 {
                    expanded_year
                        .entry((f.surname_soundex.clone(), f.birth_year + offset))
                        .or_default()
                        .push(f.index);
                }

                year_bucket
                    .entry((f.surname_soundex.clone(), f.birth_year_bucket))
                    .or_default()
                    .push(f.index);
            }

            if has_surname {
                if let Some(initial) = f.given_initial {
                    surname_initial
                        .entry((f.surname_soundex.clone(), initial))
                        .or_default()
                        .push(f.index);
                }

                if has_given_prefix {
                    surname_given_prefix
                        .entry((f.surname_soundex.clone(), f.given_prefix.clone()))
                        .or_default()
                        .push(f.index);
                }
            }

            if has_surname_prefix {
                if let Some(place) = &f.birth_place_token {
                    surname_prefix_place
                        .entry((f.surname_prefix.clone(), place.clone()))
                        .or_default()
                        .push(f.index);
                }
            }

            if has_given_prefix && has_surname_prefix {
                if let Some(place) = &f.birth_place_token {
                    let given_key = prefix3(&f.given_prefix);
                    let surname_key = prefix3(f.surname_prefix.trim());
                    rescue
                        .entry((given_key, surname_key, place.clone()))
                        .or_default()
                        .push(f.index);
                }
            }
        }

        Self {
            primary,
            expanded_year,
            year_bucket,
            surname_initial,
            surname_given_prefix,
            surname_prefix_place,
            rescue,
            max_block_size,
        }
    }

    /// Enumerate, prioritize, and cap candidates for one person.
    ///
    /// Only ever returns candidates with `index > person_index` (the
    /// caller owns the other half of the pair ordering for the
    /// opposite direction), and never includes `person_index` itself.
    pub fn candidates(
        &self,
        person_index: usize,
        features: &[PersonFeatures],
        max_candidates_per_person: usize,
    ) -> Vec<Candidate> {
        let cap = if max_candidates_per_person == 0 {
            usize::MAX
        } else {
            max_candidates_per_person
        };
        let f = &features[person_index];

        let mut found: AHashMap<usize, Candidate> = AHashMap::new();

        if !f.surname_soundex.is_empty() && f.birth_year != 0 {
            for offset in -2..=2 {
                let key = (f.surname_soundex.clone(), f.birth_year + offset);
                self.sweep_year_maps(&key, f, features, &mut found);
            }

            let bucket_key = (f.surname_soundex.clone(), f.birth_year_bucket);
            if let Some(list) = self.year_bucket.get(&bucket_key) {
                if list.len() <= self.max_block_size {
                    for &idx in list {
                        self.insert_flat_candidate(idx, person_index, f, features, 5, &mut found);
                    }
                }
            }
        }

        if found.len() < cap {
            if let Some(initial) = f.given_initial {
                if let Some(list) = self.surname_initial.get(&(f.surname_soundex.clone(), initial)) {
                    if list.len() <= self.max_block_size {
                        for &idx in list {
                            self.insert_flat_candidate(idx, person_index, f, features, 3, &mut found);
                        }
                    }
                }
            }
        }

        if found.len() < cap && !f.given_prefix.is_empty() {
            let key = (f.surname_soundex.clone(), f.given_prefix.clone());
            if let Some(list) = self.surname_given_prefix.get(&key) {
                if list.len() <= self.max_block_size {
                    for &idx in list {
                        self.insert_flat_candidate(idx, person_index, f, features, 2, &mut found);
                    }
                }
            }
        }

        if found.len() < cap && !f.surname_prefix.trim().is_empty() {
            if let Some(place) = &f.birth_place_token {
                let key = (f.surname_prefix.clone(), place.clone());
                if let Some(list) = self.surname_prefix_place.get(&key) {
                    if list.len() <= self.max_block_size {
                        for &idx in list {
                            self.insert_flat_candidate(idx, person_index, f, features, 1, &mut found);
                        }
                    }
                }
            }
        }

        if found.is_empty() && !f.given_prefix.is_empty() && !f.surname_prefix.trim().is_empty() {
            if let Some(place) = &f.birth_place_token {
                let key = (prefix3(&f.given_prefix), prefix3(f.surname_prefix.trim()), place.clone());
                if let Some(list) = self.rescue.get(&key) {
                    if list.len() <= self.max_block_size {
                        for &idx in list {
                            self.insert_flat_candidate(idx, person_index, f, features, 0, &mut found);
                        }
                    }
                }
            }
        }

        let mut out: Vec<Candidate> = found.into_values().collect();
        out.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.year_diff.cmp(&b.year_diff))
                .then(b.place_match.cmp(&a.place_match))
                .then(a.index.cmp(&b.index))
        });
        out.truncate(cap);
        out
    }

    fn sweep_year_maps(
        &self,
        key: &(String, i32),
        f: &PersonFeatures,
        features: &[PersonFeatures],
        found: &mut AHashMap<usize, Candidate>,
    ) {
        let offset = key.1 - f.birth_year;
        let base_priority = 10 + year_bonus(offset.abs());

        if let Some(list) = self.primary.get(key) {
            if list.len() <= self.max_block_size {
                for &idx in list {
                    self.insert_primary_candidate(idx, f.index, f, features, base_priority, found);
                }
            }
        }
        if let Some(list) = self.expanded_year.get(key) {
            if list.len() <= self.max_block_size {
                for &idx in list {
                    self.insert_primary_candidate(idx, f.index, f, features, base_priority, found);
                }
            }
        }
    }

    /// Insert a candidate found by the primary (year-sweep) strategy,
    /// whose base priority gets the full §4.6.1 formula: the
    /// surname-prefix/place/given-prefix bonus terms on top of
    /// `10 + year_bonus`.
    fn insert_primary_candidate(
        &self,
        candidate_index: usize,
        person_index: usize,
        f: &PersonFeatures,
        features: &[PersonFeatures],
        base_priority: i32,
        found: &mut AHashMap<usize, Candidate>,
    ) {
        self.insert_candidate_with_priority(
            candidate_index,
            person_index,
            f,
            features,
            |c| full_priority(base_priority, f, c),
            found,
        );
    }

    /// Insert a candidate found by the bucket/fallback/rescue sweeps,
    /// which keep the flat priority spec.md §4.6 assigns to that sweep
    /// (5/3/2/1/0) rather than the §4.6.1 formula, which is scoped to
    /// the primary sweep only.
    fn insert_flat_candidate(
        &self,
        candidate_index: usize,
        person_index: usize,
        f: &PersonFeatures,
        features: &[PersonFeatures],
        flat_priority: i32,
        found: &mut AHashMap<usize, Candidate>,
    ) {
        self.insert_candidate_with_priority(
            candidate_index,
            person_index,
            f,
            features,
            |_c| flat_priority,
            found,
        );
    }

    fn insert_candidate_with_priority(
        &self,
        candidate_index: usize,
        person_index: usize,
        f: &PersonFeatures,
        features: &[PersonFeatures],
        priority_for: impl Fn(&PersonFeatures) -> i32,
        found: &mut AHashMap<usize, Candidate>,
    ) {
        if candidate_index <= person_index {
            return;
        }
        let c = &features[candidate_index];

        let year_diff = if f.birth_year != 0 && c.birth_year != 0 {
            (f.birth_year - c.birth_year).abs()
        } else {
            i32::MAX
        };
        let place_match = matches!((&f.birth_place_token, &c.birth_place_token), (Some(a), Some(b)) if a == b);

        let priority = priority_for(c);

        found
            .entry(candidate_index)
            .and_modify(|existing| {
                if priority > existing.priority {
                    existing.priority = priority;
                    existing.year_diff = year_diff;
                    existing.place_match = place_match;
                }
            })
            .or_insert(Candidate {
                index: candidate_index,
                priority,
                year_diff,
                place_match,
            });
    }

    /// Per-family posting-list sizes, for the metrics snapshot. Families
    /// with no entries at all are omitted.
    pub fn block_family_sizes(&self) -> Vec<(&'static str, Vec<usize>)> {
        vec![
            ("primary", self.primary.values().map(Vec::len).collect()),
            ("expanded_year", self.expanded_year.values().map(Vec::len).collect()),
            ("year_bucket", self.year_bucket.values().map(Vec::len).collect()),
            (
                "surname_initial",
                self.surname_initial.values().map(Vec::len).collect(),
            ),
            (
                "surname_given_prefix",
                self.surname_given_prefix.values().map(Vec::len).collect(),
            ),
            (
                "surname_prefix_place",
                self.surname_prefix_place.values().map(Vec::len).collect(),
            ),
            ("rescue", self.rescue.values().map(Vec::len).collect()),
        ]
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }
}

fn year_bonus(abs_delta: i32) -> i32 {
    match abs_delta {
        0 => 5,
        1 => 3,
        2 => 1,
        _ => 0,
    }
}

fn full_priority(base: i32, a: &PersonFeatures, b: &PersonFeatures) -> i32 {
    let mut priority = base;

    let a_surname_prefix = a.surname_prefix.trim();
    let b_surname_prefix = b.surname_prefix.trim();
    if !a_surname_prefix.is_empty() && a_surname_prefix == b_surname_prefix {
        priority += 3;
    }

    if let (Some(pa), Some(pb)) = (&a.birth_place_token, &b.birth_place_token) {
        if pa == pb {
            priority += 2;
        }
    }

    if !a.given_prefix.is_empty() && a.given_prefix == b.given_prefix {
        priority += 2;
    }

    priority
}

fn prefix3(s: &str) -> String {
    s.chars().take(3).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(index: usize, soundex: &str, year: i32, place: Option<&str>) -> PersonFeatures {
        PersonFeatures {
            index,
            surname_soundex: soundex.to_string(),
            given_initial: Some('J'),
            given_prefix: "JO".to_string(),
            surname_prefix: pad(soundex, 4),
            birth_year: year,
            birth_year_bucket: if year != 0 { year.div_euclid(5) } else { 0 },
            birth_place_token: place.map(str::to_string),
        }
    }

    fn pad(s: &str, len: usize) -> String {
        let mut out: String = s.chars().take(len).collect();
        while out.chars().count() < len {
            out.push(' ');
        }
        out
    }

    #[test]
    fn exact_year_and_surname_match_via_primary() {
        let features = vec![
            feature(0, "S530", 1800, Some("BOSTON")),
            feature(1, "S530", 1800, Some("BOSTON")),
        ];
        let index = BlockingIndex::build(&features, 5000);
        let candidates = index.candidates(0, &features, 200);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].index, 1);
    }

    #[test]
    fn only_higher_index_candidates_are_returned() {
        let features = vec![
            feature(0, "S530", 1800, None),
            feature(1, "S530", 1800, None),
        ];
        let index = BlockingIndex::build(&features, 5000);
        assert!(index.candidates(1, &features, 200).is_empty());
    }

    #[test]
    fn off_by_one_year_still_found_via_expanded_index() {
        let features = vec![
            feature(0, "S530", 1800, None),
            feature(1, "S530", 1801, None),
        ];
        let index = BlockingIndex::build(&features, 5000);
        let candidates = index.candidates(0, &features, 200);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn oversized_block_is_skipped() {
        let mut features = vec![];
        for i in 0..10 {
            features.push(feature(i, "S530", 1800, None));
        }
        let index = BlockingIndex::build(&features, 5);
        let candidates = index.candidates(0, &features, 200);
        assert!(candidates.is_empty());

        let sizes = index.block_family_sizes();
        let primary_sizes = sizes.iter().find(|(name, _)| *name == "primary").unwrap();
        assert!(primary_sizes.1.iter().any(|&s| s > 5));
    }

    #[test]
    fn self_pairs_never_emitted() {
        let features = vec![feature(0, "S530", 1800, None)];
        let index = BlockingIndex::build(&features, 5000);
        assert!(index.candidates(0, &features, 200).is_empty());
    }
}
