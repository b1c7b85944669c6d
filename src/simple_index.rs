//! The simpler cross-set pre-filter index.
//!
//! Kept deliberately separate from [`crate::blocking::BlockingIndex`]
//! rather than unified with it — cross-set detection uses this smaller,
//! single-key index (surname, birth year, birth place) instead of the
//! full six-map scheme. See `DESIGN.md` for why this asymmetry is kept
//! rather than resolved.

use ahash::AHashMap;

use crate::feature::PersonFeatures;

type Key = (String, i32, Option<String>);

/// Built once per side of a cross-set comparison.
pub struct SimpleIndex {
    map: AHashMap<Key, Vec<usize>>,
}

impl SimpleIndex {
    pub fn build(features: &[PersonFeatures]) -> Self {
        let mut map: AHashMap<Key, Vec<usize>> = AHashMap::new();
        for f in features {
            if f.surname_soundex.is_empty() {
                continue;
            }
            let key = (f.surname_soundex.clone(), f.birth_year, f.birth_place_token.clone());
            map.entry(key).or_default().push(f.index);
        }
        Self { map }
    }

    /// All indexes (into the *other* set's feature slice) sharing this
    /// person's (surname, birth year, birth place) key.
    pub fn lookup(&self, f: &PersonFeatures) -> &[usize] {
        if f.surname_soundex.is_empty() {
            return &[];
        }
        let key = (f.surname_soundex.clone(), f.birth_year, f.birth_place_token.clone());
        self.map.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}
