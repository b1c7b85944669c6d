//! Precomputed per-person features used to build and query the blocking
//! index without re-deriving the same strings on every comparison.

use crate::model::{DateParser, PersonProvider, PlaceParser};
use crate::phonetic::soundex;

/// Derived signals for one person, computed once before indexing or
/// scoring begins.
///
/// Mirrors the "precompute once per subject, reuse across every
/// candidate comparison" shape: deriving a Soundex code or a birth-year
/// bucket is cheap in isolation, but re-deriving it on every pairwise
/// comparison in a large block adds up. All fields use 0/empty
/// sentinels for "absent" rather than `Option`, matching how the
/// blocking index treats them: a sentinel value must never form a block
/// key on its own.
#[derive(Debug, Clone)]
pub struct PersonFeatures {
    /// Index of this person within the slice passed to the detector.
    pub index: usize,
    pub surname_soundex: String,
    pub given_initial: Option<char>,
    pub given_prefix: String,
    pub surname_prefix: String,
    pub birth_year: i32,
    pub birth_year_bucket: i32,
    pub birth_place_token: Option<String>,
}

const GIVEN_PREFIX_LEN: usize = 2;
const SURNAME_PREFIX_LEN: usize = 4;
const YEAR_BUCKET_SIZE: i32 = 5;

const PLACE_STOP_WORDS: &[&str] = &[
    "county", "township", "parish", "city", "of", "the", "province", "district", "borough",
];

/// Build features for one person.
pub fn compute<P, D, L>(index: usize, person: &P, date_parser: &D, place_parser: &L) -> PersonFeatures
where
    P: PersonProvider,
    D: DateParser,
    L: PlaceParser,
{
    let surname_token = last_token(person.surname());
    let given = crate::text::normalize_name(person.given_name());

    let surname_soundex = soundex(&surname_token);
    let given_initial = given.chars().next().map(|c| c.to_ascii_uppercase());
    let given_prefix = upper_prefix(&given, GIVEN_PREFIX_LEN);
    let surname_prefix = pad_prefix(&upper_prefix(&surname_token, SURNAME_PREFIX_LEN), SURNAME_PREFIX_LEN);

    let birth_year = person
        .birth_date_raw()
        .map(|raw| {
            let parsed = date_parser.parse_date(raw);
            let range = crate::date::date_range(&parsed, raw, 0);
            range.0
        })
        .unwrap_or(0);
    let birth_year_bucket = if birth_year != 0 {
        birth_year.div_euclid(YEAR_BUCKET_SIZE)
    } else {
        0
    };

    let birth_place_token = person
        .birth_place_raw()
        .and_then(|raw| place_token(raw, place_parser));

    PersonFeatures {
        index,
        surname_soundex,
        given_initial,
        given_prefix,
        surname_prefix,
        birth_year,
        birth_year_bucket,
        birth_place_token,
    }
}

/// The last whitespace-delimited token of a (possibly multi-word)
/// surname, normalized. Empty input yields an empty string.
fn last_token(surname: &str) -> String {
    crate::text::normalize_name(surname)
        .split_whitespace()
        .last()
        .unwrap_or("")
        .to_string()
}

fn upper_prefix(s: &str, len: usize) -> String {
    s.chars().take(len).collect::<String>().to_uppercase()
}

fn pad_prefix(s: &str, len: usize) -> String {
    let mut out = s.to_string();
    while out.chars().count() < len {
        out.push(' ');
    }
    out
}

/// First non-trivial uppercase token of a raw place string, skipping a
/// small stop list of common place-hierarchy words; falls back to the
/// first token if every token is trivial. `None` for an effectively
/// empty place string.
fn place_token<L: PlaceParser>(raw: &str, _place_parser: &L) -> Option<String> {
    let tokens: Vec<String> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_uppercase())
        .collect();

    if tokens.is_empty() {
        return None;
    }

    tokens
        .iter()
        .find(|t| !PLACE_STOP_WORDS.contains(&t.to_lowercase().as_str()))
        .or_else(|| tokens.first())
        .cloned()
}
