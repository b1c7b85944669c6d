//! End-to-end scenarios exercised through the public API with an
//! in-memory person/family set, no blocking-index internals touched
//! directly.

mod common;

use std::collections::HashMap;

use common::{CityOnlyPlaceParser, Families, GedcomLikeDateParser, NoFamilies, Person};
use gedup_core::{Confidence, Detector, DetectorConfig, Family};

fn detector() -> Detector {
    Detector::new(DetectorConfig::default()).unwrap()
}

#[test]
fn phonetic_surname_pair_is_a_high_confidence_match() {
    let persons = vec![
        Person::new(1, "John", "Smith", "1800", "New York"),
        Person::new(2, "John", "Smyth", "1800", "New York"),
    ];

    let (matches, _, _) = detector()
        .find_duplicates(&persons, None::<&NoFamilies>, &GedcomLikeDateParser, &CityOnlyPlaceParser)
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].subscores.name >= 0.8);
    assert!(matches[0].total_score >= 0.85);
    assert!(matches!(matches[0].confidence, Confidence::High | Confidence::Exact));
}

#[test]
fn about_date_within_tolerance_scores_high_on_date_subscore() {
    let persons = vec![
        Person::new(1, "John", "Doe", "ABT 1800", "New York"),
        Person::new(2, "John", "Doe", "1800", "New York"),
    ];

    let (matches, _, _) = detector()
        .find_duplicates(&persons, None::<&NoFamilies>, &GedcomLikeDateParser, &CityOnlyPlaceParser)
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].subscores.date >= 0.8);
}

#[test]
fn non_overlapping_date_ranges_contribute_zero_date_subscore() {
    let mut config = DetectorConfig::default();
    config.min_threshold = 0.0; // the pair scores below the default cutoff; keep it to inspect the subscore
    let detector = Detector::new(config).unwrap();

    let persons = vec![
        Person::new(1, "John", "Doe", "BEF 1850", "New York"),
        Person::new(2, "John", "Doe", "AFT 1840", "New York"),
    ];

    let (matches, _, _) = detector
        .find_duplicates(&persons, None::<&NoFamilies>, &GedcomLikeDateParser, &CityOnlyPlaceParser)
        .unwrap();

    let pair = matches
        .iter()
        .find(|m| m.person_a == 1 && m.person_b == 2)
        .expect("candidate pair should still be generated via the surname/given-name fallback sweep");
    assert_eq!(pair.subscores.date, 0.0);
}

#[test]
fn common_parents_boost_relationship_subscore_and_total() {
    let mut config = DetectorConfig::default();
    config.min_threshold = 0.0; // keep the pair even if other signals are weak
    let detector = Detector::new(config).unwrap();

    let mut families = HashMap::new();
    families.insert(
        1,
        Family {
            husband: Some(100),
            wife: Some(101),
            children: vec![],
        },
    );
    let family_provider = Families(families);

    let persons = vec![
        Person::new(1, "John", "Doe", "1800", "New York").child_of(1),
        Person::new(2, "John", "Doe", "1800", "New York").child_of(1),
    ];

    let (matches, _, _) = detector
        .find_duplicates(&persons, Some(&family_provider), &GedcomLikeDateParser, &CityOnlyPlaceParser)
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].subscores.relationship >= 0.28);
    assert!(matches[0].total_score >= 0.70);
}

#[test]
fn distinct_people_do_not_match_at_default_threshold() {
    let persons = vec![
        Person::new(1, "John", "Doe", "1800", "New York"),
        Person::new(2, "Jane", "Smith", "1850", "Boston"),
    ];

    let (matches, _, _) = detector()
        .find_duplicates(&persons, None::<&NoFamilies>, &GedcomLikeDateParser, &CityOnlyPlaceParser)
        .unwrap();

    assert!(matches.is_empty());
}

#[test]
fn ten_thousand_person_giant_block_is_reported_and_skipped() {
    let persons: Vec<Person> = (0..10_000)
        .map(|i| Person::new(i as u64, "John", "Smith", "1800", "New York"))
        .collect();

    let (_matches, comparisons, metrics) = detector()
        .find_duplicates(&persons, None::<&NoFamilies>, &GedcomLikeDateParser, &CityOnlyPlaceParser)
        .unwrap();

    assert!(metrics.has_giant_blocks);
    assert_eq!(metrics.largest_block_size, 10_000);
    assert!(metrics.people_in_giant_blocks >= 9_000);
    // The giant primary block is skipped entirely, so no pair from it
    // ever reaches the job list.
    assert_eq!(comparisons, 0);
}

#[test]
fn compare_is_symmetric() {
    let a = Person::new(1, "John", "Smith", "1800", "New York");
    let b = Person::new(2, "John", "Smyth", "1800", "New York");
    let d = detector();

    let ab = d.compare(&a, &b, None::<&NoFamilies>, &GedcomLikeDateParser, &CityOnlyPlaceParser);
    let ba = d.compare(&b, &a, None::<&NoFamilies>, &GedcomLikeDateParser, &CityOnlyPlaceParser);
    assertables::assert_in_delta!(ab, ba, 1e-9);
}

#[test]
fn result_list_is_sorted_by_score_descending() {
    let persons = vec![
        Person::new(1, "John", "Smith", "1800", "New York"),
        Person::new(2, "John", "Smyth", "1800", "New York"),
        Person::new(3, "Jon", "Smithe", "1800", "New York"),
    ];

    let (matches, _, _) = detector()
        .find_duplicates(&persons, None::<&NoFamilies>, &GedcomLikeDateParser, &CityOnlyPlaceParser)
        .unwrap();

    let scores: Vec<f64> = matches.iter().map(|m| m.total_score).collect();
    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert_eq!(scores, sorted);
}
