//! Duplicate-detection core for genealogical person records.
//!
//! Given one or two collections of person records, finds pairs that
//! likely refer to the same real-world person: a multi-strategy
//! blocking index replaces the naive all-pairs scan, feeding a
//! sequential or parallel worker pool that scores candidates across
//! phonetic, date-range, structured-place, sex, and relationship-graph
//! signals. Parsing the source record format, persisting results, and
//! clustering matches into entities are all left to the caller — this
//! crate only ever sees persons and families through the narrow
//! [`model::PersonProvider`]/[`model::FamilyProvider`] accessor traits.

pub mod blocking;
pub mod config;
pub mod date;
pub mod error;
pub mod execution;
pub mod feature;
pub mod metrics;
pub mod model;
pub mod observability;
pub mod phonetic;
pub mod place;
pub mod relationship;
pub mod scoring;
pub mod simple_index;
pub mod text;

pub use config::DetectorConfig;
pub use error::{DetectorError, Result};
pub use execution::{Detector, MatchRecord};
pub use metrics::BlockingMetrics;
pub use model::{
    DateKind, DateParser, Family, FamilyId, FamilyProvider, ParsedDate, ParsedPlace, PersonId,
    PersonProvider, PlaceParser, Sex,
};
pub use scoring::{Confidence, SubscoreBreakdown};
