//! Hand-rolled in-memory `PersonProvider`/`FamilyProvider`/`DateParser`/
//! `PlaceParser` test doubles shared by the integration tests.

use std::collections::HashMap;

use gedup_core::{DateKind, Family, FamilyId, ParsedDate, ParsedPlace, PersonId, PersonProvider, Sex};

#[derive(Debug, Clone)]
pub struct Person {
    pub id: PersonId,
    pub given: String,
    pub surname: String,
    pub sex: Sex,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub as_child: Vec<FamilyId>,
    pub as_spouse: Vec<FamilyId>,
}

impl Person {
    pub fn new(id: PersonId, given: &str, surname: &str, birth_date: &str, birth_place: &str) -> Self {
        Self {
            id,
            given: given.to_string(),
            surname: surname.to_string(),
            sex: Sex::Unknown,
            birth_date: Some(birth_date.to_string()),
            birth_place: Some(birth_place.to_string()),
            as_child: Vec::new(),
            as_spouse: Vec::new(),
        }
    }

    pub fn child_of(mut self, family: FamilyId) -> Self {
        self.as_child.push(family);
        self
    }
}

impl PersonProvider for Person {
    fn stable_id(&self) -> PersonId {
        self.id
    }
    fn full_name(&self) -> String {
        format!("{} {}", self.given, self.surname)
    }
    fn given_name(&self) -> &str {
        &self.given
    }
    fn surname(&self) -> &str {
        &self.surname
    }
    fn sex(&self) -> Sex {
        self.sex
    }
    fn birth_date_raw(&self) -> Option<&str> {
        self.birth_date.as_deref()
    }
    fn birth_place_raw(&self) -> Option<&str> {
        self.birth_place.as_deref()
    }
    fn families_as_child(&self) -> &[FamilyId] {
        &self.as_child
    }
    fn families_as_spouse(&self) -> &[FamilyId] {
        &self.as_spouse
    }
}

pub struct Families(pub HashMap<FamilyId, Family>);

impl gedup_core::FamilyProvider for Families {
    fn family(&self, id: FamilyId) -> Option<Family> {
        self.0.get(&id).cloned()
    }
}

pub struct NoFamilies;
impl gedup_core::FamilyProvider for NoFamilies {
    fn family(&self, _id: FamilyId) -> Option<Family> {
        None
    }
}

/// Parses GEDCOM-style qualifiers (`ABT`, `BEF`, `AFT`) plus a bare year.
pub struct GedcomLikeDateParser;

impl gedup_core::DateParser for GedcomLikeDateParser {
    fn parse_date(&self, raw: &str) -> ParsedDate {
        let trimmed = raw.trim();
        if let Some(rest) = trimmed.strip_prefix("ABT ") {
            return ParsedDate::new(DateKind::About, rest.trim().parse().unwrap_or(0), 0);
        }
        if let Some(rest) = trimmed.strip_prefix("BEF ") {
            return ParsedDate::new(DateKind::Before, rest.trim().parse().unwrap_or(0), 0);
        }
        if let Some(rest) = trimmed.strip_prefix("AFT ") {
            return ParsedDate::new(DateKind::After, rest.trim().parse().unwrap_or(0), 0);
        }
        match trimmed.parse::<i32>() {
            Ok(year) => ParsedDate::new(DateKind::Exact, year, 0),
            Err(_) => ParsedDate::unknown(),
        }
    }
}

/// Treats the whole raw string as a city; state/country are never
/// populated, matching how little structure the scenario data needs.
pub struct CityOnlyPlaceParser;

impl gedup_core::PlaceParser for CityOnlyPlaceParser {
    fn parse_place(&self, raw: &str) -> ParsedPlace {
        ParsedPlace {
            city: Some(raw.to_string()),
            state: None,
            country: None,
        }
    }
}
