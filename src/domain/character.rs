//! Rick and Morty records and request filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{FieldError, ValidationError};

/// Name + URL reference to another resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub species: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: ResourceRef,
    #[serde(default)]
    pub location: ResourceRef,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub residents: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub air_date: String,
    /// Season/episode code such as `S01E01`.
    #[serde(default)]
    pub episode: String,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

/// Life status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterStatus {
    Alive,
    Dead,
    Unknown,
}

impl CharacterStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for CharacterStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alive" => Ok(Self::Alive),
            "dead" => Ok(Self::Dead),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "Invalid status '{other}'. Expected one of: Alive, Dead, unknown"
            )),
        }
    }
}

impl fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterGender {
    Female,
    Male,
    Genderless,
    Unknown,
}

impl CharacterGender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Genderless => "Genderless",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for CharacterGender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            "genderless" => Ok(Self::Genderless),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "Invalid gender '{other}'. Expected one of: Female, Male, Genderless, unknown"
            )),
        }
    }
}

impl fmt::Display for CharacterGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character list filters, as raw query strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn check_page(page: Option<u32>, errors: &mut Vec<FieldError>) {
    if page == Some(0) {
        errors.push(FieldError::value("page", "Page must be 1 or greater"));
    }
}

impl CharacterFilter {
    /// Check enum-valued filters and normalise their casing.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        let mut out = Self {
            name: non_empty(&self.name).map(str::to_string),
            status: None,
            species: non_empty(&self.species).map(str::to_string),
            kind: non_empty(&self.kind).map(str::to_string),
            gender: None,
            page: self.page,
        };

        if let Some(raw) = non_empty(&self.status) {
            match raw.parse::<CharacterStatus>() {
                Ok(status) => out.status = Some(status.as_str().to_string()),
                Err(msg) => errors.push(FieldError::value("status", msg)),
            }
        }
        if let Some(raw) = non_empty(&self.gender) {
            match raw.parse::<CharacterGender>() {
                Ok(gender) => out.gender = Some(gender.as_str().to_string()),
                Err(msg) => errors.push(FieldError::value("gender", msg)),
            }
        }
        check_page(self.page, &mut errors);

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(ValidationError::new(errors))
        }
    }

    /// Upstream query pairs, unset filters omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "name", &self.name);
        push_opt(&mut pairs, "status", &self.status);
        push_opt(&mut pairs, "species", &self.species);
        push_opt(&mut pairs, "type", &self.kind);
        push_opt(&mut pairs, "gender", &self.gender);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }

    /// Same filters on another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl LocationFilter {
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        check_page(self.page, &mut errors);
        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }
        Ok(Self {
            name: non_empty(&self.name).map(str::to_string),
            kind: non_empty(&self.kind).map(str::to_string),
            dimension: non_empty(&self.dimension).map(str::to_string),
            page: self.page,
        })
    }

    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "name", &self.name);
        push_opt(&mut pairs, "type", &self.kind);
        push_opt(&mut pairs, "dimension", &self.dimension);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Episode code filter (`S01`, `S01E02`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl EpisodeFilter {
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        check_page(self.page, &mut errors);
        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }
        Ok(Self {
            name: non_empty(&self.name).map(str::to_string),
            episode: non_empty(&self.episode).map(str::to_string),
            page: self.page,
        })
    }

    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "name", &self.name);
        push_opt(&mut pairs, "episode", &self.episode);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

fn push_opt(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<String>) {
    if let Some(v) = non_empty(value) {
        pairs.push((name, v.to_string()));
    }
}

/// A sorted list of character ids, as used by `/character/{ids}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterIds(Vec<u32>);

impl CharacterIds {
    /// Accepts ids in any order; stores them sorted.
    pub fn new(mut ids: Vec<u32>) -> Result<Self, ValidationError> {
        if ids.is_empty() {
            return Err(ValidationError::single(FieldError::missing(
                "ids",
                "At least one character id is required",
            )));
        }
        if ids.contains(&0) {
            return Err(ValidationError::single(FieldError::value(
                "ids",
                "Character ids must be positive integers",
            )));
        }
        ids.sort_unstable();
        Ok(Self(ids))
    }

    /// Parse `"3,1,2"` (also tolerates `[3,1,2]` and spaces).
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
        let mut ids = Vec::new();
        for part in inner.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.parse::<u32>() {
                Ok(id) => ids.push(id),
                Err(_) => {
                    return Err(ValidationError::single(FieldError::value(
                        "ids",
                        format!("Invalid character id '{part}'"),
                    )))
                }
            }
        }
        Self::new(ids)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        self.0.len() == 1
    }

    /// Path segment form: `1,2,3`.
    #[must_use]
    pub fn to_path(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for CharacterIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_gender_parse_case_insensitively() {
        assert_eq!("ALIVE".parse::<CharacterStatus>(), Ok(CharacterStatus::Alive));
        assert_eq!("Unknown".parse::<CharacterStatus>(), Ok(CharacterStatus::Unknown));
        assert_eq!("genderless".parse::<CharacterGender>(), Ok(CharacterGender::Genderless));
        assert!("zombie".parse::<CharacterStatus>().is_err());
    }

    #[test]
    fn filter_validation_normalises() {
        let filter = CharacterFilter {
            name: Some("  rick ".into()),
            status: Some("alive".into()),
            species: Some(String::new()),
            gender: Some("male".into()),
            page: Some(2),
            ..CharacterFilter::default()
        };
        let valid = filter.validate().unwrap();
        assert_eq!(valid.name.as_deref(), Some("rick"));
        assert_eq!(valid.status.as_deref(), Some("Alive"));
        assert_eq!(valid.species, None);
        assert_eq!(
            valid.query_pairs(),
            vec![
                ("name", "rick".to_string()),
                ("status", "Alive".to_string()),
                ("gender", "Male".to_string()),
                ("page", "2".to_string()),
            ]
        );
    }

    #[test]
    fn filter_rejects_bad_values() {
        let err = CharacterFilter {
            status: Some("zombie".into()),
            gender: Some("robot".into()),
            page: Some(0),
            ..CharacterFilter::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.mentions("status"));
        assert!(err.mentions("gender"));
        assert!(err.mentions("page"));
    }

    #[test]
    fn character_ids_sorted() {
        let ids = CharacterIds::parse("3, 1,2").unwrap();
        assert_eq!(ids.as_slice(), &[1, 2, 3]);
        assert_eq!(ids.to_path(), "1,2,3");
        assert!(!ids.is_single());
        assert_eq!(CharacterIds::parse("[7]").unwrap().as_slice(), &[7]);
    }

    #[test]
    fn character_ids_reject_garbage() {
        assert!(CharacterIds::parse("").is_err());
        assert!(CharacterIds::parse("1,a").is_err());
        assert!(CharacterIds::parse("0").is_err());
        assert!(CharacterIds::parse("-1").is_err());
    }

    #[test]
    fn character_decodes_with_missing_fields() {
        let json = r#"{"id":1,"name":"Rick Sanchez","status":"Alive","type":"","origin":{"name":"Earth (C-137)","url":"https://rickandmortyapi.com/api/location/1"}}"#;
        let c: Character = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, 1);
        assert_eq!(c.origin.name, "Earth (C-137)");
        assert!(c.episode.is_empty());
    }
}
