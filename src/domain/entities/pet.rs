//! Adoptable pet entity.

use chrono::NaiveDate;
use reqwest::Url;

/// Unique identifier of a pet on the open-data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PetId(pub u64);

impl std::fmt::Display for PetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sex code of a pet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sex {
    /// `M`
    Male,
    /// `F`
    Female,
    /// `N`
    Unknown,
    /// Any code the service adds later.
    Other(String),
}

impl Sex {
    /// Parses a sex code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "M" => Self::Male,
            "F" => Self::Female,
            "N" | "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Body size code of a pet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySize {
    /// `SMALL`
    Small,
    /// `MEDIUM`
    Medium,
    /// `BIG`
    Big,
    /// Any other code.
    Other(String),
}

impl BodySize {
    /// Parses a body size code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "SMALL" => Self::Small,
            "MEDIUM" => Self::Medium,
            "BIG" => Self::Big,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Age bracket code of a pet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgeGroup {
    /// `CHILD`
    Child,
    /// `ADULT`
    Adult,
    /// Any other code.
    Other(String),
}

impl AgeGroup {
    /// Parses an age code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "CHILD" => Self::Child,
            "ADULT" => Self::Adult,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Tri-state flag used for sterilization and vaccination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flag {
    /// `T`
    Yes,
    /// `F`
    No,
    /// `N` or anything unrecognised.
    #[default]
    Unknown,
}

impl Flag {
    /// Parses a flag code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "T" => Self::Yes,
            "F" => Self::No,
            _ => Self::Unknown,
        }
    }
}

/// One adoptable animal, as published by a shelter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pet {
    /// Identifier.
    pub id: PetId,
    /// Where the animal is kept.
    pub location: String,
    /// Species, e.g. dog or cat.
    pub kind: String,
    /// Sex.
    pub sex: Sex,
    /// Body size.
    pub body_size: BodySize,
    /// Colour description.
    pub colour: String,
    /// Age bracket.
    pub age: AgeGroup,
    /// Whether the animal is sterilized.
    pub sterilized: Flag,
    /// Whether the animal is vaccinated against rabies.
    pub vaccinated: Flag,
    /// Where the animal was found.
    pub found_place: String,
    /// Adoption status code.
    pub status: String,
    /// Free-text remark.
    pub remark: String,
    /// Date the animal opened for adoption, as published.
    pub open_date: String,
    /// Date the listing closed, as published.
    pub closed_date: String,
    /// Last update, as published.
    pub updated_at: String,
    /// Creation date, as published.
    pub created_at: String,
    /// Photo location, if the listing has a usable one.
    pub photo_url: Option<Url>,
    /// Shelter address.
    pub address: String,
    /// Shelter telephone.
    pub telephone: String,
    /// Breed or variety.
    pub variety: String,
    /// Shelter name.
    pub shelter_name: String,
}

impl Pet {
    /// Parsed open date.
    #[must_use]
    pub fn opened_on(&self) -> Option<NaiveDate> {
        parse_published_date(&self.open_date)
    }

    /// Parsed last update date.
    #[must_use]
    pub fn updated_on(&self) -> Option<NaiveDate> {
        parse_published_date(&self.updated_at)
    }
}

/// Parses a published date such as `2024/01/31` or `2024-01-31 10:20:00`.
#[must_use]
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .ok()
}

/// Parses a published photo location; empty or malformed yields `None`.
#[must_use]
pub fn parse_photo_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}
