//! The canonical record every site generalizes into.

pub mod builder;
pub mod infer;

use serde::Serialize;

use crate::normalize::date::{self, DateQualifier};
use crate::normalize::{clean_date, clean_text, place::split_country};
use crate::record_type::{RecordType, SourceType};

pub use builder::RecordBuilder;
pub use infer::{InferredFacts, YearRange};

/// Site-independent record. Only built through [`RecordBuilder::finish`] or
/// [`GeneralizedData::unusable`]; `has_valid_data == false` means nothing else
/// in it is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct GeneralizedData {
    pub source_of_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Name::is_empty")]
    pub name: Name,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name_at_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name_at_death: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<DateObj>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<DateObj>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<DateObj>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_place: Option<PlaceObj>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<PlaceObj>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_place: Option<PlaceObj>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_district: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_at_death: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spouses: Vec<Spouse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mothers_maiden_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub household_members: Vec<HouseholdMember>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_data: Option<CollectionData>,

    pub has_valid_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unusable: Option<Unusable>,
}

impl GeneralizedData {
    /// The "no usable data" sentinel: source set, reason attached, everything else default.
    pub fn unusable(source: &str, reason: Unusable) -> GeneralizedData {
        GeneralizedData {
            source_of_data: source.to_string(),
            unusable: Some(reason),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forenames: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Name {
    pub fn is_empty(&self) -> bool {
        self.forenames.is_none() && self.last_name.is_none()
    }
}

/// A display string plus its parsed form when one of the date patterns matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateObj {
    pub date_string: String,
    pub qualifier: DateQualifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl DateObj {
    /// Annotations and "N/R" are stripped first; `None` when nothing is left.
    pub fn from_text(text: &str) -> Option<DateObj> {
        let date_string = clean_date(text);
        if date_string.is_empty() {
            return None;
        }
        let (qualifier, parsed) = match date::parse(&date_string) {
            Some((q, d)) => (q, Some(d)),
            None => (DateQualifier::Exact, None),
        };
        Some(DateObj {
            qualifier,
            year: parsed.map(|d| d.year),
            month: parsed.and_then(|d| d.month),
            day: parsed.and_then(|d| d.day),
            date_string,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceObj {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub place_string: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    /// Smallest to largest, country excluded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locality: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl PlaceObj {
    pub fn from_text(text: &str) -> Option<PlaceObj> {
        let place_string = clean_text(text);
        if place_string.is_empty() {
            return None;
        }
        let (locality, country) = split_country(&place_string);
        Some(PlaceObj {
            place_string,
            street_address: None,
            locality,
            country,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.place_string.is_empty()
            && self.street_address.is_none()
            && self.locality.is_empty()
            && self.country.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Map site vocabulary (English and Norwegian) onto {male, female}.
    pub fn standardize(text: &str) -> Option<Gender> {
        match clean_text(text).to_lowercase().as_str() {
            "m" | "male" | "man" | "mann" | "son" | "sønn" | "mannlig" => Some(Gender::Male),
            "f" | "k" | "female" | "woman" | "kvinne" | "daughter" | "datter" | "kvinnelig" => {
                Some(Gender::Female)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spouse {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marriage_date: Option<DateObj>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marriage_place: Option<PlaceObj>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// The member the page was opened for.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
}

impl CollectionData {
    pub fn new(id: &str) -> CollectionData {
        CollectionData {
            id: id.to_string(),
            ..Default::default()
        }
    }
}

/// Why a generalized record carries no usable data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum Unusable {
    #[error("extraction did not succeed")]
    ExtractionFailed,
    #[error("unrecognized record type {0:?}")]
    UnrecognizedRecordType(String),
    #[error("page holds no person data")]
    NoPersonData,
    #[error("required fields missing for {0}")]
    MissingRequiredFields(RecordType),
}
