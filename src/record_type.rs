//! The closed record-type taxonomy.
//!
//! Sites map their own vocabulary onto these members; the taxonomy itself is
//! never extended per site.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    Birth,
    BirthRegistration,
    Baptism,
    Marriage,
    MarriageRegistration,
    Death,
    DeathRegistration,
    Burial,
    Memorial,
    Census,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Record,
    Profile,
    List,
}

/// Whether the hosting site records a civil registration or a church/parish event.
/// Only consulted for words that are ambiguous between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    Civil,
    Church,
}

/// Vital date a record type is anchored on, besides its event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Birth,
    Death,
    /// Only the event date itself.
    Event,
    /// Any of event date, death date or event place.
    Loose,
}

impl RecordType {
    /// Map one lower-cased vocabulary word onto the taxonomy.
    pub fn from_word(word: &str, registry: Registry) -> Option<RecordType> {
        let civil = registry == Registry::Civil;
        let rt = match word {
            "baptism" | "baptisms" | "christening" | "christenings" | "dåp" | "døpte" | "døypte" => {
                RecordType::Baptism
            }
            "birth" | "births" | "fødsel" | "fødte" => {
                if civil {
                    RecordType::BirthRegistration
                } else {
                    RecordType::Birth
                }
            }
            "burial" | "burials" | "gravlagt" | "gravlagde" | "begravde" | "begravelse" => RecordType::Burial,
            "marriage" | "marriages" | "vigsel" | "viede" | "vigde" => {
                if civil {
                    RecordType::MarriageRegistration
                } else {
                    RecordType::Marriage
                }
            }
            "death" | "deaths" | "død" | "døde" => {
                if civil {
                    RecordType::DeathRegistration
                } else {
                    RecordType::Death
                }
            }
            "census" | "folketelling" | "teljing" => RecordType::Census,
            "memorial" | "grave" | "headstone" | "casualty" => RecordType::Memorial,
            _ => return None,
        };
        Some(rt)
    }

    /// First word of a descriptive phrase, lower-cased, with trailing punctuation removed.
    pub fn from_phrase(phrase: &str, registry: Registry) -> Option<RecordType> {
        let word = crate::normalize::first_word(phrase)
            .trim_end_matches([':', ',', '.'])
            .to_lowercase();
        RecordType::from_word(&word, registry)
    }

    /// Civil registrations are commonly recorded up to a year after the event.
    pub fn is_registration(self) -> bool {
        matches!(
            self,
            RecordType::BirthRegistration
                | RecordType::MarriageRegistration
                | RecordType::DeathRegistration
        )
    }

    pub fn is_birth_like(self) -> bool {
        matches!(
            self,
            RecordType::Birth | RecordType::BirthRegistration | RecordType::Baptism
        )
    }

    pub fn is_death_like(self) -> bool {
        matches!(
            self,
            RecordType::Death
                | RecordType::DeathRegistration
                | RecordType::Burial
                | RecordType::Memorial
        )
    }

    pub fn anchor(self) -> Anchor {
        match self {
            RecordType::Memorial | RecordType::Census => Anchor::Loose,
            rt if rt.is_birth_like() => Anchor::Birth,
            rt if rt.is_death_like() => Anchor::Death,
            _ => Anchor::Event,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
