//! Inference engine: derived facts computed from a populated record.
//!
//! Every rule here is shared by all sites. Nothing mutates the record; each
//! function computes and returns, so asking twice gives the same answer.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::normalize::{date::year_of, first_word};
use crate::options::Options;

use super::{DateObj, GeneralizedData};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRange {
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
}

impl GeneralizedData {
    /// `name.last_name`, else the last token of the full name, else empty.
    pub fn infer_last_name(&self) -> String {
        if let Some(last) = &self.name.last_name {
            return last.clone();
        }
        self.full_name
            .as_deref()
            .and_then(|full| full.split_whitespace().last())
            .unwrap_or_default()
            .to_string()
    }

    pub fn infer_first_name(&self) -> String {
        let source = self.name.forenames.as_deref().or(self.full_name.as_deref()).unwrap_or_default();
        first_word(source).to_string()
    }

    /// The recorded birth surname when it differs from the current one, else the current one.
    pub fn infer_last_name_at_birth(&self) -> String {
        let current = self.infer_last_name();
        match self.last_name_at_birth.as_deref() {
            Some(at_birth) if !at_birth.is_empty() && at_birth != current => at_birth.to_string(),
            _ => current,
        }
    }

    /// Always the current surname; a differing birth surname only affects
    /// [`GeneralizedData::infer_last_name_at_birth`].
    pub fn infer_last_name_at_death(&self) -> String {
        self.infer_last_name()
    }

    pub fn infer_birth_year(&self) -> Option<i32> {
        year_of_date(&self.birth_date)
    }

    pub fn infer_death_year(&self) -> Option<i32> {
        year_of_date(&self.death_date)
    }

    pub fn infer_event_year(&self) -> Option<i32> {
        year_of_date(&self.event_date)
    }

    /// Years the person could plausibly have been alive, bounded by `as_of`.
    pub fn infer_possible_life_year_range(&self, max_lifespan: i32, as_of: NaiveDate) -> YearRange {
        let now = as_of.year();
        let birth = self.infer_birth_year();
        let death = self.infer_death_year();

        let (from, to) = match (birth, death) {
            (Some(b), Some(d)) => (b, d),
            (Some(b), None) => (b, b.saturating_add(max_lifespan).min(now)),
            (None, Some(d)) => (d.saturating_sub(max_lifespan), d),
            (None, None) => {
                let Some(anchor) = self.infer_event_year() else {
                    return YearRange::default();
                };
                let lag = self.record_type.is_some_and(|rt| rt.is_registration());
                let to = if lag { anchor + 1 } else { anchor };
                (clip(anchor, anchor, now), clip(to, anchor, now))
            }
        };
        YearRange { from_year: Some(from), to_year: Some(to) }
    }
}

fn year_of_date(date: &Option<DateObj>) -> Option<i32> {
    let date = date.as_ref()?;
    date.year.or_else(|| year_of(&date.date_string))
}

fn clip(year: i32, low: i32, high: i32) -> i32 {
    year.min(high).max(low)
}

/// Derived facts bundled for hosts and search builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredFacts {
    pub last_name: String,
    pub first_name: String,
    pub last_name_at_birth: String,
    pub last_name_at_death: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub event_year: Option<i32>,
    pub life_range: YearRange,
}

impl InferredFacts {
    pub fn compute(record: &GeneralizedData, options: &Options, as_of: NaiveDate) -> InferredFacts {
        InferredFacts {
            last_name: record.infer_last_name(),
            first_name: record.infer_first_name(),
            last_name_at_birth: record.infer_last_name_at_birth(),
            last_name_at_death: record.infer_last_name_at_death(),
            birth_year: record.infer_birth_year(),
            death_year: record.infer_death_year(),
            event_year: record.infer_event_year(),
            life_range: record.infer_possible_life_year_range(options.max_lifespan(), as_of),
        }
    }
}
