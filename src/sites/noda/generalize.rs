use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CollectionData, Gender, GeneralizedData, HouseholdMember, RecordBuilder, Unusable};
use crate::record_type::{RecordType, Registry, SourceType};
use crate::sites::{unrecognized, Generalizer};

use super::extract::{NodaPerson, NodaRecord, PageType};
use super::ID;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(1[5-9]\d\d|20\d\d)\b").unwrap());

const COUNTRY: &str = "Norway";

// Labels appear in English or either written Norwegian, depending on the page language.
const NAME_LABELS: &[&str] = &["Name", "Navn", "Namn"];
const GENDER_LABELS: &[&str] = &["Gender", "Sex", "Kjønn"];
const AGE_LABELS: &[&str] = &["Age", "Alder"];
const BIRTH_DATE_LABELS: &[&str] = &["Birth date", "Date of birth", "Fødselsdato", "Født", "Fødd"];
const BIRTH_PLACE_LABELS: &[&str] = &["Birth place", "Place of birth", "Fødested", "Fødestad"];
const DEATH_DATE_LABELS: &[&str] = &["Death date", "Date of death", "Dødsdato", "Død"];
const RESIDENCE_LABELS: &[&str] = &["Residence", "Bosted", "Bustad", "Farm", "Gard"];
const PARISH_LABELS: &[&str] = &["Parish", "Prestegjeld", "Sogn", "Kirkesogn", "Sokn"];
const COUNTY_LABELS: &[&str] = &["County", "Fylke"];
const YEAR_LABELS: &[&str] = &["Year", "År"];
const PAGE_LABELS: &[&str] = &["Page", "Side"];
const POSITION_LABELS: &[&str] = &["Family position", "Familiestilling", "Role", "Rolle"];
const EVENT_DATE_LABELS: &[&str] = &["Event date", "Date", "Dato"];

fn event_date_labels(record_type: RecordType) -> &'static [&'static str] {
    match record_type {
        RecordType::Baptism => &["Baptism date", "Dåpsdato", "Døypedato"],
        RecordType::Birth => BIRTH_DATE_LABELS,
        RecordType::Burial => &["Burial date", "Gravferdsdato", "Begravelsesdato"],
        RecordType::Death => DEATH_DATE_LABELS,
        RecordType::Marriage => &["Marriage date", "Vielsesdato", "Vigseldato"],
        RecordType::Census => &["Census date", "Tellingsdato"],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Father,
    Mother,
    Groom,
    Bride,
    Spouse,
}

impl Role {
    fn of(person: &NodaPerson) -> Option<Role> {
        let label = person.label.as_deref()?.to_lowercase();
        let role = match label.as_str() {
            "father" | "far" => Role::Father,
            "mother" | "mor" => Role::Mother,
            "groom" | "brudgom" => Role::Groom,
            "bride" | "brud" => Role::Bride,
            "spouse" | "husband" | "wife" | "ektefelle" | "ektemann" | "hustru" => Role::Spouse,
            _ => return None,
        };
        Some(role)
    }

    fn is_partner(self) -> bool {
        matches!(self, Role::Groom | Role::Bride | Role::Spouse)
    }
}

fn first_year<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    texts
        .into_iter()
        .find_map(|text| YEAR_RE.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str()))
}

/// Residence, parish and county, smallest first, ending in the country.
fn event_place(ed: &NodaRecord) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let candidates = [
        ed.record_data.first_of(RESIDENCE_LABELS),
        ed.source_data.first_of(PARISH_LABELS),
        ed.source_data.first_of(COUNTY_LABELS),
    ];
    for part in candidates.into_iter().flatten() {
        if !parts.contains(&part) {
            parts.push(part);
        }
    }
    parts.push(COUNTRY);
    parts.join(", ")
}

fn household_member(person: &NodaPerson) -> HouseholdMember {
    let fields = &person.fields;
    HouseholdMember {
        name: person.name(),
        relationship: fields.first_of(POSITION_LABELS).map(str::to_string),
        age: fields.first_of(AGE_LABELS).map(str::to_string),
        gender: fields.first_of(GENDER_LABELS).and_then(Gender::standardize),
        selected: person.current,
    }
}

pub struct NodaGeneralizer;

impl Generalizer for NodaGeneralizer {
    type Record = NodaRecord;

    fn source(&self) -> &'static str {
        ID
    }

    fn generalize_extracted(&self, ed: &NodaRecord) -> GeneralizedData {
        match ed.page_type {
            Some(PageType::Record) => {}
            Some(PageType::Image) => return GeneralizedData::unusable(ID, Unusable::NoPersonData),
            None => return GeneralizedData::unusable(ID, Unusable::ExtractionFailed),
        }

        let token = ed.heading_span_parts.first().map(String::as_str).unwrap_or_default();
        let Some(record_type) = RecordType::from_phrase(token, Registry::Church) else {
            return unrecognized(ID, token.trim_end_matches(':'));
        };

        let data = &ed.record_data;
        let mut b = RecordBuilder::new(ID, SourceType::Record);
        b.record_type(record_type);

        let heading_name = ed.heading_text_parts.join(" ");
        b.full_name(data.first_of(NAME_LABELS).unwrap_or(&heading_name));
        b.gender(data.first_of(GENDER_LABELS).unwrap_or_default());

        let mut event_date = data.first_of(event_date_labels(record_type));
        if event_date.is_none() {
            event_date = data.first_of(EVENT_DATE_LABELS);
        }
        if event_date.is_none() && record_type == RecordType::Census {
            event_date = data
                .first_of(YEAR_LABELS)
                .or_else(|| ed.source_data.first_of(YEAR_LABELS))
                .or_else(|| {
                    let names = ed.collection_headings.iter().map(|c| c.name.as_str());
                    first_year(ed.source_information.as_deref().into_iter().chain(names))
                });
        }
        b.event_date(event_date.unwrap_or_default());
        b.event_place(&event_place(ed));

        if record_type != RecordType::Birth {
            b.birth_date(data.first_of(BIRTH_DATE_LABELS).unwrap_or_default());
        }
        b.birth_place(data.first_of(BIRTH_PLACE_LABELS).unwrap_or_default());
        if record_type.is_death_like() {
            if record_type != RecordType::Death {
                b.death_date(data.first_of(DEATH_DATE_LABELS).unwrap_or_default());
            }
            b.age_at_death(data.first_of(AGE_LABELS).unwrap_or_default());
        }

        let subject_role = ed.people().find(|p| p.current).and_then(Role::of);
        match subject_role {
            Some(Role::Groom) => {
                b.gender("male");
            }
            Some(Role::Bride) => {
                b.gender("female");
            }
            _ => {}
        }

        for person in ed.people().filter(|p| !p.current) {
            let name = person.name();
            match Role::of(person) {
                Some(Role::Father) => {
                    b.father_name(&name);
                }
                Some(Role::Mother) => {
                    b.mother_name(&name);
                }
                Some(role) if role.is_partner() && subject_role.is_some_and(|s| s != role) => {
                    b.spouse(&name);
                }
                _ => {}
            }
        }

        if record_type == RecordType::Census {
            for person in ed.people() {
                b.household_member(household_member(person));
            }
        }

        if let Some(source) = ed.source_id.as_deref() {
            let mut collection = CollectionData::new(source);
            collection.page = ed.source_data.first_of(PAGE_LABELS).map(str::to_string);
            b.collection(collection);
        }

        b.finish()
    }
}
