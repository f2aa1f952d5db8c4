use std::sync::LazyLock;

use regex::Regex;

use crate::model::{
    CollectionData, DateObj, Gender, GeneralizedData, HouseholdMember, PlaceObj, RecordBuilder, Spouse, Unusable,
};
use crate::record_type::{RecordType, Registry, SourceType};
use crate::sites::{or_empty, unrecognized, Generalizer, LabelledFields};

use super::extract::{FmpRecord, HouseholdRow, PageKind};

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(1[5-9]\d\d|20\d\d)\b").unwrap());

static YEAR_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\s*-\s*\d{4}\b").unwrap());

/// Collection titles naming one of these are civil registration indexes.
const CIVIL_MARKERS: &[&str] = &["civil", "registration"];

/// Statutory registration in England and Wales began in July 1837.
const CIVIL_REGISTRATION_START: i32 = 1837;

fn is_civil_collection(lower: &str) -> bool {
    let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric()).collect();
    if CIVIL_MARKERS.iter().any(|m| words.contains(m)) {
        return true;
    }
    YEAR_SPAN_RE
        .captures(lower)
        .and_then(|c| c[1].parse::<i32>().ok())
        .is_some_and(|start| start >= CIVIL_REGISTRATION_START)
}

const EVENT_DATE_LABELS: &[&str] = &[
    "Event date",
    "Baptism date",
    "Marriage date",
    "Burial date",
    "Registration date",
    "Date",
    "Year",
    "Registration year",
];
const EVENT_PLACE_LABELS: &[&str] = &["Place", "Event place", "Parish", "Registration district", "District"];
const DISTRICT_LABELS: &[&str] = &["Registration district", "District"];

/// "England & Wales Births 1837-2006" → BirthRegistration.
fn record_type_for_collection(collection: &str) -> Option<RecordType> {
    let lower = collection.to_lowercase();
    let registry = if is_civil_collection(&lower) {
        Registry::Civil
    } else {
        Registry::Church
    };
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .find_map(|word| RecordType::from_word(word, registry))
}

/// "Father's name", or "Father's first name(s)" joined with "Father's last name".
fn relative_name(data: &LabelledFields, role: &str) -> String {
    let label = |suffix: &str| format!("{}'s {}", role, suffix);
    if let Some(name) = data.get(&label("name")) {
        return name.to_string();
    }
    let first = data
        .get(&label("first name(s)"))
        .or_else(|| data.get(&label("first name")));
    let last = data.get(&label("last name"));
    [first, last].into_iter().flatten().collect::<Vec<_>>().join(" ")
}

fn household_member(row: &HouseholdRow) -> HouseholdMember {
    let fields = &row.fields;
    let name = match fields.get("Name") {
        Some(name) => name.to_string(),
        None => [fields.first_of(&["First name(s)", "First name"]), fields.get("Last name")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" "),
    };
    HouseholdMember {
        name,
        relationship: fields.get("Relationship").map(str::to_string),
        age: fields.get("Age").map(str::to_string),
        gender: fields.first_of(&["Sex", "Gender"]).and_then(Gender::standardize),
        selected: row.selected,
    }
}

pub struct FmpGeneralizer;

impl FmpGeneralizer {
    fn generalize_transcript(&self, ed: &FmpRecord) -> GeneralizedData {
        let collection = or_empty(&ed.collection);
        let Some(record_type) = record_type_for_collection(collection) else {
            return unrecognized(super::ID, collection);
        };
        let data = &ed.record_data;

        let mut b = RecordBuilder::new(super::ID, SourceType::Record);
        b.record_type(record_type)
            .forenames(data.first_of(&["First name(s)", "First name"]).unwrap_or_default())
            .last_name(data.first_of(&["Last name", "Surname"]).unwrap_or_default());
        if b.view().name.is_empty() {
            b.full_name(or_empty(&ed.heading));
        }

        b.event_date(data.first_of(EVENT_DATE_LABELS).unwrap_or_default());
        if record_type == RecordType::Census && b.view().event_date.is_none() {
            if let Some(caps) = YEAR_RE.captures(collection) {
                b.event_date(&caps[1]);
            }
        }
        b.birth_date(data.first_of(&["Birth date", "Birth year"]).unwrap_or_default())
            .birth_place(data.first_of(&["Birth place", "Birth town"]).unwrap_or_default())
            .death_date(data.first_of(&["Death date", "Death year"]).unwrap_or_default())
            .death_place(data.get("Death place").unwrap_or_default());

        let place = data.first_of(EVENT_PLACE_LABELS).or(ed.place.as_deref());
        let place = match (place, data.get("County")) {
            (Some(place), Some(county)) if !place.contains(county) => format!("{}, {}", place, county),
            (place, _) => place.unwrap_or_default().to_string(),
        };
        b.event_place(&place);
        if record_type.is_registration() {
            b.registration_district(data.first_of(DISTRICT_LABELS).unwrap_or_default());
        }

        if record_type.is_death_like() {
            b.age_at_death(data.first_of(&["Age at death", "Death age", "Age"]).unwrap_or_default());
        }
        b.gender(
            data.first_of(&["Sex", "Gender"])
                .or(ed.person_gender.as_deref())
                .unwrap_or_default(),
        )
        .father_name(&relative_name(data, "Father"))
        .mother_name(&relative_name(data, "Mother"))
        .mothers_maiden_name(data.get("Mother's maiden name").unwrap_or_default())
        .spouse(&relative_name(data, "Spouse"));

        if let Some(household) = &ed.household {
            for row in household.members.iter().filter(|row| !row.closed) {
                b.household_member(household_member(row));
            }
        }

        let mut collection_data = CollectionData::new(collection);
        collection_data.volume = data.get("Volume").map(str::to_string);
        collection_data.page = data.get("Page").map(str::to_string);
        b.collection(collection_data);

        b.finish()
    }

    fn generalize_profile(&self, ed: &FmpRecord) -> GeneralizedData {
        let birth = ed.birth_date.as_ref().or(ed.birth_year.as_ref());
        let death = ed.death_date.as_ref().or(ed.death_year.as_ref());

        let mut b = RecordBuilder::new(super::ID, SourceType::Profile);
        b.full_name(or_empty(&ed.full_name))
            .forenames(or_empty(&ed.given_name))
            .last_name(or_empty(&ed.surname))
            .birth_date(birth.map_or("", String::as_str))
            .birth_place(or_empty(&ed.birth_place))
            .death_date(death.map_or("", String::as_str))
            .death_place(or_empty(&ed.death_place))
            .father_name(or_empty(&ed.father_name))
            .mother_name(or_empty(&ed.mother_name));

        for spouse in &ed.spouses {
            b.spouse_with(Spouse {
                name: spouse.name.clone(),
                marriage_date: DateObj::from_text(or_empty(&spouse.marriage_date)),
                marriage_place: PlaceObj::from_text(or_empty(&spouse.marriage_place)),
            });
        }
        b.finish()
    }
}

impl Generalizer for FmpGeneralizer {
    type Record = FmpRecord;

    fn source(&self) -> &'static str {
        super::ID
    }

    fn generalize_extracted(&self, ed: &FmpRecord) -> GeneralizedData {
        match ed.page_kind {
            Some(PageKind::Transcript) => self.generalize_transcript(ed),
            Some(kind) if kind.is_profile() => self.generalize_profile(ed),
            Some(_) => GeneralizedData::unusable(super::ID, Unusable::NoPersonData),
            None => GeneralizedData::unusable(super::ID, Unusable::ExtractionFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;
    use crate::sites::fmp::FmpExtractor;
    use crate::sites::{ExtractStatus, Extractor};

    fn from_fixture(name: &str, url: &str) -> GeneralizedData {
        let html = std::fs::read_to_string(format!("tests/fixtures/fmp/{}.html", name)).unwrap();
        let ed = FmpExtractor.extract(&Html::parse_document(&html), url);
        FmpGeneralizer.generalize(&ed)
    }

    fn transcript(collection: &str, fields: &[(&str, &str)]) -> FmpRecord {
        FmpRecord {
            status: ExtractStatus {
                success: true,
                ..Default::default()
            },
            page_kind: Some(PageKind::Transcript),
            collection: Some(collection.to_string()),
            record_data: fields.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn collection_vocabulary() {
        assert_eq!(
            record_type_for_collection("England & Wales Births 1837-2006"),
            Some(RecordType::BirthRegistration)
        );
        assert_eq!(record_type_for_collection("Devon Baptisms"), Some(RecordType::Baptism));
        assert_eq!(
            record_type_for_collection("1881 England, Wales & Scotland Census"),
            Some(RecordType::Census)
        );
        assert_eq!(record_type_for_collection("Cheshire Marriages"), Some(RecordType::Marriage));
        assert_eq!(
            record_type_for_collection("Cheshire Marriages 1538-1837"),
            Some(RecordType::Marriage)
        );
        assert_eq!(record_type_for_collection("Devon Marriage Index"), Some(RecordType::Marriage));
        assert_eq!(
            record_type_for_collection("Scotland Civil Marriages"),
            Some(RecordType::MarriageRegistration)
        );
        assert_eq!(
            record_type_for_collection("England & Wales Marriages 1837-2005"),
            Some(RecordType::MarriageRegistration)
        );
        assert_eq!(record_type_for_collection("Electoral Registers"), None);
    }

    #[test]
    fn census_household() {
        let gd = from_fixture(
            "census_transcript",
            "https://www.findmypast.co.uk/transcript?id=GBC%2F1881%2F0012345",
        );
        assert!(gd.has_valid_data);
        assert_eq!(gd.record_type, Some(RecordType::Census));
        assert_eq!(gd.full_name.as_deref(), Some("John Davis"));
        assert_eq!(gd.event_date.as_ref().and_then(|d| d.year), Some(1881));
        assert_eq!(gd.gender, Some(Gender::Male));
        assert_eq!(gd.birth_date.as_ref().and_then(|d| d.year), Some(1845));
        assert_eq!(gd.event_place.as_ref().and_then(|p| p.country.as_deref()), Some("England"));

        assert_eq!(gd.household_members.len(), 2);
        let head = &gd.household_members[0];
        assert_eq!(head.name, "John Davis");
        assert_eq!(head.relationship.as_deref(), Some("Head"));
        assert!(head.selected);
        assert_eq!(gd.household_members[1].gender, Some(Gender::Female));
    }

    #[test]
    fn baptism_transcript() {
        let gd = from_fixture(
            "baptism_record",
            "https://search.findmypast.co.uk/record?id=GBPRS%2FDEV%2FBAP%2F264915",
        );
        assert!(gd.has_valid_data);
        assert_eq!(gd.record_type, Some(RecordType::Baptism));
        assert_eq!(gd.event_date.map(|d| d.date_string), Some("12 May 1850".to_string()));
        assert_eq!(gd.event_place.map(|p| p.place_string), Some("Tavistock, Devon".to_string()));
        assert_eq!(gd.father_name.as_deref(), Some("William Davis"));
        assert_eq!(gd.mother_name.as_deref(), Some("Elizabeth"));
        assert_eq!(gd.last_name_at_birth.as_deref(), Some("Davis"));
        assert_eq!(gd.collection_data.map(|c| c.id), Some("Devon Baptisms".to_string()));
    }

    #[test]
    fn civil_registration_fields() {
        let ed = transcript(
            "England & Wales Deaths 1837-2007",
            &[
                ("First name(s)", "Ann"),
                ("Last name", "Davis"),
                ("Death year", "1880"),
                ("Registration district", "Atherstone"),
                ("Age at death", "78"),
                ("Volume", "6D"),
                ("Page", "412"),
            ],
        );
        let gd = FmpGeneralizer.generalize(&ed);
        assert_eq!(gd.record_type, Some(RecordType::DeathRegistration));
        assert_eq!(gd.registration_district.as_deref(), Some("Atherstone"));
        assert_eq!(gd.event_place.map(|p| p.place_string), Some("Atherstone".to_string()));
        assert_eq!(gd.age_at_death.as_deref(), Some("78"));
        let collection = gd.collection_data.unwrap();
        assert_eq!((collection.volume.as_deref(), collection.page.as_deref()), (Some("6D"), Some("412")));
    }

    #[test]
    fn marriage_spouse_from_fields() {
        let ed = transcript(
            "Warwickshire Marriages",
            &[
                ("First name(s)", "John"),
                ("Last name", "Davis"),
                ("Marriage date", "5 Jun 1825"),
                ("Parish", "Mancetter"),
                ("Spouse's first name(s)", "Ann"),
                ("Spouse's last name", "Wright"),
            ],
        );
        let gd = FmpGeneralizer.generalize(&ed);
        assert_eq!(gd.record_type, Some(RecordType::Marriage));
        assert_eq!(gd.spouses.len(), 1);
        assert_eq!(gd.spouses[0].name, "Ann Wright");
        assert_eq!(gd.spouses[0].marriage_place.as_ref().map(|p| p.place_string.as_str()), Some("Mancetter"));
    }

    #[test]
    fn unknown_collection_is_unrecognized() {
        let ed = transcript("Electoral Registers", &[("First name(s)", "John"), ("Last name", "Davis")]);
        let gd = FmpGeneralizer.generalize(&ed);
        assert!(!gd.has_valid_data);
        assert_eq!(
            gd.unusable,
            Some(Unusable::UnrecognizedRecordType("Electoral Registers".to_string()))
        );
    }

    #[test]
    fn legacy_profile() {
        let gd = from_fixture(
            "legacy_profile",
            "https://tree.findmypast.co.uk/#/trees/918c5b61-df62-4dec-b840-31cad3d86bf9/1181965009/profile",
        );
        assert!(gd.has_valid_data);
        assert_eq!(gd.source_type, Some(SourceType::Profile));
        assert_eq!(gd.record_type, None);
        assert_eq!(gd.full_name.as_deref(), Some("John Davis"));
        assert_eq!(gd.birth_date.as_ref().map(|d| d.date_string.as_str()), Some("3 Feb 1800"));
        assert_eq!(gd.death_date.as_ref().and_then(|d| d.year), Some(1871));
        assert_eq!(gd.last_name_at_birth.as_deref(), Some("Davis"));
        assert_eq!(gd.last_name_at_death.as_deref(), Some("Davis"));
        assert_eq!(gd.spouses[0].marriage_date.as_ref().and_then(|d| d.year), Some(1825));
    }

    #[test]
    fn image_pages_hold_no_person() {
        let url = "https://www.findmypast.co.uk/image-share/1eb2fb56-2ecd-4144-b0b6-08888276e66d";
        let gd = from_fixture("image_share", url);
        assert_eq!(gd.unusable, Some(Unusable::NoPersonData));

        let ed = FmpRecord {
            status: ExtractStatus {
                success: true,
                ..Default::default()
            },
            page_kind: Some(PageKind::Image),
            ..Default::default()
        };
        assert_eq!(FmpGeneralizer.generalize(&ed).unusable, Some(Unusable::NoPersonData));
    }
}
