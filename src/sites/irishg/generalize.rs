use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CollectionData, GeneralizedData, RecordBuilder, Unusable};
use crate::normalize::date::date_from_event_text;
use crate::normalize::place::strip_place_prefix;
use crate::normalize::{clean_date, clean_text, to_initial_caps_each_word};
use crate::record_type::{RecordType, Registry, SourceType};
use crate::sites::{unrecognized, Generalizer, LabelledFields};

use super::extract::IrishgRecord;

static MC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Mc (\w)").unwrap());
static APOSTROPHE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'(\w)").unwrap());
static AREA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Area - ([^,]+),").unwrap());
static PARISH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Parish/Church/Congregation - ([^,]+)").unwrap());

const DISTRICT_LABEL: &str = "SR District/Reg Area";
const NOT_RECORDED: &str = "see register entry";
const INFERRED_BIRTH_SUFFIX: &str = "(BASED ON OTHER DATE INFORMATION)";

/// Both sub-sites register births and deaths civilly; only marriages differ.
fn irishg_record_type(event_text: &str, registry: Registry) -> Option<RecordType> {
    let rt = match RecordType::from_phrase(event_text, registry)? {
        RecordType::Birth => RecordType::BirthRegistration,
        RecordType::Death => RecordType::DeathRegistration,
        other => other,
    };
    Some(rt)
}

/// "MARY MC DONNELL O'CONNOR" → "Mary McDonnell O'Connor"
fn clean_full_name(name: &str) -> String {
    let name = to_initial_caps_each_word(&clean_text(name));
    let name = MC_RE.replace(&name, "Mc$1");
    APOSTROPHE_RE
        .replace_all(&name, |caps: &regex::Captures| format!("'{}", caps[1].to_uppercase()))
        .into_owned()
}

/// District for civil records, otherwise "Parish, Area" from the location heading.
fn build_event_place(ed: &IrishgRecord) -> String {
    if let Some(district) = ed.record_data.get(DISTRICT_LABEL) {
        return district.to_string();
    }
    let Some(heading) = ed.heading_text.as_deref() else {
        return String::new();
    };

    let area = AREA_RE.captures(heading).map(|c| {
        let area = c[1].trim();
        match area.find('(') {
            Some(paren) => format!("{} {}", to_initial_caps_each_word(&area[..paren]), &area[paren..]),
            None => to_initial_caps_each_word(area),
        }
    });
    let parish = PARISH_RE
        .captures(heading)
        .map(|c| to_initial_caps_each_word(c[1].trim()));

    let parts: Vec<String> = [parish, area]
        .into_iter()
        .flatten()
        .map(|p| clean_text(&p))
        .filter(|p| !p.is_empty())
        .collect();
    parts.join(", ")
}

/// Value of `key` inside the percent-encoded search URL carried in the page URL.
fn search_param<'a>(encoded_query: &'a str, key: &str) -> Option<&'a str> {
    let start = encoded_query.find(key)? + key.len();
    let len = encoded_query[start..].find("%26")?;
    Some(&encoded_query[start..start + len]).filter(|v| !v.is_empty())
}

/// Whether the second party is the person the user searched for.
fn is_name2_primary(url: &str, name2: &str) -> bool {
    let Some(index) = url.find("search.jsp%3F") else {
        return false;
    };
    let query = &url[index..];
    let name2 = name2.to_lowercase();

    let first_matches = search_param(query, "namefm%3D")
        .is_some_and(|first| name2.starts_with(&first.to_lowercase()));
    let last_matches = search_param(query, "namel%3D")
        .is_some_and(|last| name2.ends_with(&last.to_lowercase()));
    first_matches || last_matches
}

fn usable(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != NOT_RECORDED && *v != "N/R")
}

pub struct IrishgGeneralizer;

impl IrishgGeneralizer {
    fn marriage_parties(&self, b: &mut RecordBuilder, ed: &IrishgRecord, name1: &str, name2: &str) {
        let (mut name1, mut name2) = (clean_full_name(name1), clean_full_name(name2));
        if is_name2_primary(&ed.status.url, &name2) {
            std::mem::swap(&mut name1, &mut name2);
        }
        b.full_name(&name1).spouse(&name2);
    }
}

impl Generalizer for IrishgGeneralizer {
    type Record = IrishgRecord;

    fn source(&self) -> &'static str {
        super::ID
    }

    fn generalize_extracted(&self, ed: &IrishgRecord) -> GeneralizedData {
        let Some(event_text) = ed.event_text.as_deref() else {
            return GeneralizedData::unusable(super::ID, Unusable::NoPersonData);
        };
        let registry = match ed.record_site.as_deref() {
            Some("churchrecords") => Registry::Church,
            Some(_) => Registry::Civil,
            None => return GeneralizedData::unusable(super::ID, Unusable::ExtractionFailed),
        };

        let Some(record_type) = irishg_record_type(event_text, registry) else {
            return unrecognized(super::ID, crate::normalize::first_word(event_text));
        };

        let data: &LabelledFields = &ed.record_data;
        let mut b = RecordBuilder::new(super::ID, SourceType::Record);
        b.record_type(record_type);

        let event_date_in_text = date_from_event_text(event_text);
        let place = build_event_place(ed);
        if !place.is_empty() {
            b.event_place(&place);
        } else if let Some(found) = &event_date_in_text {
            b.event_place(&strip_place_prefix(&found.rest));
        }
        if record_type.is_registration() {
            b.registration_district(data.get(DISTRICT_LABEL).unwrap_or_default());
        }
        b.country("Ireland");

        let date_in_text = event_date_in_text.as_ref().map(|d| d.date.as_str()).unwrap_or_default();
        let name = data.get("Name").unwrap_or_default();

        let collection_id = match record_type {
            RecordType::BirthRegistration => {
                let birth = data.get("Date of Birth").unwrap_or_default();
                b.event_date(birth)
                    .birth_date(birth)
                    .full_name(&clean_full_name(name))
                    .gender(usable(data.get("Sex")).unwrap_or_default());
                if let Some(mmn) = usable(data.get("Mother's Birth Surname")) {
                    b.mothers_maiden_name(&clean_full_name(mmn));
                }
                "births"
            }
            RecordType::MarriageRegistration => {
                b.event_date(data.get("Date of Event").unwrap_or_default());
                self.marriage_parties(
                    &mut b,
                    ed,
                    data.get("Party 1 Name").unwrap_or_default(),
                    data.get("Party 2 Name").unwrap_or_default(),
                );
                "civil-marriages"
            }
            RecordType::DeathRegistration => {
                let death = data.get("Date of Death").unwrap_or_default();
                b.event_date(death)
                    .death_date(death)
                    .full_name(&clean_full_name(name))
                    .age_at_death(data.get("Deceased Age at Death").unwrap_or_default());
                "deaths"
            }
            RecordType::Baptism => {
                b.full_name(&clean_full_name(name)).event_date(date_in_text);
                let raw_birth = data.get("Date of Birth").unwrap_or_default();
                let birth = clean_date(raw_birth);
                if !birth.is_empty() && birth != date_in_text && !raw_birth.ends_with(INFERRED_BIRTH_SUFFIX) {
                    b.birth_date(&birth);
                }
                "baptisms"
            }
            RecordType::Marriage => {
                b.event_date(date_in_text);
                let spouse_name = ed.spouse_record_data.get("Name").unwrap_or_default();
                self.marriage_parties(&mut b, ed, name, spouse_name);
                "marriages"
            }
            RecordType::Burial => {
                b.full_name(&clean_full_name(name))
                    .death_date(&clean_date(data.get("Date of Death").unwrap_or_default()))
                    .event_date(date_in_text)
                    .age_at_death(usable(data.get("Age")).unwrap_or_default());
                "burials"
            }
            other => return unrecognized(super::ID, &other.to_string()),
        };

        let mut collection = CollectionData::new(collection_id);
        collection.registration_id = data.get("Group Registration ID").map(str::to_string);
        b.collection(collection);

        b.finish()
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;
    use crate::sites::irishg::IrishgExtractor;
    use crate::sites::{ExtractStatus, Extractor};

    const CHURCH_URL: &str = "https://churchrecords.irishgenealogy.ie/churchrecords/details/a1b2c3d4e5f6";
    const CIVIL_URL: &str = "https://civilrecords.irishgenealogy.ie/churchrecords/details-civil/0c8e9f";

    fn extracted(url: &str, site: &str, event_text: &str) -> IrishgRecord {
        IrishgRecord {
            status: ExtractStatus {
                url: url.to_string(),
                success: true,
                data_may_be_incomplete: false,
            },
            record_site: Some(site.to_string()),
            event_text: Some(event_text.to_string()),
            ..Default::default()
        }
    }

    fn from_fixture(name: &str, url: &str) -> GeneralizedData {
        let html = std::fs::read_to_string(format!("tests/fixtures/irishg/{}.html", name)).unwrap();
        let ed = IrishgExtractor.extract(&Html::parse_document(&html), url);
        IrishgGeneralizer.generalize(&ed)
    }

    #[test]
    fn name_cleanup() {
        assert_eq!(clean_full_name("MARY MC DONNELL"), "Mary McDonnell");
        assert_eq!(clean_full_name("PATRICK O'CONNOR"), "Patrick O'Connor");
        assert_eq!(clean_full_name(""), "");
    }

    #[test]
    fn baptism_date_and_place_from_event_text() {
        let mut ed = extracted(CHURCH_URL, "churchrecords", "Baptism on 12 May 1850 in St. Mary's");
        ed.record_data.insert("Name", "JOHN KELLY");
        let gd = IrishgGeneralizer.generalize(&ed);

        assert!(gd.has_valid_data);
        assert_eq!(gd.record_type, Some(RecordType::Baptism));
        assert_eq!(gd.event_date.as_ref().map(|d| d.date_string.as_str()), Some("12 May 1850"));
        let place = gd.event_place.unwrap();
        assert_eq!(place.place_string, "St. Mary's");
        assert_eq!(place.country.as_deref(), Some("Ireland"));
        assert_eq!(gd.full_name.as_deref(), Some("John Kelly"));
        assert_eq!(gd.last_name_at_birth.as_deref(), Some("Kelly"));
        assert_eq!(gd.collection_data.map(|c| c.id), Some("baptisms".to_string()));
    }

    #[test]
    fn baptism_birth_date_rules() {
        let mut ed = extracted(CHURCH_URL, "churchrecords", "Baptism of JOHN KELLY on 12 May 1850");
        ed.record_data.insert("Name", "JOHN KELLY");
        ed.record_data.insert("Date of Birth", "12 May 1850");
        assert_eq!(IrishgGeneralizer.generalize(&ed).birth_date, None);

        ed.record_data.insert("Date of Birth", "2 May 1850 (BASED ON OTHER DATE INFORMATION)");
        assert_eq!(IrishgGeneralizer.generalize(&ed).birth_date, None);

        ed.record_data.insert("Date of Birth", "2 May 1850");
        let gd = IrishgGeneralizer.generalize(&ed);
        assert_eq!(gd.birth_date.map(|d| d.date_string), Some("2 May 1850".to_string()));
    }

    #[test]
    fn church_marriage_fixture() {
        let gd = from_fixture("church_marriage", CHURCH_URL);
        assert!(gd.has_valid_data);
        assert_eq!(gd.record_type, Some(RecordType::Marriage));
        assert_eq!(gd.full_name.as_deref(), Some("John Kelly"));
        assert_eq!(
            gd.event_place.as_ref().map(|p| p.place_string.as_str()),
            Some("St. Mary's, Dublin (RC)")
        );
        assert_eq!(gd.spouses.len(), 1);
        assert_eq!(gd.spouses[0].name, "Ann Byrne");
        assert_eq!(
            gd.spouses[0].marriage_date.as_ref().map(|d| d.date_string.as_str()),
            Some("4 June 1849")
        );
        assert_eq!(gd.collection_data.map(|c| c.id), Some("marriages".to_string()));
    }

    #[test]
    fn searched_spouse_becomes_primary() {
        let url = format!(
            "{}?b=https%3A%2F%2Fchurchrecords.irishgenealogy.ie%2Fchurchrecords%2Fsearch.jsp%3Fnamefm%3DAnn%26namel%3DByrne%26location%3D",
            CHURCH_URL
        );
        let gd = from_fixture("church_marriage", &url);
        assert_eq!(gd.full_name.as_deref(), Some("Ann Byrne"));
        assert_eq!(gd.spouses[0].name, "John Kelly");
    }

    #[test]
    fn civil_birth_fixture() {
        let gd = from_fixture("civil_birth", CIVIL_URL);
        assert!(gd.has_valid_data);
        assert_eq!(gd.record_type, Some(RecordType::BirthRegistration));
        assert_eq!(gd.full_name.as_deref(), Some("Mary O'Connor"));
        assert_eq!(gd.birth_date.as_ref().and_then(|d| d.year), Some(1864));
        assert_eq!(gd.gender, Some(crate::model::Gender::Female));
        assert_eq!(gd.mothers_maiden_name.as_deref(), Some("Mcdonnell"));
        assert_eq!(gd.registration_district.as_deref(), Some("Rathdown"));
        assert_eq!(gd.event_place.as_ref().map(|p| p.place_string.as_str()), Some("Rathdown"));
        let collection = gd.collection_data.unwrap();
        assert_eq!(collection.id, "births");
        assert_eq!(collection.registration_id.as_deref(), Some("1684023"));
    }

    #[test]
    fn civil_death_and_burial() {
        let mut ed = extracted(CIVIL_URL, "civilrecords", "Death of PATRICK WALSH in 1880");
        ed.record_data.insert("Name", "PATRICK WALSH");
        ed.record_data.insert("Date of Death", "3 January 1880");
        ed.record_data.insert("Deceased Age at Death", "71");
        let gd = IrishgGeneralizer.generalize(&ed);
        assert_eq!(gd.record_type, Some(RecordType::DeathRegistration));
        assert_eq!(gd.age_at_death.as_deref(), Some("71"));
        assert_eq!(gd.last_name_at_death.as_deref(), Some("Walsh"));

        let mut ed = extracted(CHURCH_URL, "churchrecords", "Burial of MARY KELLY on N/R June 1861");
        ed.record_data.insert("Name", "MARY KELLY");
        ed.record_data.insert("Age", "N/R");
        let gd = IrishgGeneralizer.generalize(&ed);
        assert_eq!(gd.record_type, Some(RecordType::Burial));
        assert_eq!(gd.event_date.map(|d| d.date_string), Some("June 1861".to_string()));
        assert_eq!(gd.age_at_death, None);
    }

    #[test]
    fn church_site_death_is_a_registration() {
        let mut ed = extracted(CHURCH_URL, "churchrecords", "Death of PATRICK WALSH on 3 January 1880");
        ed.record_data.insert("Name", "PATRICK WALSH");
        ed.record_data.insert("Date of Death", "3 January 1880");
        let gd = IrishgGeneralizer.generalize(&ed);
        assert!(gd.has_valid_data);
        assert_eq!(gd.record_type, Some(RecordType::DeathRegistration));
        assert_eq!(gd.death_date.map(|d| d.date_string), Some("3 January 1880".to_string()));
        assert_eq!(gd.collection_data.map(|c| c.id), Some("deaths".to_string()));

        assert_eq!(
            irishg_record_type("Birth of MARY KELLY", Registry::Church),
            Some(RecordType::BirthRegistration)
        );
        assert_eq!(irishg_record_type("Marriage of JOHN KELLY", Registry::Church), Some(RecordType::Marriage));
        assert_eq!(
            irishg_record_type("Marriage of JOHN KELLY", Registry::Civil),
            Some(RecordType::MarriageRegistration)
        );
    }

    #[test]
    fn unknown_event_word_is_unrecognized() {
        let ed = extracted(CHURCH_URL, "churchrecords", "Confirmation of JOHN KELLY in 1862");
        let gd = IrishgGeneralizer.generalize(&ed);
        assert!(!gd.has_valid_data);
        assert_eq!(gd.record_type, None);
        assert_eq!(gd.unusable, Some(Unusable::UnrecognizedRecordType("Confirmation".to_string())));
    }
}
