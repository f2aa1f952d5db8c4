use crate::model::{GeneralizedData, RecordBuilder};
use crate::record_type::{RecordType, SourceType};
use crate::sites::{or_empty, Generalizer};

use super::extract::BgRecord;

pub struct BgGeneralizer;

impl Generalizer for BgGeneralizer {
    type Record = BgRecord;

    fn source(&self) -> &'static str {
        super::ID
    }

    fn generalize_extracted(&self, ed: &BgRecord) -> GeneralizedData {
        let mut b = RecordBuilder::new(super::ID, SourceType::Record);
        b.record_type(RecordType::Memorial)
            .event_date(or_empty(&ed.death_date))
            .event_place(or_empty(&ed.cemetery_full_address))
            .street_address(or_empty(&ed.cemetery_name))
            .full_name(or_empty(&ed.full_name))
            .last_name(or_empty(&ed.last_name))
            .forenames(or_empty(&ed.given_name))
            .age_at_death(or_empty(&ed.age_at_death))
            .birth_date(or_empty(&ed.birth_date))
            .death_date(or_empty(&ed.death_date));
        b.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::ExtractStatus;

    fn extracted() -> BgRecord {
        BgRecord {
            status: ExtractStatus {
                url: "https://billiongraves.com/grave/John-Smith/1".to_string(),
                success: true,
                data_may_be_incomplete: false,
            },
            ..Default::default()
        }
    }

    #[test]
    fn memorial_with_cemetery_name_only() {
        let ed = BgRecord {
            full_name: Some("John Smith (Jones)".to_string()),
            death_date: Some("1 Jan 1900".to_string()),
            cemetery_name: Some("Oak Hill".to_string()),
            age_at_death: Some("80".to_string()),
            ..extracted()
        };
        let gd = BgGeneralizer.generalize(&ed);
        assert!(gd.has_valid_data);
        assert_eq!(gd.record_type, Some(RecordType::Memorial));
        assert_eq!(gd.full_name.as_deref(), Some("John Smith"));
        assert_eq!(gd.last_name_at_birth.as_deref(), Some("Jones"));
        assert_eq!(gd.last_name_at_death.as_deref(), Some("Smith"));
        assert_eq!(
            gd.event_place.as_ref().and_then(|p| p.street_address.as_deref()),
            Some("Oak Hill")
        );
        assert_eq!(gd.age_at_death.as_deref(), Some("80"));
        assert_eq!(gd.event_date.as_ref().map(|d| d.date_string.as_str()), Some("1 Jan 1900"));
    }

    #[test]
    fn separate_name_fields_win_over_split() {
        let ed = BgRecord {
            full_name: Some("Mary Ann Lee".to_string()),
            given_name: Some("Mary Ann".to_string()),
            last_name: Some("Lee".to_string()),
            cemetery_full_address: Some("Leeds, Yorkshire, England".to_string()),
            ..extracted()
        };
        let gd = BgGeneralizer.generalize(&ed);
        assert_eq!(gd.name.forenames.as_deref(), Some("Mary Ann"));
        assert_eq!(gd.event_place.as_ref().and_then(|p| p.country.as_deref()), Some("England"));
        assert_eq!(gd.last_name_at_birth, None);
    }

    #[test]
    fn failed_extraction() {
        let ed = BgRecord {
            full_name: Some("Should Not Appear".to_string()),
            ..Default::default()
        };
        let gd = BgGeneralizer.generalize(&ed);
        assert!(!gd.has_valid_data);
        assert_eq!(gd.full_name, None);
        assert_eq!(gd.source_of_data, "bg");
    }

    #[test]
    fn generalize_is_deterministic() {
        let ed = BgRecord {
            full_name: Some("John Smith".to_string()),
            death_date: Some("1900".to_string()),
            ..extracted()
        };
        assert_eq!(BgGeneralizer.generalize(&ed), BgGeneralizer.generalize(&ed.clone()));
    }
}
