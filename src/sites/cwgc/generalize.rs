use crate::model::{GeneralizedData, RecordBuilder};
use crate::record_type::{RecordType, SourceType};
use crate::sites::{or_empty, Generalizer};

use super::extract::CwgcRecord;

pub struct CwgcGeneralizer;

impl Generalizer for CwgcGeneralizer {
    type Record = CwgcRecord;

    fn source(&self) -> &'static str {
        super::ID
    }

    fn generalize_extracted(&self, ed: &CwgcRecord) -> GeneralizedData {
        let mut b = RecordBuilder::new(super::ID, SourceType::Record);
        b.record_type(RecordType::Memorial)
            .event_date(or_empty(&ed.death_date))
            .event_place(or_empty(&ed.cemetery_address))
            .street_address(or_empty(&ed.cemetery_name))
            .full_name(or_empty(&ed.full_name))
            .age_at_death(or_empty(&ed.age_at_death))
            .death_date(or_empty(&ed.death_date));
        b.finish()
    }
}
