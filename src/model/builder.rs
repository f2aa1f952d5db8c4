use crate::normalize::{clean_text, non_empty, split_bracketed_surname, split_on_last_space};
use crate::record_type::{Anchor, RecordType, SourceType};

use super::{
    CollectionData, DateObj, Gender, GeneralizedData, HouseholdMember, PlaceObj, Spouse, Unusable,
};

/// Assembles a [`GeneralizedData`] and finalizes it once.
///
/// Setters ignore blank input, so generalizers can pass raw fields straight
/// through. Derived surnames and `has_valid_data` are only ever set by
/// [`RecordBuilder::finish`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    data: GeneralizedData,
    maiden_name: Option<String>,
}

impl RecordBuilder {
    pub fn new(source: &str, source_type: SourceType) -> Self {
        RecordBuilder {
            data: GeneralizedData {
                source_of_data: source.to_string(),
                source_type: Some(source_type),
                ..Default::default()
            },
            maiden_name: None,
        }
    }

    /// Read-only view of what has been set so far.
    pub fn view(&self) -> &GeneralizedData {
        &self.data
    }

    pub fn record_type(&mut self, record_type: RecordType) -> &mut Self {
        self.data.record_type = Some(record_type);
        self
    }

    /// "Given Surname (Maiden)" sets the full name to "Given Surname" and records
    /// "Maiden" as the surname at birth.
    pub fn full_name(&mut self, name: &str) -> &mut Self {
        let (name, bracketed) = split_bracketed_surname(name);
        if !name.is_empty() {
            self.data.full_name = Some(name);
        }
        if let Some(maiden) = bracketed {
            self.maiden_name = Some(maiden);
        }
        self
    }

    pub fn forenames(&mut self, forenames: &str) -> &mut Self {
        if let Some(v) = non_empty(forenames) {
            self.data.name.forenames = Some(v);
        }
        self
    }

    pub fn last_name(&mut self, last_name: &str) -> &mut Self {
        if let Some(v) = non_empty(last_name) {
            self.data.name.last_name = Some(v);
        }
        self
    }

    /// An explicitly recorded birth surname.
    pub fn maiden_name(&mut self, maiden_name: &str) -> &mut Self {
        if let Some(v) = non_empty(maiden_name) {
            self.maiden_name = Some(v);
        }
        self
    }

    pub fn event_date(&mut self, text: &str) -> &mut Self {
        if let Some(d) = DateObj::from_text(text) {
            self.data.event_date = Some(d);
        }
        self
    }

    pub fn birth_date(&mut self, text: &str) -> &mut Self {
        if let Some(d) = DateObj::from_text(text) {
            self.data.birth_date = Some(d);
        }
        self
    }

    pub fn death_date(&mut self, text: &str) -> &mut Self {
        if let Some(d) = DateObj::from_text(text) {
            self.data.death_date = Some(d);
        }
        self
    }

    pub fn event_place(&mut self, text: &str) -> &mut Self {
        if let Some(p) = PlaceObj::from_text(text) {
            let street_address = self.data.event_place.take().and_then(|old| old.street_address);
            self.data.event_place = Some(PlaceObj { street_address, ..p });
        }
        self
    }

    pub fn birth_place(&mut self, text: &str) -> &mut Self {
        if let Some(p) = PlaceObj::from_text(text) {
            self.data.birth_place = Some(p);
        }
        self
    }

    pub fn death_place(&mut self, text: &str) -> &mut Self {
        if let Some(p) = PlaceObj::from_text(text) {
            self.data.death_place = Some(p);
        }
        self
    }

    /// Street address of the event place, creating the place when there is none yet.
    pub fn street_address(&mut self, text: &str) -> &mut Self {
        if let Some(v) = non_empty(text) {
            self.data.event_place.get_or_insert_with(PlaceObj::default).street_address = Some(v);
        }
        self
    }

    /// Country of the event place, creating the place when there is none yet.
    pub fn country(&mut self, country: &str) -> &mut Self {
        if let Some(v) = non_empty(country) {
            self.data.event_place.get_or_insert_with(PlaceObj::default).country = Some(v);
        }
        self
    }

    pub fn registration_district(&mut self, text: &str) -> &mut Self {
        self.data.registration_district = non_empty(text).or(self.data.registration_district.take());
        self
    }

    pub fn age_at_death(&mut self, text: &str) -> &mut Self {
        self.data.age_at_death = non_empty(text).or(self.data.age_at_death.take());
        self
    }

    pub fn gender(&mut self, text: &str) -> &mut Self {
        if let Some(g) = Gender::standardize(text) {
            self.data.gender = Some(g);
        }
        self
    }

    pub fn father_name(&mut self, text: &str) -> &mut Self {
        self.data.father_name = non_empty(text).or(self.data.father_name.take());
        self
    }

    pub fn mother_name(&mut self, text: &str) -> &mut Self {
        self.data.mother_name = non_empty(text).or(self.data.mother_name.take());
        self
    }

    pub fn mothers_maiden_name(&mut self, text: &str) -> &mut Self {
        self.data.mothers_maiden_name = non_empty(text).or(self.data.mothers_maiden_name.take());
        self
    }

    /// Spouse with the record's own event date and place when none are given.
    pub fn spouse(&mut self, name: &str) -> &mut Self {
        let Some(name) = non_empty(name) else {
            return self;
        };
        self.data.spouses.push(Spouse {
            name,
            marriage_date: self.data.event_date.clone(),
            marriage_place: self.data.event_place.clone().filter(|p| !p.is_empty()),
        });
        self
    }

    pub fn spouse_with(&mut self, spouse: Spouse) -> &mut Self {
        if !clean_text(&spouse.name).is_empty() && !self.data.spouses.contains(&spouse) {
            self.data.spouses.push(spouse);
        }
        self
    }

    pub fn household_member(&mut self, member: HouseholdMember) -> &mut Self {
        if !member.name.is_empty() {
            self.data.household_members.push(member);
        }
        self
    }

    pub fn collection(&mut self, collection: CollectionData) -> &mut Self {
        if !collection.id.is_empty() {
            self.data.collection_data = Some(collection);
        }
        self
    }

    /// Fill in name parts, derive surnames through the inference engine and
    /// check the record type's required fields. Returns the sentinel when the
    /// record is not usable.
    pub fn finish(self) -> GeneralizedData {
        let RecordBuilder { mut data, maiden_name } = self;

        if data.name.is_empty() {
            let split = data
                .full_name
                .as_deref()
                .and_then(split_on_last_space)
                .map(|(forenames, last)| (forenames.to_string(), last.to_string()));
            if let Some((forenames, last)) = split {
                data.name.forenames = Some(forenames);
                data.name.last_name = Some(last);
            }
        } else if data.full_name.is_none() {
            let parts: Vec<&str> = [data.name.forenames.as_deref(), data.name.last_name.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            data.full_name = Some(parts.join(" "));
        }

        if let Some(reason) = missing_requirement(&data) {
            return GeneralizedData::unusable(&data.source_of_data, reason);
        }

        let is_profile = data.source_type == Some(SourceType::Profile);
        let explicit = maiden_name.is_some();
        let wants_birth = explicit || is_profile || data.record_type.is_some_and(RecordType::is_birth_like);
        let wants_death = explicit || is_profile || data.record_type.is_some_and(RecordType::is_death_like);

        data.last_name_at_birth = maiden_name;
        let at_birth = non_empty(&data.infer_last_name_at_birth());
        let at_death = non_empty(&data.infer_last_name_at_death());
        data.last_name_at_birth = at_birth.filter(|_| wants_birth);
        data.last_name_at_death = at_death.filter(|_| wants_death);

        data.has_valid_data = true;
        data
    }
}

fn missing_requirement(data: &GeneralizedData) -> Option<Unusable> {
    if data.full_name.is_none() && data.name.last_name.is_none() {
        return Some(Unusable::NoPersonData);
    }
    let record_type = data.record_type?;
    let has_event = data.event_date.is_some();
    let satisfied = match record_type.anchor() {
        Anchor::Birth => has_event || data.birth_date.is_some(),
        Anchor::Death => has_event || data.death_date.is_some(),
        Anchor::Event => has_event,
        Anchor::Loose => has_event || data.death_date.is_some() || data.event_place.is_some(),
    };
    (!satisfied).then_some(Unusable::MissingRequiredFields(record_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memorial() -> RecordBuilder {
        let mut b = RecordBuilder::new("bg", SourceType::Record);
        b.record_type(RecordType::Memorial);
        b
    }

    #[test]
    fn bracketed_maiden_name() {
        let mut b = memorial();
        b.full_name("Mary Smith (Jones)").death_date("1 Jan 1900");
        let gd = b.finish();
        assert!(gd.has_valid_data);
        assert_eq!(gd.full_name.as_deref(), Some("Mary Smith"));
        assert_eq!(gd.name.forenames.as_deref(), Some("Mary"));
        assert_eq!(gd.name.last_name.as_deref(), Some("Smith"));
        assert_eq!(gd.last_name_at_birth.as_deref(), Some("Jones"));
        assert_eq!(gd.last_name_at_death.as_deref(), Some("Smith"));
    }

    #[test]
    fn death_like_records_get_death_surname_only() {
        let mut b = memorial();
        b.full_name("John Smith").event_place("Springfield");
        let gd = b.finish();
        assert_eq!(gd.last_name_at_death.as_deref(), Some("Smith"));
        assert_eq!(gd.last_name_at_birth, None);
    }

    #[test]
    fn street_address_creates_place() {
        let mut b = memorial();
        b.full_name("John Smith").street_address("Oak Hill");
        let gd = b.finish();
        let place = gd.event_place.unwrap();
        assert_eq!(place.street_address.as_deref(), Some("Oak Hill"));
        assert!(place.place_string.is_empty());
    }

    #[test]
    fn event_place_keeps_street_address() {
        let mut b = memorial();
        b.full_name("John Smith").street_address("Oak Hill").event_place("Springfield, USA");
        let place = b.view().event_place.clone().unwrap();
        assert_eq!(place.street_address.as_deref(), Some("Oak Hill"));
        assert_eq!(place.country.as_deref(), Some("USA"));
    }

    #[test]
    fn missing_anchor_date_is_unusable() {
        let mut b = RecordBuilder::new("irishg", SourceType::Record);
        b.record_type(RecordType::Baptism).full_name("John Kelly");
        let gd = b.finish();
        assert!(!gd.has_valid_data);
        assert_eq!(gd.unusable, Some(Unusable::MissingRequiredFields(RecordType::Baptism)));
        assert_eq!(gd.full_name, None);
    }

    #[test]
    fn vital_date_satisfies_birth_like_types() {
        let mut b = RecordBuilder::new("noda", SourceType::Record);
        b.record_type(RecordType::Baptism).full_name("Ole Hansen").birth_date("3 Mar 1801");
        let gd = b.finish();
        assert!(gd.has_valid_data);
        assert_eq!(gd.last_name_at_birth.as_deref(), Some("Hansen"));
    }

    #[test]
    fn no_name_means_no_person_data() {
        let mut b = RecordBuilder::new("fmp", SourceType::Record);
        b.event_date("1850");
        assert_eq!(b.finish().unusable, Some(Unusable::NoPersonData));
    }

    #[test]
    fn name_parts_build_full_name() {
        let mut b = RecordBuilder::new("fmp", SourceType::Profile);
        b.forenames("Ann").last_name("Wright");
        let gd = b.finish();
        assert_eq!(gd.full_name.as_deref(), Some("Ann Wright"));
        assert_eq!(gd.last_name_at_birth.as_deref(), Some("Wright"));
        assert_eq!(gd.last_name_at_death.as_deref(), Some("Wright"));
    }

    #[test]
    fn spouse_inherits_event_date_and_place() {
        let mut b = RecordBuilder::new("irishg", SourceType::Record);
        b.record_type(RecordType::Marriage)
            .full_name("John Kelly")
            .event_date("4 Jun 1849")
            .event_place("Dublin")
            .spouse("Ann Byrne");
        let gd = b.finish();
        assert_eq!(gd.spouses.len(), 1);
        assert_eq!(gd.spouses[0].marriage_date.as_ref().map(|d| d.date_string.as_str()), Some("4 Jun 1849"));
        assert_eq!(gd.spouses[0].marriage_place.as_ref().map(|p| p.place_string.as_str()), Some("Dublin"));
    }

    #[test]
    fn blank_setters_are_ignored() {
        let mut b = RecordBuilder::new("cwgc", SourceType::Record);
        b.full_name("  ").age_at_death(" ").gender("unknown").event_date("");
        let view = b.view();
        assert_eq!(view.full_name, None);
        assert_eq!(view.age_at_death, None);
        assert_eq!(view.gender, None);
        assert_eq!(view.event_date, None);
    }
}
