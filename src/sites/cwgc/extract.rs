use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom;
use crate::page_url::{RouteTable, UrlParts};
use crate::sites::{ExtractStatus, Extractor, LabelledFields, RawRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Casualty,
}

static ROUTES: LazyLock<RouteTable<Page>> = LazyLock::new(|| {
    RouteTable::new(&[(
        Page::Casualty,
        r"^find-records/find-war-dead/casualty-details/(?P<id>\d+)",
    )])
});

static DETAILS_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.casualty-details").unwrap());
static NAME_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static FACTS_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dl").unwrap());
static CEMETERY_NAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".cemetery a.cemetery-name").unwrap());
static CEMETERY_ADDRESS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".cemetery .cemetery-address").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CwgcRecord {
    #[serde(flatten)]
    pub status: ExtractStatus,
    pub casualty_id: Option<String>,
    pub full_name: Option<String>,
    pub rank: Option<String>,
    pub service_number: Option<String>,
    pub regiment: Option<String>,
    pub death_date: Option<String>,
    pub age_at_death: Option<String>,
    pub cemetery_name: Option<String>,
    pub cemetery_address: Option<String>,
}

impl RawRecord for CwgcRecord {
    fn status(&self) -> &ExtractStatus {
        &self.status
    }
}

pub struct CwgcExtractor;

impl Extractor for CwgcExtractor {
    type Record = CwgcRecord;

    fn extract(&self, document: &Html, url: &str) -> CwgcRecord {
        let mut record = CwgcRecord {
            status: ExtractStatus::new(url),
            ..Default::default()
        };

        let Some(route) = UrlParts::parse(url).and_then(|parts| ROUTES.classify(&parts.path)) else {
            debug!(url, "not a casualty page");
            return record;
        };
        record.casualty_id = route.get("id").map(str::to_string);

        let details = dom::select_in_document(document, &DETAILS_SEL);
        let Some(name) = details.and_then(|d| dom::select_first(d, &NAME_SEL)) else {
            record.status.data_may_be_incomplete = true;
            return record;
        };
        record.full_name = Some(dom::text(name)).filter(|n| !n.is_empty());

        if let Some(dl) = details.and_then(|d| dom::select_first(d, &FACTS_SEL)) {
            let facts = LabelledFields::from_definition_list(dl);
            record.rank = facts.get("Rank").map(str::to_string);
            record.service_number = facts.get("Service Number").map(str::to_string);
            record.regiment = facts.first_of(&["Regiment & Unit", "Regiment"]).map(str::to_string);
            record.death_date = facts.get("Date of Death").map(str::to_string);
            record.age_at_death = facts.get("Age").map(str::to_string);
        }

        record.cemetery_name = dom::select_in_document(document, &CEMETERY_NAME_SEL)
            .map(dom::text)
            .filter(|t| !t.is_empty());
        record.cemetery_address = dom::select_in_document(document, &CEMETERY_ADDRESS_SEL)
            .map(dom::text)
            .filter(|t| !t.is_empty());

        record.status.success = true;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casualty_page() {
        let html = std::fs::read_to_string("tests/fixtures/cwgc/casualty.html").unwrap();
        let url = "https://www.cwgc.org/find-records/find-war-dead/casualty-details/575231/john-henry-smith/";
        let r = CwgcExtractor.extract(&Html::parse_document(&html), url);
        assert!(r.status.success);
        assert_eq!(r.casualty_id.as_deref(), Some("575231"));
        assert_eq!(r.full_name.as_deref(), Some("John Henry Smith"));
        assert_eq!(r.rank.as_deref(), Some("Private"));
        assert_eq!(r.service_number.as_deref(), Some("12345"));
        assert_eq!(r.death_date.as_deref(), Some("12 October 1917"));
        assert_eq!(r.age_at_death.as_deref(), Some("23"));
        assert_eq!(r.cemetery_name.as_deref(), Some("Etaples Military Cemetery"));
        assert_eq!(r.cemetery_address.as_deref(), Some("Pas de Calais, France"));
    }

    #[test]
    fn casualty_search_is_not_a_record() {
        let url = "https://www.cwgc.org/find-records/find-war-dead/search-results/?Surname=smith";
        let r = CwgcExtractor.extract(&Html::parse_document("<h1>Search</h1>"), url);
        assert!(!r.status.success);
        assert!(!r.status.data_may_be_incomplete);
    }
}
