use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom;
use crate::page_url::{RouteTable, UrlParts};
use crate::sites::{ExtractStatus, Extractor, LabelledFields, RawRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Grave,
}

static ROUTES: LazyLock<RouteTable<Page>> =
    LazyLock::new(|| RouteTable::new(&[(Page::Grave, r"^grave/(?P<name>[^/]+)/(?P<id>\d+)")]));

static NAME_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1.grave-name").unwrap());
static FACTS_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dl.grave-facts").unwrap());
static CEMETERY_NAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".cemetery-info .cemetery-name").unwrap());
static CEMETERY_ADDRESS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".cemetery-info address").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BgRecord {
    #[serde(flatten)]
    pub status: ExtractStatus,
    pub grave_id: Option<String>,
    pub full_name: Option<String>,
    pub given_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub age_at_death: Option<String>,
    pub cemetery_name: Option<String>,
    pub cemetery_full_address: Option<String>,
}

impl RawRecord for BgRecord {
    fn status(&self) -> &ExtractStatus {
        &self.status
    }
}

pub struct BgExtractor;

impl Extractor for BgExtractor {
    type Record = BgRecord;

    fn extract(&self, document: &Html, url: &str) -> BgRecord {
        let mut record = BgRecord {
            status: ExtractStatus::new(url),
            ..Default::default()
        };

        let Some(route) = UrlParts::parse(url).and_then(|parts| ROUTES.classify(&parts.path)) else {
            debug!(url, "not a grave page");
            return record;
        };
        record.grave_id = route.get("id").map(str::to_string);

        let Some(name) = dom::select_in_document(document, &NAME_SEL) else {
            record.status.data_may_be_incomplete = true;
            return record;
        };
        record.full_name = Some(dom::text(name)).filter(|n| !n.is_empty());

        if let Some(dl) = dom::select_in_document(document, &FACTS_SEL) {
            let facts = LabelledFields::from_definition_list(dl);
            record.given_name = facts.first_of(&["Given name", "First name"]).map(str::to_string);
            record.last_name = facts.first_of(&["Last name", "Surname"]).map(str::to_string);
            record.birth_date = facts.first_of(&["Born", "Birth"]).map(str::to_string);
            record.death_date = facts.first_of(&["Died", "Death"]).map(str::to_string);
            record.age_at_death = facts.first_of(&["Age at death", "Age"]).map(str::to_string);
        }

        record.cemetery_name = dom::select_in_document(document, &CEMETERY_NAME_SEL)
            .map(dom::text)
            .filter(|t| !t.is_empty());
        record.cemetery_full_address = dom::select_in_document(document, &CEMETERY_ADDRESS_SEL)
            .map(dom::text)
            .filter(|t| !t.is_empty());

        record.status.success = true;
        record
    }
}
