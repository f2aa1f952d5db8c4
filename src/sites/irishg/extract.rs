use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom;
use crate::page_url::{RouteTable, UrlParts};
use crate::sites::{ExtractStatus, Extractor, LabelledFields, RawRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Civil,
    Church,
}

static ROUTES: LazyLock<RouteTable<Page>> = LazyLock::new(|| {
    RouteTable::new(&[
        (Page::Civil, r"^churchrecords/details-civil/(?P<id>[a-z0-9_-]+)"),
        (Page::Church, r"^churchrecords/details/(?P<id>[a-z0-9_-]+)"),
    ])
});

static DETAILS_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.record-details").unwrap());
static EVENT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static LOCATION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.location").unwrap());
static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.record-data").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IrishgRecord {
    #[serde(flatten)]
    pub status: ExtractStatus,
    /// Sub-domain of the page: `churchrecords` or `civilrecords`.
    pub record_site: Option<String>,
    pub record_id: Option<String>,
    /// "Baptism of JOHN KELLY on 12 May 1850"
    pub event_text: Option<String>,
    /// "Area - DUBLIN (RC), Parish/Church/Congregation - ST. MARY'S"
    pub heading_text: Option<String>,
    pub record_data: LabelledFields,
    pub spouse_record_data: LabelledFields,
}

impl RawRecord for IrishgRecord {
    fn status(&self) -> &ExtractStatus {
        &self.status
    }
}

pub struct IrishgExtractor;

impl Extractor for IrishgExtractor {
    type Record = IrishgRecord;

    fn extract(&self, document: &Html, url: &str) -> IrishgRecord {
        let mut record = IrishgRecord {
            status: ExtractStatus::new(url),
            ..Default::default()
        };

        let Some(parts) = UrlParts::parse(url) else {
            return record;
        };
        let Some(route) = ROUTES.classify(&parts.path) else {
            debug!(url, "not a record details page");
            return record;
        };
        record.record_site = Some(parts.sub_domain.to_lowercase());
        record.record_id = route.get("id").map(str::to_string);

        let details = dom::select_in_document(document, &DETAILS_SEL);
        let Some(event) = details.and_then(|d| dom::select_first(d, &EVENT_SEL)) else {
            record.status.data_may_be_incomplete = true;
            return record;
        };
        record.event_text = Some(dom::text(event)).filter(|t| !t.is_empty());

        if let Some(details) = details {
            record.heading_text = dom::select_first(details, &LOCATION_SEL)
                .map(dom::text)
                .filter(|t| !t.is_empty());

            let mut tables = details.select(&TABLE_SEL);
            if let Some(table) = tables.next() {
                record.record_data = LabelledFields::from_two_cell_rows(table.select(&ROW_SEL));
            }
            if let Some(table) = tables.next() {
                record.spouse_record_data = LabelledFields::from_two_cell_rows(table.select(&ROW_SEL));
            }
        }

        record.status.success = true;
        record
    }
}
