use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom;
use crate::normalize::clean_label;
use crate::page_url::{RouteTable, UrlParts};
use crate::sites::{ExtractStatus, Extractor, LabelledFields, RawRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    View,
}

static ROUTES: LazyLock<RouteTable<Page>> = LazyLock::new(|| {
    RouteTable::new(&[(
        Page::View,
        r"^(?:(?P<lang>en|nb|nn)/)?view/(?P<source>\d+)/(?P<id>[a-z0-9]+)",
    )])
});

/// Headings of residence pages, which share the person-page layout.
const RESIDENCE_HEADINGS: [&str; 9] = [
    "Census district:",
    "Urban residence:",
    "Rural residence:",
    "Tellingskrets:",
    "Bosted by:",
    "Bosted land:",
    "Teljingskrets:",
    "Bustad by:",
    "Bustad land:",
];

static HTML_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("html").unwrap());
static ARTICLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());
static VIEWER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.main-container-viewer").unwrap());
static VIEWER_CRUMB_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("nav.breadcrumb-container li").unwrap());
static IMAGE_ID_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#permanent_image_id").unwrap());
static FILE_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#file-title-text").unwrap());
static CRUMB_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.breadcrumbs li").unwrap());
static COLLECTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.data-view > div.info > div > h4").unwrap());
static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.data-view > div.info > div.heading > h1").unwrap());
static SPAN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static LEFT_COLUMN_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.data-view div.left-view-column").unwrap());
static LEFT_ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.data-view div.left-view-column > div.row").unwrap());
static PERMANENT_ID_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#permanentId span").unwrap());
static PANEL_GROUP_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.panel-group").unwrap());
static PANEL_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4.panel-title").unwrap());
static DATA_ITEM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.panel-body div.data-item").unwrap());
static H4_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4").unwrap());
static PERSON_CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.row > div > div.row > div").unwrap());
static TABLE_HEAD_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.panel-body > div > div[aria-hidden='true'] > table.table th").unwrap()
});
static TABLE_ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.panel-body > div > table.table tbody tr.data-item").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static PANEL_ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.panel-body > div.row > div > div.row").unwrap());
static NESTED_ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.row div.row").unwrap());
static RIGHT_COLUMN_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.data-view div.right-view-column").unwrap());
static SOURCE_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4.title").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.row").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageType {
    Record,
    Image,
}

/// One `Label: Name` heading above the record, e.g. the archive or source it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionHeading {
    pub label: String,
    pub name: String,
}

/// A person listed in one of the record's panels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodaPerson {
    /// The person the page is about.
    pub current: bool,
    /// Role in the event, such as "Father" or "Brud".
    pub label: Option<String>,
    pub name_parts: Vec<String>,
    pub heading: Option<String>,
    pub fields: LabelledFields,
}

impl NodaPerson {
    pub fn name(&self) -> String {
        self.name_parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodaPanel {
    pub title: Option<String>,
    pub people: Vec<NodaPerson>,
    pub fields: LabelledFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodaRecord {
    #[serde(flatten)]
    pub status: ExtractStatus,
    pub lang: Option<String>,
    pub page_type: Option<PageType>,
    pub source_id: Option<String>,
    pub record_id: Option<String>,
    pub breadcrumbs: Vec<String>,
    pub collection_headings: Vec<CollectionHeading>,
    pub heading: Option<String>,
    pub heading_span_parts: Vec<String>,
    pub heading_text_parts: Vec<String>,
    pub image_link: Option<String>,
    pub record_data: LabelledFields,
    pub panels: Vec<NodaPanel>,
    pub source_information: Option<String>,
    pub source_data: LabelledFields,
    pub permanent_id: Option<String>,
    pub file_title: Option<String>,
}

impl RawRecord for NodaRecord {
    fn status(&self) -> &ExtractStatus {
        &self.status
    }
}

impl NodaRecord {
    /// Every listed person across all panels.
    pub fn people(&self) -> impl Iterator<Item = &NodaPerson> {
        self.panels.iter().flat_map(|panel| panel.people.iter())
    }
}

pub struct NodaExtractor;

impl Extractor for NodaExtractor {
    type Record = NodaRecord;

    fn extract(&self, document: &Html, url: &str) -> NodaRecord {
        let mut record = NodaRecord {
            status: ExtractStatus::new(url),
            ..Default::default()
        };

        let Some(route) = UrlParts::parse(url).and_then(|parts| ROUTES.classify(&parts.path)) else {
            debug!(url, "not a view page");
            return record;
        };
        record.source_id = route.get("source").map(str::to_string);
        record.record_id = route.get("id").map(str::to_string);
        record.lang = dom::select_in_document(document, &HTML_SEL)
            .and_then(|html| dom::attr(html, "lang"))
            .map(str::to_string);

        if let Some(article) = dom::select_in_document(document, &ARTICLE_SEL) {
            read_record_page(article, &mut record);
        } else if let Some(viewer) = dom::select_in_document(document, &VIEWER_SEL) {
            read_image_page(document, viewer, &mut record);
        } else {
            record.status.data_may_be_incomplete = true;
        }
        record
    }
}

/// Value cell text, with the `-` placeholder read as empty.
fn value_text(el: ElementRef<'_>) -> String {
    let text = dom::text(el);
    if text == "-" {
        String::new()
    } else {
        text
    }
}

/// Rows whose element children are exactly two divs: label then value.
fn label_value_rows<'a>(rows: impl IntoIterator<Item = ElementRef<'a>>) -> LabelledFields {
    rows.into_iter()
        .filter_map(|row| {
            let cells: Vec<_> = dom::child_elements(row).filter(|el| dom::tag_name(*el) == "div").collect();
            match cells.as_slice() {
                [label, value] => Some((dom::label(*label), value_text(*value))),
                _ => None,
            }
        })
        .collect()
}

fn read_image_page(document: &Html, viewer: ElementRef<'_>, record: &mut NodaRecord) {
    record.page_type = Some(PageType::Image);
    record.breadcrumbs = document.select(&VIEWER_CRUMB_SEL).filter_map(dom::non_empty_text).collect();
    record.permanent_id = dom::select_first(viewer, &IMAGE_ID_SEL)
        .or_else(|| dom::select_in_document(document, &IMAGE_ID_SEL))
        .and_then(|input| dom::attr(input, "value"))
        .map(str::to_string);
    record.file_title = dom::select_in_document(document, &FILE_TITLE_SEL).and_then(dom::non_empty_text);
    record.status.success = true;
}

fn read_record_page(article: ElementRef<'_>, record: &mut NodaRecord) {
    record.page_type = Some(PageType::Record);
    record.breadcrumbs = article.select(&CRUMB_SEL).filter_map(dom::non_empty_text).collect();
    record.collection_headings = article.select(&COLLECTION_SEL).filter_map(collection_heading).collect();

    let Some(h1) = dom::select_first(article, &HEADING_SEL) else {
        record.status.data_may_be_incomplete = true;
        return;
    };
    record.heading_span_parts = h1.select(&SPAN_SEL).filter_map(dom::non_empty_text).collect();
    if record
        .heading_span_parts
        .first()
        .is_some_and(|first| RESIDENCE_HEADINGS.contains(&first.as_str()))
    {
        debug!(url = %record.status.url, "residence page, not a person");
        return;
    }
    record.heading = dom::non_empty_text(h1);
    record.heading_text_parts = dom::own_text_parts(h1);
    record.image_link = dom::next_element_sibling(h1)
        .and_then(|sibling| {
            if dom::tag_name(sibling) == "a" {
                Some(sibling)
            } else {
                dom::select_first(sibling, &LINK_SEL)
            }
        })
        .and_then(|link| dom::attr(link, "href"))
        .map(str::to_string);

    for row in article.select(&LEFT_ROW_SEL) {
        if let Some(id) = row.select(&PERMANENT_ID_SEL).filter_map(dom::non_empty_text).last() {
            record.permanent_id = Some(id);
        } else if row.select(&PANEL_GROUP_SEL).next().is_some() {
            record.panels.extend(row.select(&PANEL_GROUP_SEL).map(read_panel));
        } else {
            for (label, value) in label_value_rows(row.select(&NESTED_ROW_SEL)).iter() {
                record.record_data.insert(label, value);
            }
        }
    }

    if let Some(right) = dom::select_first(article, &RIGHT_COLUMN_SEL) {
        record.source_information = dom::select_first(right, &SOURCE_TITLE_SEL)
            .and_then(dom::next_element_sibling)
            .and_then(dom::non_empty_text);
        record.source_data = label_value_rows(right.select(&ROW_SEL));
    }

    record.status.success = record.permanent_id.as_deref().is_some_and(|id| id.starts_with('p'))
        && record.heading.is_some()
        && dom::select_first(article, &LEFT_COLUMN_SEL).is_some();
}

fn collection_heading(h4: ElementRef<'_>) -> Option<CollectionHeading> {
    let label = dom::own_text_parts(h4)
        .iter()
        .map(|part| clean_label(part))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let name = dom::select_first(h4, &LINK_SEL)
        .map(|link| dom::own_text_parts(link).join(" "))
        .unwrap_or_default();
    (!label.is_empty() || !name.is_empty()).then_some(CollectionHeading { label, name })
}

fn read_panel(group: ElementRef<'_>) -> NodaPanel {
    let mut panel = NodaPanel {
        title: dom::select_first(group, &PANEL_TITLE_SEL).and_then(dom::non_empty_text),
        ..Default::default()
    };

    let items: Vec<_> = group.select(&DATA_ITEM_SEL).collect();
    if !items.is_empty() {
        panel.people = items.into_iter().map(data_item_person).collect();
        return panel;
    }

    let headings: Vec<String> = group.select(&TABLE_HEAD_SEL).map(dom::label).collect();
    if !headings.is_empty() {
        panel.people = table_people(group, &headings);
        return panel;
    }

    panel.fields = label_value_rows(group.select(&PANEL_ROW_SEL));
    panel
}

fn data_item_person(item: ElementRef<'_>) -> NodaPerson {
    let h4 = dom::select_first(item, &H4_SEL);
    let link = h4.and_then(|h| dom::select_first(h, &LINK_SEL));
    let mut person = NodaPerson {
        current: dom::has_class(item, "current"),
        label: link
            .and_then(|a| dom::select_first(a, &SPAN_SEL))
            .map(dom::label)
            .filter(|l| !l.is_empty()),
        name_parts: link.map(dom::own_text_parts).unwrap_or_default(),
        heading: h4.and_then(dom::non_empty_text),
        ..Default::default()
    };

    // Value cells are marked bold; each follows its label.
    let mut pending_label: Option<String> = None;
    for cell in item.select(&PERSON_CELL_SEL) {
        if dom::has_class(cell, "ssp-semibold") {
            if let Some(label) = pending_label.take() {
                person.fields.insert(&label, &value_text(cell));
            }
        } else {
            pending_label = Some(dom::label(cell));
        }
    }
    person
}

/// A visually hidden table carries the column headings; the visible one only rows.
fn table_people(group: ElementRef<'_>, headings: &[String]) -> Vec<NodaPerson> {
    let mut people = Vec::new();
    for row in group.select(&TABLE_ROW_SEL) {
        let cells: Vec<_> = row.select(&TD_SEL).collect();
        if cells.len() != headings.len() {
            debug!(cells = cells.len(), columns = headings.len(), "person table row does not fit its headings");
            break;
        }
        let link = row.select(&LINK_SEL).next();
        let label = link
            .and_then(|a| dom::select_first(a, &SPAN_SEL))
            .map(dom::label)
            .filter(|l| !l.is_empty());
        let name_parts = match link {
            Some(a) => dom::own_text_parts(a),
            None => cells.first().and_then(|c| dom::non_empty_text(*c)).into_iter().collect(),
        };
        let heading = [label.clone(), Some(name_parts.join(" "))]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        people.push(NodaPerson {
            current: dom::has_class(row, "current"),
            label,
            name_parts,
            heading: Some(heading).filter(|h| !h.is_empty()),
            fields: headings
                .iter()
                .zip(&cells)
                .map(|(heading, cell)| (heading.as_str(), value_text(*cell)))
                .collect(),
        });
    }
    people
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(fixture: &str, url: &str) -> NodaRecord {
        let html = std::fs::read_to_string(format!("tests/fixtures/noda/{}", fixture)).unwrap();
        NodaExtractor.extract(&Html::parse_document(&html), url)
    }

    #[test]
    fn baptism_record() {
        let r = extract("baptism.html", "https://www.digitalarkivet.no/en/view/255/pd00000012345678");
        assert!(r.status.success);
        assert_eq!(r.lang.as_deref(), Some("en"));
        assert_eq!(r.page_type, Some(PageType::Record));
        assert_eq!(r.source_id.as_deref(), Some("255"));
        assert_eq!(r.record_id.as_deref(), Some("pd00000012345678"));
        assert_eq!(r.breadcrumbs, ["Home", "Search", "Baptism"]);
        assert_eq!(
            r.collection_headings[0],
            CollectionHeading {
                label: "Source".into(),
                name: "Church book from Tynset parish 1850-1862".into()
            }
        );
        assert_eq!(r.heading_span_parts, ["Baptism:"]);
        assert_eq!(r.heading_text_parts, ["Ole Olsen"]);
        assert_eq!(r.image_link.as_deref(), Some("https://www.digitalarkivet.no/view/8/pc00000000123456"));
        assert_eq!(r.permanent_id.as_deref(), Some("pf01073484000473"));
        assert_eq!(r.record_data.get("Baptism date"), Some("1852-04-18"));
        assert_eq!(r.record_data.get("Gender"), Some("m"));
        // "-" placeholder
        assert_eq!(r.record_data.get("Residence"), None);
        assert_eq!(r.source_information.as_deref(), Some("Church book from Tynset parish"));
        assert_eq!(r.source_data.get("Parish"), Some("Tynset"));
        assert_eq!(r.source_data.get("County"), Some("Hedmark"));
    }

    #[test]
    fn panels_hold_people_and_fields() {
        let r = extract("baptism.html", "https://www.digitalarkivet.no/en/view/255/pd00000012345678");
        let people: Vec<_> = r.people().collect();
        assert_eq!(people.len(), 3);
        assert!(people[0].current);
        assert_eq!(people[0].label.as_deref(), Some("Baptised child"));
        assert_eq!(people[0].name(), "Ole Olsen");
        assert_eq!(people[1].label.as_deref(), Some("Father"));
        assert_eq!(people[1].name(), "Ole Hansen");
        assert_eq!(people[1].fields.get("Residence"), Some("Nordgaard"));
        assert_eq!(people[2].name(), "Marit Pedersdatter");
        let notes = r.panels.iter().find(|p| p.title.as_deref() == Some("Notes")).unwrap();
        assert_eq!(notes.fields.get("Comment"), Some("Twin"));
    }

    #[test]
    fn census_table_people() {
        let r = extract("census.html", "https://www.digitalarkivet.no/nb/view/47/pf01052345000123");
        assert!(r.status.success);
        assert_eq!(r.heading_span_parts, ["Folketelling:"]);
        let people: Vec<_> = r.people().collect();
        assert_eq!(people.len(), 3);
        assert_eq!(people[0].name(), "Hans Larsen");
        assert_eq!(people[0].fields.get("Familiestilling"), Some("Husfar"));
        assert!(people[1].current);
        assert_eq!(people[1].fields.get("Alder"), Some("32"));
        assert_eq!(people[2].fields.get("Kjønn"), Some("m"));
    }

    #[test]
    fn residence_heading_is_rejected() {
        let html = r#"<html lang="en"><body><article><div class="data-view"><div class="info">
            <div class="heading"><h1><span>Census district:</span> Tynset</h1></div></div>
            <div class="left-view-column"><div class="row"><div id="permanentId"><span>pb0000001</span></div></div></div>
            </div></article></body></html>"#;
        let r = NodaExtractor.extract(&Html::parse_document(html), "https://www.digitalarkivet.no/en/view/47/pb0000001");
        assert!(!r.status.success);
        assert!(!r.status.data_may_be_incomplete);
        assert_eq!(r.heading, None);
    }

    #[test]
    fn permanent_id_must_name_a_person() {
        let html = std::fs::read_to_string("tests/fixtures/noda/baptism.html")
            .unwrap()
            .replace("pf01073484000473", "sf01073484000473");
        let r = NodaExtractor.extract(
            &Html::parse_document(&html),
            "https://www.digitalarkivet.no/en/view/255/pd00000012345678",
        );
        assert!(!r.status.success);
        assert!(r.heading.is_some());
    }

    #[test]
    fn panels_without_record_rows() {
        let r = extract("panels_only.html", "https://www.digitalarkivet.no/en/view/255/pd00000012345690");
        assert!(r.status.success);
        assert!(r.record_data.is_empty());
        assert_eq!(r.permanent_id.as_deref(), Some("pf01073484000480"));
        let people: Vec<_> = r.people().collect();
        assert_eq!(people.len(), 1);
        assert!(people[0].current);
        assert_eq!(people[0].fields.get("Burial date"), Some("1855-11-02"));
    }

    #[test]
    fn missing_left_column_fails() {
        let html = std::fs::read_to_string("tests/fixtures/noda/panels_only.html")
            .unwrap()
            .replace("left-view-column", "side-column");
        let r = NodaExtractor.extract(
            &Html::parse_document(&html),
            "https://www.digitalarkivet.no/en/view/255/pd00000012345690",
        );
        assert!(!r.status.success);
        assert!(r.heading.is_some());
    }

    #[test]
    fn image_viewer() {
        let r = extract("image.html", "https://www.digitalarkivet.no/view/8/pc00000000123456");
        assert!(r.status.success);
        assert_eq!(r.page_type, Some(PageType::Image));
        assert_eq!(r.breadcrumbs, ["Church books", "Tynset", "Ministerialbok nr. 6"]);
        assert_eq!(r.permanent_id.as_deref(), Some("kb20061110030123"));
        assert_eq!(r.file_title.as_deref(), Some("Ministerialbok nr. 6 (1850-1862), page 45"));
    }

    #[test]
    fn route_without_content_may_be_incomplete() {
        let doc = Html::parse_document("<html><body><div id='app'></div></body></html>");
        let r = NodaExtractor.extract(&doc, "https://www.digitalarkivet.no/en/view/255/pd00000012345678");
        assert!(!r.status.success);
        assert!(r.status.data_may_be_incomplete);

        let r = NodaExtractor.extract(&doc, "https://www.digitalarkivet.no/en/search/persons?s=olsen");
        assert!(!r.status.success);
        assert!(!r.status.data_may_be_incomplete);
    }
}
