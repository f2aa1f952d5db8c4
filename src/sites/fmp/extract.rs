use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom;
use crate::page_url::{RouteTable, UrlParts};
use crate::sites::{ExtractStatus, Extractor, LabelledFields, RawRecord};

use super::profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Transcript,
    Record,
    SearchTree,
    LegacyProfile,
    ImageShare,
    TreeProfile,
}

static ROUTES: LazyLock<RouteTable<Page>> = LazyLock::new(|| {
    RouteTable::new(&[
        (Page::Transcript, r"^transcript$"),
        (Page::Record, r"^record$"),
        (Page::SearchTree, r"^search-family-tree"),
        (Page::LegacyProfile, r"^#/trees/(?P<tree>[a-f0-9-]+)/(?P<profile>[0-9]+)/profile"),
        (Page::ImageShare, r"^image-share/(?P<share>[a-f0-9-]+)"),
        (
            Page::TreeProfile,
            r"^trees/(?P<tree>[a-f0-9-]+)/people/(?P<profile>[0-9]+)/facts-and-events",
        ),
    ])
});

static HEADER_CONTENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[data-testid=transcript-header-content]").unwrap());
static RECORD_TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody[data-testid=transcript-record-table]").unwrap());
static HOUSEHOLD_TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table[data-testid=transcript-household-table]").unwrap());
static GENDER_IMG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr[data-testid=transcript-table-heading] picture img").unwrap());
static TRANSCRIPT_HEADER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article[data-testid=transcript-header]").unwrap());
static IMAGE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="https://search.findmypast."]"#).unwrap());
static HEADING_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div > h1").unwrap());
static PLACE_SPAN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div > span").unwrap());
static PLACE_PARA_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div > p").unwrap());
static DIV_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static HOUSEHOLD_HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("thead > tr > th").unwrap());
static HOUSEHOLD_ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody > tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static EXPAND_BUTTON_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("button[aria-expanded]").unwrap());

static DISPLAY_TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#transcriptionDisplayTable").unwrap());
static NODE_IMAGE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.node__image-wrap > a").unwrap());

static MAIN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#main").unwrap());
static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static PICTURE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div a div picture").unwrap());
static PARA_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static DESCRIPTION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#content p").unwrap());

/// Which reader produced the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageKind {
    Transcript,
    Image,
    LegacyProfile,
    SearchTreeProfile,
    TreeProfile,
    ImageShare,
}

impl PageKind {
    pub fn is_profile(self) -> bool {
        matches!(
            self,
            PageKind::LegacyProfile | PageKind::SearchTreeProfile | PageKind::TreeProfile
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Household {
    pub headings: Vec<String>,
    pub members: Vec<HouseholdRow>,
    /// Whether the page showed every member or only the first few.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HouseholdRow {
    pub fields: LabelledFields,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
    /// Row withheld by the site, typically a person who may still be living.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FmpSpouse {
    pub name: String,
    pub marriage_date: Option<String>,
    pub marriage_place: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FmpRecord {
    #[serde(flatten)]
    pub status: ExtractStatus,
    pub page_kind: Option<PageKind>,
    pub tree_id: Option<String>,
    pub profile_id: Option<String>,
    pub image_share_id: Option<String>,

    pub heading: Option<String>,
    pub collection: Option<String>,
    pub place: Option<String>,
    pub person_gender: Option<String>,
    pub record_data: LabelledFields,
    pub household: Option<Household>,
    pub image_url: Option<String>,

    pub full_name: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub birth_year: Option<String>,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub death_year: Option<String>,
    pub death_date: Option<String>,
    pub death_place: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub spouses: Vec<FmpSpouse>,

    pub detail_text: Option<String>,
    pub description: Option<String>,
}

impl FmpRecord {
    pub(super) fn add_spouse(&mut self, spouse: FmpSpouse) {
        if !spouse.name.is_empty() && !self.spouses.contains(&spouse) {
            self.spouses.push(spouse);
        }
    }
}

impl RawRecord for FmpRecord {
    fn status(&self) -> &ExtractStatus {
        &self.status
    }
}

pub struct FmpExtractor;

impl Extractor for FmpExtractor {
    type Record = FmpRecord;

    fn extract(&self, document: &Html, url: &str) -> FmpRecord {
        let mut record = FmpRecord {
            status: ExtractStatus::new(url),
            ..Default::default()
        };

        let Some(parts) = UrlParts::parse(url) else {
            return record;
        };
        let Some(route) = ROUTES.classify(&parts.path) else {
            debug!(url, path = %parts.path, "not a transcript, image or tree page");
            return record;
        };
        record.tree_id = route.get("tree").map(str::to_string);
        record.profile_id = route.get("profile").map(str::to_string);
        record.image_share_id = route.get("share").map(str::to_string);

        match route.kind {
            Page::Transcript => {
                record.page_kind = Some(PageKind::Transcript);
                read_style1_transcript(document, &mut record);
            }
            Page::Record => match dom::select_in_document(document, &DISPLAY_TABLE_SEL) {
                Some(table) => {
                    record.page_kind = Some(PageKind::Transcript);
                    read_style2_transcript(document, table, &mut record);
                }
                None => {
                    record.page_kind = Some(PageKind::Image);
                    record.status.success = true;
                }
            },
            Page::SearchTree => {
                record.tree_id = parts.query_param("id").map(str::to_string);
                record.profile_id = parts.query_param("ref").map(str::to_string);
                if record.tree_id.is_none() || record.profile_id.is_none() {
                    debug!(url, "family tree search page without a profile");
                    return record;
                }
                record.page_kind = Some(PageKind::SearchTreeProfile);
                profile::read_search_tree_profile(document, &mut record);
            }
            Page::LegacyProfile => {
                record.page_kind = Some(PageKind::LegacyProfile);
                profile::read_legacy_profile(document, &mut record);
            }
            Page::TreeProfile => {
                record.page_kind = Some(PageKind::TreeProfile);
                profile::read_tree_profile(document, &mut record);
            }
            Page::ImageShare => {
                record.page_kind = Some(PageKind::ImageShare);
                read_image_share(document, &mut record);
            }
        }

        if !record.status.success {
            record.status.data_may_be_incomplete = true;
        }
        record
    }
}

/// Two-column record tables arrive row by row as left, right, left, right.
fn reorder_columns(fields: &mut LabelledFields) {
    let labels: Vec<&str> = fields.labels().take(3).collect();
    let interleaved = matches!(
        labels.as_slice(),
        [first, _, third] if first.starts_with("First name") && third.starts_with("Last name")
    );
    if interleaved {
        fields.deinterleave();
    }
}

/// First div after the heading that holds nested content and is not the actions menu.
fn collection_after_heading(heading: ElementRef<'_>) -> Option<String> {
    dom::following_elements(heading)
        .filter(|el| dom::tag_name(*el) == "div" && dom::select_first(*el, &DIV_SEL).is_some())
        .filter_map(dom::non_empty_text)
        .find(|text| !text.to_lowercase().contains("actions for"))
}

fn read_household(table: ElementRef<'_>) -> Household {
    let headings: Vec<String> = table.select(&HOUSEHOLD_HEADING_SEL).map(dom::label).collect();
    let mut household = Household {
        headings: headings.iter().filter(|h| !h.is_empty()).cloned().collect(),
        ..Default::default()
    };

    for row in table.select(&HOUSEHOLD_ROW_SEL) {
        let cells: Vec<ElementRef> = row.select(&CELL_SEL).collect();
        if cells.len() == headings.len() {
            let fields: LabelledFields =
                headings.iter().zip(&cells).map(|(h, cell)| (h.as_str(), dom::text(*cell))).collect();
            if fields.is_empty() {
                continue;
            }
            household.members.push(HouseholdRow {
                fields,
                selected: dom::attr(row, "aria-selected") == Some("true"),
                closed: false,
            });
        } else if cells.len() == 1 {
            household.members.push(HouseholdRow {
                closed: true,
                ..Default::default()
            });
        }
    }

    household.expanded = dom::following_elements(table).find_map(|sibling| {
        let button = if dom::tag_name(sibling) == "button" {
            Some(sibling)
        } else {
            dom::select_first(sibling, &EXPAND_BUTTON_SEL)
        };
        match dom::attr(button?, "aria-expanded")?.to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    });
    household
}

fn read_style1_transcript(document: &Html, record: &mut FmpRecord) {
    let header = dom::select_in_document(document, &HEADER_CONTENT_SEL);
    let table = dom::select_in_document(document, &RECORD_TABLE_SEL);
    let (Some(header), Some(table)) = (header, table) else {
        return;
    };

    if let Some(heading) = dom::select_first(header, &HEADING_SEL) {
        record.heading = dom::non_empty_text(heading);
        record.collection = collection_after_heading(heading);
    }
    record.place = dom::select_first(header, &PLACE_SPAN_SEL)
        .or_else(|| dom::select_first(header, &PLACE_PARA_SEL))
        .and_then(dom::non_empty_text);
    record.person_gender = dom::select_in_document(document, &GENDER_IMG_SEL)
        .and_then(|img| dom::attr(img, "alt"))
        .filter(|alt| *alt == "Male" || *alt == "Female")
        .map(str::to_lowercase);

    record.record_data = LabelledFields::from_two_cell_rows(table.select(&ROW_SEL));
    reorder_columns(&mut record.record_data);

    record.household = dom::select_in_document(document, &HOUSEHOLD_TABLE_SEL).map(read_household);

    // the header article can appear twice; the last link wins
    record.image_url = document
        .select(&TRANSCRIPT_HEADER_SEL)
        .filter_map(dom::parent_element)
        .filter_map(|div| dom::select_first(div, &IMAGE_LINK_SEL))
        .filter_map(|a| dom::attr(a, "href"))
        .last()
        .map(str::to_string);

    record.status.success = true;
}

fn read_style2_transcript(document: &Html, table: ElementRef<'_>, record: &mut FmpRecord) {
    record.record_data = LabelledFields::from_two_cell_rows(table.select(&ROW_SEL));
    reorder_columns(&mut record.record_data);
    record.collection = record.record_data.get("Record set").map(str::to_string);
    record.image_url = dom::select_in_document(document, &NODE_IMAGE_LINK_SEL)
        .and_then(|a| dom::attr(a, "href"))
        .map(str::to_string);
    record.status.success = true;
}

/// The heading and description are user-editable, so no structure is assumed.
fn read_image_share(document: &Html, record: &mut FmpRecord) {
    let Some(main) = dom::select_in_document(document, &MAIN_SEL) else {
        return;
    };
    let Some(h1) = dom::select_first(main, &H1_SEL) else {
        return;
    };
    record.heading = dom::non_empty_text(h1);
    record.detail_text = dom::select_first(main, &PICTURE_SEL)
        .and_then(dom::parent_element)
        .and_then(|parent| dom::select_first(parent, &PARA_SEL))
        .and_then(dom::non_empty_text);
    record.description = dom::select_first(main, &DESCRIPTION_SEL).and_then(dom::non_empty_text);
    record.status.success = true;
}
