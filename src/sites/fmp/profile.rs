//! Family tree person pages. Three layouts are live on the site at once: the
//! legacy editable tree, the read-only view reached from a tree search, and the
//! August 2025 `facts-and-events` page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::dom;
use crate::normalize::{clean_text, non_empty, place::strip_place_prefix};

use super::extract::{FmpRecord, FmpSpouse};

static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#maincontent > div > div.container.ng-scope").unwrap());
static PROFILE_BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.node.node--profile > div.node__body").unwrap());
static GIVEN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2.node__name > span.given").unwrap());
static SURNAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2.node__name > strong.surname").unwrap());
static INFO_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.node__info").unwrap());
static RELATIVES_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.profile-relatives").unwrap());
static FATHER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[tree-node-relationship='Father']").unwrap());
static MOTHER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[tree-node-relationship='Mother']").unwrap());
static TIMELINE_EVENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ol.timeline li.timeline-event").unwrap());
static BIRTH_ICON_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("i.icon-birth").unwrap());
static DEATH_ICON_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("i.icon-death").unwrap());
static MARRIAGE_ICON_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("i.icon-marriage").unwrap());
static EVENT_HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3.timeline-event__heading").unwrap());
static EVENT_YEAR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong.timeline-event__year").unwrap());
static EVENT_INFO_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.timeline-event__info").unwrap());

static ARTICLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#main > article").unwrap());
static MAIN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#main").unwrap());
static PARA_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static H2_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static BUTTON_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("button").unwrap());
static FACT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[role='list'] div[role='listitem'] > div").unwrap());
static FACT_VALUE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div > p").unwrap());
static SPOUSE_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2 > span > a").unwrap());

static YEAR_AND_PLACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(?:,\s*(.+))?$").unwrap());
static SHORT_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,2}\s+)?[A-Za-z]{3}\s+(\d{4})$").unwrap());

const TRANSCRIPT_LABEL_PREFIX: &str = "Tree node transcript for ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vital {
    Birth,
    Death,
    Marriage,
}

/// "Given Surname" from a node's name heading.
fn node_name(node: ElementRef<'_>) -> Option<String> {
    let parts: Vec<String> = [&*GIVEN_SEL, &*SURNAME_SEL]
        .into_iter()
        .filter_map(|sel| dom::select_first(node, sel).and_then(dom::non_empty_text))
        .collect();
    non_empty(&parts.join(" "))
}

/// Birth and death halves of "Born 1800, Atherstone • Died 1871, Mancetter".
/// A leading biography line before the first bullet is dropped.
fn split_summary(info: &str) -> (Option<&str>, Option<&str>) {
    let mut info = info.trim();
    if !info.starts_with("Born") && !info.starts_with("Died") {
        if let Some((_, rest)) = info.split_once('•') {
            info = rest.trim();
        }
    }
    match info.split_once('•') {
        Some((birth, death)) => (Some(birth.trim()), Some(death.trim())),
        None if info.starts_with("Born") => (Some(info), None),
        None if info.starts_with("Died") => (None, Some(info)),
        None => (None, None),
    }
}

/// "Born 1885, Pancras, London" → (year, place). Either half may be absent.
fn summary_year_and_place(part: &str, prefix: &str) -> (Option<String>, Option<String>) {
    let Some(rest) = part.strip_prefix(prefix).map(str::trim) else {
        return (None, None);
    };
    match YEAR_AND_PLACE_RE.captures(rest) {
        Some(caps) => (Some(caps[1].to_string()), caps.get(2).and_then(|m| non_empty(m.as_str()))),
        None => (None, non_empty(rest)),
    }
}

/// Date and place around the event year in a timeline sentence such as
/// "John was born on 3 Feb 1800 in Atherstone, Warwickshire."
fn date_and_place(info: &str, year: &str) -> Option<(String, String)> {
    let index = info.find(year)?;
    let before = info[..index].trim();
    let day_month = match before.find(" on ") {
        Some(on) => Some(&before[on + 4..]),
        None => before.strip_prefix("on "),
    };
    let date = match day_month.map(str::trim).filter(|d| !d.is_empty()) {
        Some(day_month) => format!("{} {}", day_month, year),
        None => year.to_string(),
    };
    Some((date, strip_place_prefix(&info[index + year.len()..])))
}

fn timeline_year(event: ElementRef<'_>, vital: Vital, record: &FmpRecord) -> Option<String> {
    if let Some(heading) = dom::select_first(event, &EVENT_HEADING_SEL) {
        let heading = dom::text(heading);
        let date = match vital {
            Vital::Birth => heading.strip_prefix("Born"),
            Vital::Death => heading.strip_prefix("Died"),
            Vital::Marriage => None,
        }?
        .trim();
        if date.len() == 4 {
            return Some(date.to_string());
        }
        return SHORT_DATE_RE.captures(date).map(|caps| caps[1].to_string());
    }
    if let Some(year) = dom::select_first(event, &EVENT_YEAR_SEL) {
        return dom::non_empty_text(year);
    }
    match vital {
        Vital::Birth => record.birth_year.clone(),
        Vital::Death => record.death_year.clone(),
        Vital::Marriage => None,
    }
}

/// Replace `current` when the candidate carries more detail.
fn keep_longer(current: &mut Option<String>, candidate: String) {
    if candidate.is_empty() {
        return;
    }
    if current.as_ref().is_none_or(|c| candidate.len() > c.len()) {
        *current = Some(candidate);
    }
}

fn read_timeline_event(event: ElementRef<'_>, record: &mut FmpRecord) {
    let vital = if dom::select_first(event, &BIRTH_ICON_SEL).is_some() {
        Vital::Birth
    } else if dom::select_first(event, &DEATH_ICON_SEL).is_some() {
        Vital::Death
    } else if dom::select_first(event, &MARRIAGE_ICON_SEL).is_some() {
        Vital::Marriage
    } else {
        return;
    };
    let Some(year) = timeline_year(event, vital, record) else {
        return;
    };
    let Some(info) = dom::select_first(event, &EVENT_INFO_SEL).and_then(dom::non_empty_text) else {
        return;
    };

    match vital {
        Vital::Birth => {
            if let Some((date, place)) = date_and_place(&info, &year) {
                if date.len() > record.birth_year.as_ref().map_or(0, String::len) {
                    record.birth_date = Some(date);
                }
                keep_longer(&mut record.birth_place, place);
            }
        }
        Vital::Death => {
            if let Some((date, place)) = date_and_place(&info, &year) {
                if date.len() > record.death_year.as_ref().map_or(0, String::len) {
                    record.death_date = Some(date);
                }
                keep_longer(&mut record.death_place, place);
            }
        }
        Vital::Marriage => {
            let Some((_, rest)) = info.split_once(" and ") else {
                return;
            };
            let Some((spouse, rest)) = rest.split_once(" were married ") else {
                return;
            };
            if let Some((date, place)) = date_and_place(rest, &year) {
                record.add_spouse(FmpSpouse {
                    name: clean_text(spouse),
                    marriage_date: Some(date),
                    marriage_place: non_empty(&place),
                });
            }
        }
    }
}

/// Editable tree profile: `#/trees/<tree>/<person>/profile`.
pub(super) fn read_legacy_profile(document: &Html, record: &mut FmpRecord) {
    let Some(container) = dom::select_in_document(document, &CONTAINER_SEL) else {
        return;
    };
    let Some(profile) = dom::select_first(container, &PROFILE_BODY_SEL) else {
        return;
    };

    record.given_name = dom::select_first(profile, &GIVEN_SEL).and_then(dom::non_empty_text);
    record.surname = dom::select_first(profile, &SURNAME_SEL).and_then(dom::non_empty_text);

    if let Some(info) = dom::select_first(profile, &INFO_SEL).map(dom::text) {
        let (birth, death) = split_summary(&info);
        if let Some(birth) = birth {
            (record.birth_year, record.birth_place) = summary_year_and_place(birth, "Born ");
        }
        if let Some(death) = death {
            (record.death_year, record.death_place) = summary_year_and_place(death, "Died ");
        }
    }

    if let Some(relatives) = dom::select_first(container, &RELATIVES_SEL) {
        record.father_name = dom::select_first(relatives, &FATHER_SEL).and_then(node_name);
        record.mother_name = dom::select_first(relatives, &MOTHER_SEL).and_then(node_name);
    }

    for event in container.select(&TIMELINE_EVENT_SEL) {
        read_timeline_event(event, record);
    }

    record.status.success = true;
}

/// Read-only profile from a tree search: label paragraphs followed by value paragraphs.
pub(super) fn read_search_tree_profile(document: &Html, record: &mut FmpRecord) {
    let Some(article) = dom::select_in_document(document, &ARTICLE_SEL) else {
        return;
    };

    record.full_name = dom::attr(article, "aria-label")
        .and_then(|label| label.strip_prefix(TRANSCRIPT_LABEL_PREFIX))
        .and_then(non_empty);

    for para in article.select(&PARA_SEL) {
        let label = dom::text(para);
        let following: Vec<ElementRef> = dom::following_elements(para).take(4).collect();
        match (label.as_str(), following.as_slice()) {
            ("Birth", [date, _, place, ..]) => {
                record.birth_date = dom::non_empty_text(*date);
                record.birth_place = dom::non_empty_text(*place);
            }
            ("Death", [date, _, place, ..]) => {
                record.death_date = dom::non_empty_text(*date);
                record.death_place = dom::non_empty_text(*place);
            }
            ("Marriage", [name, date, _, place]) => record.add_spouse(FmpSpouse {
                name: dom::text(*name),
                marriage_date: dom::non_empty_text(*date),
                marriage_place: dom::non_empty_text(*place),
            }),
            _ => {}
        }
    }

    record.status.success = true;
}

/// First value and optional place of one fact row's right-hand column.
fn fact_values(values: ElementRef<'_>) -> (Option<String>, Option<String>) {
    let columns: Vec<ElementRef> = dom::child_elements(values).collect();
    let first = columns
        .first()
        .and_then(|el| dom::select_first(*el, &FACT_VALUE_SEL))
        .and_then(dom::non_empty_text);
    let second = columns
        .get(1)
        .filter(|el| dom::select_first(**el, &BUTTON_SEL).is_none())
        .and_then(|el| match dom::child_elements(*el).count() {
            // a lone child is either the place or a comment
            1 => dom::children_matching(*el, &PARA_SEL).next(),
            2 => dom::select_first(*el, &PARA_SEL),
            _ => None,
        })
        .and_then(dom::non_empty_text);
    (first, second)
}

/// `trees/<tree>/people/<person>/facts-and-events`.
pub(super) fn read_tree_profile(document: &Html, record: &mut FmpRecord) {
    let Some(main) = dom::select_in_document(document, &MAIN_SEL) else {
        return;
    };

    for fact in main.select(&FACT_SEL) {
        let children: Vec<ElementRef> = dom::child_elements(fact).collect();
        let [left, right] = children.as_slice() else {
            continue;
        };
        let label = dom::select_first(*left, &H2_SEL)
            .or_else(|| {
                (dom::child_elements(*left).count() == 2)
                    .then(|| dom::select_first(*left, &PARA_SEL))
                    .flatten()
            })
            .map(dom::text);
        let Some(label) = label else {
            continue;
        };
        let (value, place) = fact_values(*right);

        match label.as_str() {
            "Full name" => record.full_name = value,
            "Birth" => (record.birth_date, record.birth_place) = (value, place),
            "Death" => (record.death_date, record.death_place) = (value, place),
            "Marriage" => {
                let spouse = dom::parent_element(fact)
                    .and_then(dom::previous_element_sibling)
                    .and_then(|prev| dom::select_first(prev, &SPOUSE_LINK_SEL))
                    .and_then(dom::non_empty_text);
                if let Some(name) = spouse {
                    record.add_spouse(FmpSpouse {
                        name,
                        marriage_date: value,
                        marriage_place: place,
                    });
                }
            }
            _ => {}
        }
    }

    record.status.success = record.full_name.is_some();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::fmp::{FmpExtractor, PageKind};
    use crate::sites::Extractor;

    fn extract_fixture(name: &str, url: &str) -> FmpRecord {
        let html = std::fs::read_to_string(format!("tests/fixtures/fmp/{}.html", name)).unwrap();
        FmpExtractor.extract(&Html::parse_document(&html), url)
    }

    #[test]
    fn summary_line() {
        let info = "Captain of the steamship Mineola • Born 1869, Pill, Somerset • Died 1947, Paignton, Devon, England";
        let (birth, death) = split_summary(info);
        assert_eq!(birth, Some("Born 1869, Pill, Somerset"));
        assert_eq!(death, Some("Died 1947, Paignton, Devon, England"));

        assert_eq!(split_summary("Died 1871"), (None, Some("Died 1871")));
        assert_eq!(
            summary_year_and_place("Born 1885, Pancras, London", "Born "),
            (Some("1885".to_string()), Some("Pancras, London".to_string()))
        );
        assert_eq!(summary_year_and_place("Born 1885", "Born "), (Some("1885".to_string()), None));
        assert_eq!(
            summary_year_and_place("Born Pancras, London", "Born "),
            (None, Some("Pancras, London".to_string()))
        );
    }

    #[test]
    fn timeline_sentences() {
        assert_eq!(
            date_and_place("John Davis was born on 3 Feb 1800 in Atherstone, Warwickshire.", "1800"),
            Some(("3 Feb 1800".to_string(), "Atherstone, Warwickshire".to_string()))
        );
        assert_eq!(
            date_and_place("Ann died in 1871 at age 71 in Mancetter.", "1871"),
            Some(("1871".to_string(), "Mancetter".to_string()))
        );
        assert_eq!(date_and_place("no year here", "1900"), None);
    }

    #[test]
    fn legacy_profile() {
        let url = "https://tree.findmypast.co.uk/#/trees/918c5b61-df62-4dec-b840-31cad3d86bf9/1181965009/profile";
        let r = extract_fixture("legacy_profile", url);
        assert!(r.status.success);
        assert_eq!(r.page_kind, Some(PageKind::LegacyProfile));
        assert_eq!(r.profile_id.as_deref(), Some("1181965009"));
        assert_eq!(r.given_name.as_deref(), Some("John"));
        assert_eq!(r.surname.as_deref(), Some("Davis"));
        assert_eq!(r.birth_year.as_deref(), Some("1800"));
        assert_eq!(r.birth_date.as_deref(), Some("3 Feb 1800"));
        assert_eq!(r.birth_place.as_deref(), Some("Atherstone, Warwickshire, England"));
        assert_eq!(r.death_year.as_deref(), Some("1871"));
        assert_eq!(r.death_place.as_deref(), Some("Mancetter, Warwickshire, England"));
        assert_eq!(r.father_name.as_deref(), Some("William Davis"));
        assert_eq!(r.mother_name.as_deref(), Some("Elizabeth Hunt"));
        assert_eq!(
            r.spouses,
            vec![FmpSpouse {
                name: "Ann Wright".to_string(),
                marriage_date: Some("5 Jun 1825".to_string()),
                marriage_place: Some("Mancetter".to_string()),
            }]
        );
    }

    #[test]
    fn search_tree_profile_dedups_spouses() {
        let url = "https://www.findmypast.co.uk/search-family-tree/transcript?id=918c5b61&ref=1181965009";
        let r = extract_fixture("search_tree_profile", url);
        assert!(r.status.success);
        assert_eq!(r.page_kind, Some(PageKind::SearchTreeProfile));
        assert_eq!(r.tree_id.as_deref(), Some("918c5b61"));
        assert_eq!(r.full_name.as_deref(), Some("Ann Wright"));
        assert_eq!(r.birth_date.as_deref(), Some("1802"));
        assert_eq!(r.death_place.as_deref(), Some("Mancetter, Warwickshire"));
        assert_eq!(r.spouses.len(), 1);
        assert_eq!(r.spouses[0].name, "John Davis");
    }

    #[test]
    fn facts_and_events_page() {
        let url = "https://www.findmypast.co.uk/trees/918c5b61-df62/people/1181964851/facts-and-events";
        let r = extract_fixture("tree_profile", url);
        assert!(r.status.success);
        assert_eq!(r.page_kind, Some(PageKind::TreeProfile));
        assert_eq!(r.full_name.as_deref(), Some("Mary Ellen Davis"));
        assert_eq!(r.birth_date.as_deref(), Some("14 Mar 1864"));
        assert_eq!(r.birth_place.as_deref(), Some("Tavistock, Devon, England"));
        assert_eq!(r.death_date.as_deref(), Some("1931"));
        assert_eq!(r.death_place, None);
        assert_eq!(r.spouses.len(), 1);
        assert_eq!(r.spouses[0].name, "Thomas Brooks");
        assert_eq!(r.spouses[0].marriage_place.as_deref(), Some("Plymouth, Devon"));
    }

    #[test]
    fn facts_page_without_name_is_incomplete() {
        let url = "https://www.findmypast.co.uk/trees/918c5b61-df62/people/1181964851/facts-and-events";
        let r = FmpExtractor.extract(&Html::parse_document(r#"<div id="main"><div role="list"></div></div>"#), url);
        assert!(!r.status.success);
        assert!(r.status.data_may_be_incomplete);
    }
}
