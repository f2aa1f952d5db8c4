//! Date parsing primitives shared by every site.
//!
//! Free-text dates are matched against an ordered table of `(pattern, extractor)`
//! pairs; the first pattern that matches wins. The same table backs the
//! structured `DateObj` in the canonical record and the year inference rules,
//! so a date string always yields the same year no matter who asks.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateQualifier {
    #[default]
    Exact,
    About,
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDate {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

type DateExtractor = fn(&Captures) -> Option<ParsedDate>;

static QUALIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(abt\.?|about|circa|ca\.|c\.|bef\.?|before|aft\.?|after)\s+(.+)$").unwrap()
});

static DATE_PATTERNS: LazyLock<Vec<(Regex, DateExtractor)>> = LazyLock::new(|| {
    let table: [(&str, DateExtractor); 6] = [
        // 1850-05-12
        (r"^(\d{4})-(\d{1,2})-(\d{1,2})$", iso_date),
        // 12 May 1850, 12th May, 1850
        (r"^(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]+)\.?,?\s+(\d{4})$", day_month_year),
        // May 12, 1850
        (r"^([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$", month_day_year),
        // 12.05.1850, 12/05/1850
        (r"^(\d{1,2})[./](\d{1,2})[./](\d{4})$", numeric_day_month_year),
        // May 1850
        (r"^([A-Za-z]+)\.?,?\s+(\d{4})$", month_year),
        // 1850
        (r"^(\d{4})$", year_only),
    ];
    table
        .into_iter()
        .map(|(pattern, extractor)| (Regex::new(pattern).unwrap(), extractor))
        .collect()
});

fn iso_date(c: &Captures) -> Option<ParsedDate> {
    ymd(&c[1], Some(c[2].parse().ok()?), Some(&c[3]))
}

fn day_month_year(c: &Captures) -> Option<ParsedDate> {
    ymd(&c[3], Some(month_number(&c[2])?), Some(&c[1]))
}

fn month_day_year(c: &Captures) -> Option<ParsedDate> {
    ymd(&c[3], Some(month_number(&c[1])?), Some(&c[2]))
}

fn numeric_day_month_year(c: &Captures) -> Option<ParsedDate> {
    ymd(&c[3], Some(c[2].parse().ok()?), Some(&c[1]))
}

fn month_year(c: &Captures) -> Option<ParsedDate> {
    ymd(&c[2], Some(month_number(&c[1])?), None)
}

fn year_only(c: &Captures) -> Option<ParsedDate> {
    ymd(&c[1], None, None)
}

fn ymd(year: &str, month: Option<u32>, day: Option<&str>) -> Option<ParsedDate> {
    let year = year.parse::<i32>().ok()?;
    if month.is_some_and(|m| !(1..=12).contains(&m)) {
        return None;
    }
    let day = match day {
        Some(d) => Some(d.parse::<u32>().ok().filter(|d| (1..=31).contains(d))?),
        None => None,
    };
    Some(ParsedDate { year, month, day })
}

const MONTHS: &[(&str, u32)] = &[
    ("jan", 1), ("january", 1), ("januar", 1),
    ("feb", 2), ("february", 2), ("februar", 2),
    ("mar", 3), ("march", 3), ("mars", 3),
    ("apr", 4), ("april", 4),
    ("may", 5), ("mai", 5),
    ("jun", 6), ("june", 6), ("juni", 6),
    ("jul", 7), ("july", 7), ("juli", 7),
    ("aug", 8), ("august", 8),
    ("sep", 9), ("sept", 9), ("september", 9),
    ("oct", 10), ("october", 10), ("okt", 10), ("oktober", 10),
    ("nov", 11), ("november", 11),
    ("dec", 12), ("december", 12), ("des", 12), ("desember", 12),
];

/// English and Norwegian month names and their common abbreviations.
pub fn month_number(word: &str) -> Option<u32> {
    let lower = word.trim_end_matches('.').to_lowercase();
    MONTHS.iter().find(|(name, _)| *name == lower).map(|(_, n)| *n)
}

/// Strip a leading "abt"/"before"/"after" style qualifier.
pub fn split_qualifier(text: &str) -> (DateQualifier, &str) {
    let Some(caps) = QUALIFIER_RE.captures(text) else {
        return (DateQualifier::Exact, text);
    };
    let qualifier = match caps[1].to_lowercase().trim_end_matches('.') {
        "bef" | "before" => DateQualifier::Before,
        "aft" | "after" => DateQualifier::After,
        _ => DateQualifier::About,
    };
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or(text);
    (qualifier, rest)
}

/// Parse a cleaned date string. `None` when no pattern in the table matches.
pub fn parse(text: &str) -> Option<(DateQualifier, ParsedDate)> {
    let (qualifier, rest) = split_qualifier(text.trim());
    DATE_PATTERNS
        .iter()
        .filter_map(|(re, extract)| re.captures(rest).map(|caps| extract(&caps)))
        .next()
        .flatten()
        .map(|date| (qualifier, date))
}

/// The year component of a date string, or `None` when unparseable.
pub fn year_of(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    if trimmed.len() == 4 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse().ok();
    }
    parse(trimmed).map(|(_, d)| d.year)
}

/// A date found inside a free-text event description, plus whatever text followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTextDate {
    pub date: String,
    pub rest: String,
}

static EVENT_TEXT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "... on 12 May 1850 ..."
        r"\bon (\d{1,2} [A-Za-z]+ \d{4})\b",
        // "... on N/R May 1850 ..."
        r"\bon N/R ([A-Za-z]+ \d{4})\b",
        // "... in 1850"
        r"\bin (\d{4})\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// "Baptism of JOHN SMITH on 12 May 1850 in St. Mary's" → date "12 May 1850", rest " in St. Mary's".
pub fn date_from_event_text(text: &str) -> Option<EventTextDate> {
    EVENT_TEXT_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let whole = caps.get(0)?;
        Some(EventTextDate {
            date: caps[1].to_string(),
            rest: text[whole.end()..].to_string(),
        })
    })
}
