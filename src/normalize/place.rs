//! Place-text primitives: connective prefix stripping and country detection.

use std::sync::LazyLock;

use regex::{Captures, Regex};

type PlaceExtractor = fn(&Captures) -> String;

static PLACE_PREFIXES: LazyLock<Vec<(Regex, PlaceExtractor)>> = LazyLock::new(|| {
    let table: [(&str, PlaceExtractor); 7] = [
        // "at age 80 at in Mancetter" and friends: the age clause comes first
        (r"^at age .*? at in (.+)$", first_group),
        (r"^at age .*? in (.+)$", first_group),
        (r"^at age .*? at (.+)$", first_group),
        (r"^at age .*$", nothing),
        (r"^at in (.+)$", first_group),
        (r"^in (.+)$", first_group),
        (r"^at (.+)$", first_group),
    ];
    table
        .into_iter()
        .map(|(pattern, extractor)| (Regex::new(pattern).unwrap(), extractor))
        .collect()
});

fn first_group(c: &Captures) -> String {
    c[1].trim().to_string()
}

fn nothing(_: &Captures) -> String {
    String::new()
}

/// "in Atherstone, Warwickshire." → "Atherstone, Warwickshire"
pub fn strip_place_prefix(text: &str) -> String {
    let trimmed = super::clean_text(text);
    let place = PLACE_PREFIXES
        .iter()
        .find_map(|(re, extract)| re.captures(&trimmed).map(|caps| extract(&caps)))
        .unwrap_or(trimmed);
    place.strip_suffix('.').unwrap_or(&place).trim().to_string()
}

const KNOWN_COUNTRIES: &[&str] = &[
    "Australia",
    "Belgium",
    "Canada",
    "Denmark",
    "England",
    "France",
    "Germany",
    "Ireland",
    "Isle of Man",
    "Netherlands",
    "New Zealand",
    "Northern Ireland",
    "Norway",
    "Poland",
    "Scotland",
    "South Africa",
    "Sweden",
    "United Kingdom",
    "United States",
    "USA",
    "Wales",
];

/// Split "Parish, County, Country" into its comma parts, pulling off a trailing
/// known country name.
pub fn split_country(place: &str) -> (Vec<String>, Option<String>) {
    let mut parts: Vec<String> = place
        .split(',')
        .map(super::clean_text)
        .filter(|p| !p.is_empty())
        .collect();
    let country = parts
        .last()
        .and_then(|last| KNOWN_COUNTRIES.iter().find(|c| c.eq_ignore_ascii_case(last)))
        .map(|c| c.to_string());
    if country.is_some() {
        parts.pop();
    }
    (parts, country)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_connectives() {
        assert_eq!(strip_place_prefix("in Pancras, London."), "Pancras, London");
        assert_eq!(strip_place_prefix("at in Atherstone"), "Atherstone");
        assert_eq!(strip_place_prefix("at St. Mary's"), "St. Mary's");
        assert_eq!(strip_place_prefix("Mancetter, Warwickshire"), "Mancetter, Warwickshire");
    }

    #[test]
    fn age_clause_is_skipped() {
        assert_eq!(strip_place_prefix("at age 71 in Mancetter, Warwickshire"), "Mancetter, Warwickshire");
        assert_eq!(strip_place_prefix("at age 71 at in Paignton"), "Paignton");
        assert_eq!(strip_place_prefix("at age 71"), "");
    }

    #[test]
    fn country_split() {
        let (parts, country) = split_country("Atherstone, Warwickshire, England");
        assert_eq!(parts, vec!["Atherstone", "Warwickshire"]);
        assert_eq!(country.as_deref(), Some("England"));

        let (parts, country) = split_country("Oak Hill Cemetery, Springfield");
        assert_eq!(parts.len(), 2);
        assert_eq!(country, None);

        assert_eq!(split_country(""), (vec![], None));
    }
}
