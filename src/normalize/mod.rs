pub mod date;
pub mod place;

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_COLON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*:+$").unwrap());
static PARENTHETICAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*\)").unwrap());

/// Collapse every whitespace run (including nbsp) to one space and trim.
pub fn clean_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Label text as shown next to a value: whitespace collapsed, trailing colons removed.
pub fn clean_label(s: &str) -> String {
    let text = clean_text(s);
    TRAILING_COLON_RE.replace(&text, "").to_string()
}

/// `clean_text`, but `None` when nothing is left.
pub fn non_empty(s: &str) -> Option<String> {
    let text = clean_text(s);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn first_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

/// "JOHN o'BRIEN-SMITH" → "John O'brien-Smith". Word starts follow whitespace and hyphens.
pub fn to_initial_caps_each_word(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        at_word_start = ch.is_whitespace() || ch == '-';
    }
    out
}

/// Remove explanatory annotations such as "(BASED ON OTHER DATE INFORMATION)"
/// and the "N/R" (not recorded) placeholder.
pub fn clean_date(s: &str) -> String {
    let without_notes = PARENTHETICAL_RE.replace_all(s, "");
    clean_text(&without_notes.replace("N/R", ""))
}

/// Split "Given Surname (Maiden)" into ("Given Surname", Some("Maiden")).
pub fn split_bracketed_surname(full_name: &str) -> (String, Option<String>) {
    static BRACKETED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(?s)(.+)\((.+)\)$").unwrap());

    let trimmed = full_name.trim();
    match BRACKETED_RE.captures(trimmed) {
        Some(caps) => {
            let name = clean_text(&caps[1]);
            let bracketed = clean_text(&caps[2]);
            if name.is_empty() || bracketed.is_empty() {
                (clean_text(trimmed), None)
            } else {
                (name, Some(bracketed))
            }
        }
        None => (clean_text(trimmed), None),
    }
}

/// Split on the last whitespace boundary: "John Henry Smith" → ("John Henry", "Smith").
pub fn split_on_last_space(full_name: &str) -> Option<(&str, &str)> {
    let trimmed = full_name.trim();
    let idx = trimmed.rfind(char::is_whitespace)?;
    let (forenames, last) = (trimmed[..idx].trim_end(), trimmed[idx..].trim_start());
    if forenames.is_empty() || last.is_empty() {
        None
    } else {
        Some((forenames, last))
    }
}
