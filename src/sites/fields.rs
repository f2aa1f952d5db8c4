use scraper::ElementRef;
use serde::{Deserialize, Serialize};

use crate::dom;
use crate::normalize::clean_text;

/// Label/value pairs in page order. Assigning to an existing label keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelledFields(Vec<(String, String)>);

impl LabelledFields {
    pub fn new() -> Self {
        LabelledFields(Vec::new())
    }

    /// Blank labels or values are dropped.
    pub fn insert(&mut self, label: &str, value: &str) {
        let (label, value) = (clean_text(label), clean_text(value));
        if label.is_empty() || value.is_empty() {
            return;
        }
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some(existing) => existing.1 = value,
            None => self.0.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, v)| v.as_str())
    }

    /// First label in `labels` that has a value.
    pub fn first_of(&self, labels: &[&str]) -> Option<&str> {
        labels.iter().find_map(|label| self.get(label))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `<dt>label</dt><dd>value</dd>` pairs that are direct children of `dl`.
    pub fn from_definition_list(dl: ElementRef<'_>) -> Self {
        dom::child_elements(dl)
            .filter(|el| dom::tag_name(*el) == "dt")
            .filter_map(|dt| {
                let dd = dom::next_element_sibling(dt).filter(|el| dom::tag_name(*el) == "dd")?;
                Some((dom::label(dt), dom::text(dd)))
            })
            .collect()
    }

    /// Rows of exactly two cells: label then value. Any other row is skipped.
    pub fn from_two_cell_rows<'a>(rows: impl IntoIterator<Item = ElementRef<'a>>) -> Self {
        rows.into_iter()
            .filter_map(|row| match dom::child_elements(row).collect::<Vec<_>>().as_slice() {
                [label, value] => Some((dom::label(*label), dom::text(*value))),
                _ => None,
            })
            .collect()
    }

    /// Undo the column interleaving of a two-column table read row by row:
    /// even positions first, then odd ones.
    pub fn deinterleave(&mut self) {
        let (left, right): (Vec<_>, Vec<_>) = std::mem::take(&mut self.0)
            .into_iter()
            .enumerate()
            .partition(|(i, _)| i % 2 == 0);
        self.0 = left.into_iter().chain(right).map(|(_, pair)| pair).collect();
    }
}

impl<L: AsRef<str>, V: AsRef<str>> FromIterator<(L, V)> for LabelledFields {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut fields = LabelledFields::new();
        for (label, value) in iter {
            fields.insert(label.as_ref(), value.as_ref());
        }
        fields
    }
}
