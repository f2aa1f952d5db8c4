//! Null-tolerant helpers over the parsed page.
//!
//! Every lookup hands back an `Option` or an empty iterator; a missing node
//! narrows what an extractor can fill in, it never aborts the extraction.

use scraper::{ElementRef, Html, Selector};

use crate::normalize::{clean_label, clean_text};

pub fn select_first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

pub fn select_in_document<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

/// Direct element children only (text and comment nodes skipped).
pub fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Direct children matching `selector`, the `:scope > x` query.
pub fn children_matching<'a, 'b>(
    el: ElementRef<'a>,
    selector: &'b Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    child_elements(el).filter(move |child| selector.matches(child))
}

pub fn next_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Element siblings after `el`, nearest first.
pub fn following_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.next_siblings().filter_map(ElementRef::wrap)
}

pub fn previous_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.prev_siblings().find_map(ElementRef::wrap)
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// Concatenated text content, untouched.
pub fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Text content with whitespace collapsed.
pub fn text(el: ElementRef<'_>) -> String {
    clean_text(&raw_text(el))
}

/// `text`, or `None` when the element holds only whitespace.
pub fn non_empty_text(el: ElementRef<'_>) -> Option<String> {
    Some(text(el)).filter(|t| !t.is_empty())
}

/// Text content as a label: whitespace collapsed, trailing colon dropped.
pub fn label(el: ElementRef<'_>) -> String {
    clean_label(&raw_text(el))
}

/// Cleaned text of the element's own text-node children, skipping nested elements.
pub fn own_text_parts(el: ElementRef<'_>) -> Vec<String> {
    el.children()
        .filter_map(|node| node.value().as_text().map(|t| clean_text(t)))
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name).map(str::trim).filter(|v| !v.is_empty())
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

pub fn tag_name<'a>(el: ElementRef<'a>) -> &'a str {
    el.value().name()
}
