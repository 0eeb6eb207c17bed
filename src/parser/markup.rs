//! Small helpers over the `scraper` tree shared by the extractors.

use scraper::ElementRef;

use crate::error::{ExtractError, Result};

/// A tag name with an optional required class, e.g. `h4.title_line`.
#[derive(Debug, Clone, Copy)]
pub struct Marker<'s> {
    pub tag: &'s str,
    pub class: Option<&'s str>,
}

impl<'s> Marker<'s> {
    pub fn new(tag: &'s str, class: &'s str) -> Self {
        Marker {
            tag,
            class: (!class.is_empty()).then_some(class),
        }
    }

    pub fn matches(&self, el: ElementRef<'_>) -> bool {
        el.value().name() == self.tag && self.class.map_or(true, |c| has_class(el, c))
    }
}

pub fn is_tag(el: ElementRef<'_>, name: &str) -> bool {
    el.value().name() == name
}

pub fn is_list(el: ElementRef<'_>) -> bool {
    matches!(el.value().name(), "ul" | "ol")
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

pub fn element_children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children().filter_map(ElementRef::wrap)
}

/// First element strictly below `el` (document order) satisfying `pred`.
pub fn find_descendant<'a, F>(el: ElementRef<'a>, pred: F) -> Option<ElementRef<'a>>
where
    F: Fn(ElementRef<'a>) -> bool,
{
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|d| pred(*d))
}

/// Concatenated text of all descendant text nodes, trimmed.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Numeric span attribute; missing, non-numeric or zero values become 1.
pub fn span_attr(el: ElementRef<'_>, name: &str) -> u32 {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

pub fn attr_or_empty(el: ElementRef<'_>, name: &str) -> String {
    el.value().attr(name).unwrap_or_default().to_string()
}

/// Guard for the recursive walks.
pub fn check_depth(depth: usize, limit: usize) -> Result<()> {
    if depth > limit {
        Err(ExtractError::NestingTooDeep { limit })
    } else {
        Ok(())
    }
}
