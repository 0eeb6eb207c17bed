use scraper::ElementRef;

use super::blocks::normalize;
use super::markup::{find_descendant, is_list, is_tag, text_of, Marker};
use crate::config::Settings;
use crate::error::Result;
use crate::model::Section;

/// Split page content into one Section per section heading.
///
/// Headings are collected anywhere below `root` except inside tables and
/// list items. Each heading owns the element siblings that follow it, up to
/// the next sibling that is, or contains, another section heading. A page
/// without headings yields no sections.
pub fn segment(root: ElementRef<'_>, settings: &Settings) -> Result<Vec<Section>> {
    let marker = Marker::new(&settings.section_heading_tag, &settings.section_heading_class);
    let headings = section_headings(root, marker);

    let mut sections = Vec::with_capacity(headings.len());
    for heading in headings {
        let run = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|sib| !starts_section(*sib, root, marker));
        sections.push(Section {
            title: text_of(heading),
            content: normalize(run, settings)?,
        });
    }
    Ok(sections)
}

fn section_headings<'a>(root: ElementRef<'a>, marker: Marker<'_>) -> Vec<ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| marker.matches(*el) && !inside_content(*el, root))
        .collect()
}

/// Headings nested in a table (e.g. a caption) or a list item are content,
/// not section boundaries.
fn inside_content(el: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    el.ancestors()
        .take_while(|a| a.id() != root.id())
        .filter_map(ElementRef::wrap)
        .any(|a| is_tag(a, "table") || is_tag(a, "li") || is_list(a))
}

/// Containment is judged against the page root, so a heading in the caption
/// of a table sibling does not end the run.
fn starts_section(el: ElementRef<'_>, root: ElementRef<'_>, marker: Marker<'_>) -> bool {
    marker.matches(el)
        || find_descendant(el, |d| marker.matches(d) && !inside_content(d, root)).is_some()
}
