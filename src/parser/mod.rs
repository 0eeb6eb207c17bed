pub mod blocks;
pub mod lists;
pub mod markup;
pub mod sections;
pub mod tables;

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::config::Settings;
use crate::error::Result;
use crate::identity;
use crate::model::{Document, Tab};
use markup::{element_children, find_descendant, has_class, is_tag, text_of, Marker};

/// Markup plus its crawl identifiers → Document.
///
/// `category_dir` and `file_name` follow the `<id>_<name>` convention; a
/// mismatch leaves the identity empty.
pub fn process_page(
    category_dir: &str,
    file_name: &str,
    markup: &str,
    settings: &Settings,
) -> Result<Document> {
    let html = Html::parse_fragment(markup);
    if !html.errors.is_empty() {
        debug!(
            file = file_name,
            recovered = html.errors.len(),
            "markup parsed with recoverable errors"
        );
    }
    let root = html.root_element();

    let sections = sections::segment(root, settings)?;
    let unsectioned = if sections.is_empty() {
        let title = Marker::new(&settings.title_tag, &settings.title_class);
        let tab_list = Marker::new(&settings.tab_list_tag, &settings.tab_list_class);
        blocks::normalize_deep(root, settings, |el| title.matches(el) || tab_list.matches(el))?
    } else {
        Vec::new()
    };

    Ok(Document {
        category: identity::parse_category(category_dir),
        page: identity::parse_page(file_name),
        title: page_title(root, settings),
        tabs: page_tabs(root, settings),
        sections,
        unsectioned,
    })
}

fn page_title(root: ElementRef<'_>, settings: &Settings) -> String {
    let marker = Marker::new(&settings.title_tag, &settings.title_class);
    find_descendant(root, |el| marker.matches(el))
        .map(text_of)
        .unwrap_or_default()
}

/// Tabs of the first tab list. Only the first `li` carrying the selected
/// class is reported as selected.
fn page_tabs(root: ElementRef<'_>, settings: &Settings) -> Vec<Tab> {
    let marker = Marker::new(&settings.tab_list_tag, &settings.tab_list_class);
    let Some(list) = find_descendant(root, |el| marker.matches(el)) else {
        return Vec::new();
    };

    let mut seen_selected = false;
    element_children(list)
        .filter(|li| is_tag(*li, "li"))
        .map(|li| {
            let href = find_descendant(li, |el| {
                is_tag(el, "a") && el.value().attr("href").is_some()
            })
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            let selected = !seen_selected && has_class(li, &settings.tab_selected_class);
            seen_selected |= selected;
            Tab {
                label: text_of(li),
                href,
                selected,
            }
        })
        .collect()
}
