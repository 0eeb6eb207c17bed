use scraper::ElementRef;
use tracing::debug;

use super::lists::extract_list;
use super::markup::{
    attr_or_empty, check_depth, element_children, find_descendant, has_class, is_list, is_tag,
    text_of,
};
use super::tables::extract_table;
use crate::config::Settings;
use crate::error::Result;
use crate::model::ContentBlock;

/// One dispatch entry: the first rule whose `matches` accepts a node builds
/// its block. `build` may still decline (e.g. a highlight box with no list).
struct Rule {
    name: &'static str,
    matches: fn(ElementRef<'_>, &Settings) -> bool,
    build: fn(ElementRef<'_>, &Settings, usize) -> Result<Option<ContentBlock>>,
}

const RULES: &[Rule] = &[
    Rule {
        name: "paragraph",
        matches: |el, _| is_tag(el, "p"),
        build: |el, _, _| Ok(Some(ContentBlock::paragraph(text_of(el)))),
    },
    Rule {
        name: "list",
        matches: |el, _| is_list(el),
        build: |el, settings, depth| {
            let items = extract_list(el, settings, depth)?;
            Ok(Some(ContentBlock::List { items }))
        },
    },
    Rule {
        name: "table",
        matches: |el, _| {
            is_tag(el, "table") || find_descendant(el, |d| is_tag(d, "table")).is_some()
        },
        build: |el, _, _| {
            let table = if is_tag(el, "table") {
                Some(el)
            } else {
                find_descendant(el, |d| is_tag(d, "table"))
            };
            Ok(table.map(|t| ContentBlock::Table(extract_table(t))))
        },
    },
    Rule {
        name: "image",
        matches: |el, _| is_tag(el, "img"),
        build: |el, _, _| Ok(Some(image_block(el))),
    },
    Rule {
        name: "highlight_box",
        matches: |el, settings| has_class(el, &settings.highlight_class),
        build: |el, settings, depth| match find_descendant(el, is_list) {
            Some(list) => Ok(Some(ContentBlock::HighlightBox {
                items: extract_list(list, settings, depth)?,
            })),
            None => Ok(None),
        },
    },
];

pub(super) fn image_block(img: ElementRef<'_>) -> ContentBlock {
    ContentBlock::Image {
        src: attr_or_empty(img, "src"),
        alt: attr_or_empty(img, "alt"),
    }
}

fn rule_for(el: ElementRef<'_>, settings: &Settings) -> Option<&'static Rule> {
    RULES.iter().find(|r| (r.matches)(el, settings))
}

/// Normalize a sibling run into blocks, one per matched node, in document
/// order. Unrecognized nodes are skipped.
pub fn normalize<'a, I>(nodes: I, settings: &Settings) -> Result<Vec<ContentBlock>>
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    let mut blocks = Vec::new();
    for el in nodes {
        match rule_for(el, settings) {
            Some(rule) => {
                if let Some(block) = (rule.build)(el, settings, 0)? {
                    blocks.push(block);
                } else {
                    debug!(rule = rule.name, tag = el.value().name(), "rule produced no block");
                }
            }
            None => debug!(tag = el.value().name(), "skipping unrecognized content node"),
        }
    }
    Ok(blocks)
}

/// Normalize everything below `root`, walking through unrecognized wrappers.
/// Only a `table` element itself counts as a table here, so a wrapper holding
/// both prose and a table keeps both. Nodes accepted by `skip` are dropped
/// with their subtree.
pub fn normalize_deep<F>(
    root: ElementRef<'_>,
    settings: &Settings,
    skip: F,
) -> Result<Vec<ContentBlock>>
where
    F: Fn(ElementRef<'_>) -> bool,
{
    let mut blocks = Vec::new();
    walk_deep(root, settings, &skip, 0, &mut blocks)?;
    Ok(blocks)
}

fn walk_deep<F>(
    el: ElementRef<'_>,
    settings: &Settings,
    skip: &F,
    depth: usize,
    out: &mut Vec<ContentBlock>,
) -> Result<()>
where
    F: Fn(ElementRef<'_>) -> bool,
{
    check_depth(depth, settings.max_depth)?;
    for child in element_children(el) {
        if skip(child) {
            continue;
        }
        let rule =
            rule_for(child, settings).filter(|r| r.name != "table" || is_tag(child, "table"));
        let block = match rule {
            Some(rule) => (rule.build)(child, settings, 0)?,
            None => None,
        };
        match block {
            Some(block) => out.push(block),
            None => walk_deep(child, settings, skip, depth + 1, out)?,
        }
    }
    Ok(())
}
