//! Plain-text rendering of content blocks for indexing and export.
//!
//! Each block renders to zero or more lines; every line has its whitespace
//! collapsed and trimmed, and empty lines are dropped. Output depends only on
//! the input tree.

use crate::model::{ContentBlock, Document, ListItem, TableBlock};

const TABLE_PREFIX: &str = "표: ";
const SUB_ITEM_PREFIX: &str = "- ";

pub fn flatten(blocks: &[ContentBlock]) -> String {
    let mut lines = Vec::new();
    render_blocks(blocks, &mut lines);
    lines.join("\n")
}

/// Whole-page text: each section title followed by its content, then any
/// unsectioned content.
pub fn flatten_document(doc: &Document) -> String {
    let mut lines = Vec::new();
    for section in &doc.sections {
        push_line(&mut lines, &section.title);
        render_blocks(&section.content, &mut lines);
    }
    render_blocks(&doc.unsectioned, &mut lines);
    lines.join("\n")
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_line(lines: &mut Vec<String>, text: &str) {
    let line = collapse_whitespace(text);
    if !line.is_empty() {
        lines.push(line);
    }
}

fn render_blocks(blocks: &[ContentBlock], lines: &mut Vec<String>) {
    for block in blocks {
        match block {
            ContentBlock::Paragraph { text } => push_line(lines, text),
            ContentBlock::List { items } => render_list(items, lines),
            ContentBlock::Table(table) => render_table(table, lines),
            ContentBlock::HighlightBox { items } => render_highlight(items, lines),
            ContentBlock::Image { alt, .. } => {
                if !alt.trim().is_empty() {
                    push_line(lines, &format!("[이미지: {}]", alt));
                }
            }
        }
    }
}

fn render_list(items: &[ListItem], lines: &mut Vec<String>) {
    for item in items {
        match item {
            ListItem::Simple { text, sub_items } => {
                push_line(lines, text);
                for sub in sub_items {
                    let sub_text = collapse_whitespace(sub.label());
                    if !sub_text.is_empty() {
                        lines.push(format!("{}{}", SUB_ITEM_PREFIX, sub_text));
                    }
                }
            }
            ListItem::Composite { title, content } => {
                push_line(lines, title);
                render_blocks(content, lines);
            }
        }
    }
}

fn render_highlight(items: &[ListItem], lines: &mut Vec<String>) {
    for item in items {
        match item {
            ListItem::Simple { text, .. } => push_line(lines, text),
            ListItem::Composite { title, content } => {
                push_line(lines, title);
                render_blocks(content, lines);
            }
        }
    }
}

fn render_table(table: &TableBlock, lines: &mut Vec<String>) {
    if let Some(caption) = table.caption.as_deref() {
        let caption = collapse_whitespace(caption);
        if !caption.is_empty() {
            lines.push(format!("{}{}", TABLE_PREFIX, caption));
        }
    }
    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| collapse_whitespace(&cell.text.joined()))
            .collect();
        if cells.iter().any(|c| !c.is_empty()) {
            lines.push(cells.join(" | "));
        }
    }
}
