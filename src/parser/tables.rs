use scraper::ElementRef;

use super::markup::{element_children, find_descendant, is_tag, span_attr, text_of};
use crate::model::{Cell, CellText, TableBlock};

/// Extract caption, header matrix and body matrix from a `table` element.
///
/// Only the table's own row groups are read, so rows of nested tables never
/// leak into the outer matrices. A headerless table keeps `headers` empty;
/// promoting the first row is left to consumers.
pub fn extract_table(table: ElementRef<'_>) -> TableBlock {
    let caption = element_children(table)
        .find(|c| is_tag(*c, "caption"))
        .map(text_of);

    let headers = element_children(table)
        .filter(|g| is_tag(*g, "thead"))
        .flat_map(rows_of)
        .map(header_row)
        .collect();

    let bodies: Vec<_> = element_children(table)
        .filter(|g| is_tag(*g, "tbody"))
        .collect();
    let body_rows: Vec<ElementRef<'_>> = if bodies.is_empty() {
        rows_of(table).collect()
    } else {
        bodies.into_iter().flat_map(rows_of).collect()
    };
    let rows = body_rows.into_iter().map(body_row).collect();

    TableBlock {
        caption,
        headers,
        rows,
    }
}

fn rows_of<'a>(group: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element_children(group).filter(|r| is_tag(*r, "tr"))
}

fn cells_of<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element_children(row).filter(|c| is_tag(*c, "th") || is_tag(*c, "td"))
}

fn header_row(tr: ElementRef<'_>) -> Vec<Cell> {
    cells_of(tr)
        .map(|cell| Cell {
            text: CellText::Text(text_of(cell)),
            is_header: true,
            rowspan: span_attr(cell, "rowspan"),
            colspan: span_attr(cell, "colspan"),
        })
        .collect()
}

fn body_row(tr: ElementRef<'_>) -> Vec<Cell> {
    cells_of(tr)
        .map(|cell| Cell {
            text: cell_text(cell),
            is_header: is_tag(cell, "th"),
            rowspan: span_attr(cell, "rowspan"),
            colspan: span_attr(cell, "colspan"),
        })
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> CellText {
    if find_descendant(cell, |e| is_tag(e, "li")).is_none() {
        return CellText::Text(text_of(cell));
    }
    CellText::Items(
        cell.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|e| is_tag(*e, "li"))
            .map(text_of)
            .collect(),
    )
}
