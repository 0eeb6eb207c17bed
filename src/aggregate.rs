//! Flat per-type projection of Documents for tabular export.
//!
//! Every record is derived from the hierarchical Document; text fields are
//! whitespace-collapsed copies of model text and carry the page/tab identity
//! of their Document.

use serde::Serialize;

use crate::config::Settings;
use crate::flatten::{collapse_whitespace, flatten_document};
use crate::identity::menu_id_from_href;
use crate::model::{ContentBlock, Document, ListItem, TableBlock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordBase {
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub page_id: Option<i64>,
    pub page_name: Option<String>,
    pub tab_title: String,
    pub tab_menu_id: Option<i64>,
}

impl RecordBase {
    /// Tab title is the selected tab's label, else the page name.
    pub fn of(doc: &Document) -> Self {
        let selected = doc.selected_tab();
        RecordBase {
            category_id: doc.category_id(),
            category_name: doc.category_name().map(str::to_string),
            page_id: doc.page_id(),
            page_name: doc.page_name().map(str::to_string),
            tab_title: selected
                .map(|t| t.label.clone())
                .or_else(|| doc.page_name().map(str::to_string))
                .unwrap_or_default(),
            tab_menu_id: selected.and_then(|t| menu_id_from_href(&t.href)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRecord {
    #[serde(flatten)]
    pub base: RecordBase,
    pub heading_text: String,
    /// Section titles are level 1; each composite item adds one level.
    pub heading_level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphRecord {
    #[serde(flatten)]
    pub base: RecordBase,
    pub paragraph_id: usize,
    pub paragraph_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    List,
    HighlightBox,
    SubItems,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::List => "list",
            ListKind::HighlightBox => "highlight_box",
            ListKind::SubItems => "sub_items",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItemRecord {
    #[serde(flatten)]
    pub base: RecordBase,
    pub list_id: usize,
    pub list_kind: ListKind,
    pub item_id: usize,
    pub depth: usize,
    pub item_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellRole {
    Caption,
    Header,
    Data,
}

impl CellRole {
    pub fn as_str(self) -> &'static str {
        match self {
            CellRole::Caption => "caption",
            CellRole::Header => "header",
            CellRole::Data => "data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCellRecord {
    #[serde(flatten)]
    pub base: RecordBase,
    pub table_id: usize,
    pub content_type: CellRole,
    pub row_id: usize,
    pub col_id: usize,
    pub cell_text: String,
    pub rowspan: u32,
    pub colspan: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabSummaryRecord {
    #[serde(flatten)]
    pub base: RecordBase,
    pub page_title: String,
    pub text_length: usize,
    pub sections_count: usize,
    pub headings_count: usize,
    pub paragraphs_count: usize,
    pub lists_count: usize,
    pub tables_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub headings: Vec<HeadingRecord>,
    pub paragraphs: Vec<ParagraphRecord>,
    pub list_items: Vec<ListItemRecord>,
    pub table_cells: Vec<TableCellRecord>,
    pub tabs: Vec<TabSummaryRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Paragraphs with fewer characters are not emitted.
    pub min_paragraph_chars: usize,
    /// Treat the first body row of a headerless table as its header row.
    pub promote_header_row: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        AggregateOptions::from(&Settings::default())
    }
}

impl From<&Settings> for AggregateOptions {
    fn from(settings: &Settings) -> Self {
        AggregateOptions {
            min_paragraph_chars: settings.min_paragraph_chars,
            promote_header_row: settings.promote_header_row,
        }
    }
}

pub fn project(docs: &[Document], opts: &AggregateOptions) -> Aggregate {
    let mut out = Aggregate::default();
    for doc in docs {
        project_document(doc, opts, &mut out);
    }
    out
}

fn project_document(doc: &Document, opts: &AggregateOptions, out: &mut Aggregate) {
    let mut walker = Walker {
        out,
        opts,
        base: RecordBase::of(doc),
        headings: 0,
        paragraphs: 0,
        lists: 0,
        tables: 0,
    };
    for section in &doc.sections {
        walker.heading(&section.title, 1);
        walker.blocks(&section.content, 1, 0);
    }
    walker.blocks(&doc.unsectioned, 0, 0);

    let summary = TabSummaryRecord {
        base: walker.base.clone(),
        page_title: doc.title.clone(),
        text_length: flatten_document(doc).chars().count(),
        sections_count: doc.sections.len(),
        headings_count: walker.headings,
        paragraphs_count: walker.paragraphs,
        lists_count: walker.lists,
        tables_count: walker.tables,
    };
    walker.out.tabs.push(summary);
}

struct Walker<'a> {
    out: &'a mut Aggregate,
    opts: &'a AggregateOptions,
    base: RecordBase,
    headings: usize,
    paragraphs: usize,
    lists: usize,
    tables: usize,
}

impl Walker<'_> {
    fn heading(&mut self, text: &str, level: u32) {
        let text = collapse_whitespace(text);
        if text.is_empty() {
            return;
        }
        self.headings += 1;
        self.out.headings.push(HeadingRecord {
            base: self.base.clone(),
            heading_text: text,
            heading_level: level,
        });
    }

    fn blocks(&mut self, blocks: &[ContentBlock], level: u32, depth: usize) {
        for block in blocks {
            match block {
                ContentBlock::Paragraph { text } => self.paragraph(text),
                ContentBlock::List { items } => self.list(items, ListKind::List, level, depth),
                ContentBlock::HighlightBox { items } => {
                    self.list(items, ListKind::HighlightBox, level, depth)
                }
                ContentBlock::Table(table) => self.table(table),
                ContentBlock::Image { .. } => {}
            }
        }
    }

    fn paragraph(&mut self, text: &str) {
        let text = collapse_whitespace(text);
        if text.chars().count() < self.opts.min_paragraph_chars.max(1) {
            return;
        }
        self.paragraphs += 1;
        self.out.paragraphs.push(ParagraphRecord {
            base: self.base.clone(),
            paragraph_id: self.paragraphs,
            paragraph_text: text,
        });
    }

    fn list(&mut self, items: &[ListItem], kind: ListKind, level: u32, depth: usize) {
        if items.is_empty() {
            return;
        }
        self.lists += 1;
        let list_id = self.lists;
        for (idx, item) in items.iter().enumerate() {
            self.out.list_items.push(ListItemRecord {
                base: self.base.clone(),
                list_id,
                list_kind: kind,
                item_id: idx + 1,
                depth,
                item_text: collapse_whitespace(item.label()),
            });
            match item {
                ListItem::Simple { sub_items, .. } => {
                    self.list(sub_items, ListKind::SubItems, level, depth + 1)
                }
                ListItem::Composite { title, content } => {
                    self.heading(title, level + 1);
                    self.blocks(content, level + 1, depth + 1);
                }
            }
        }
    }

    fn table(&mut self, table: &TableBlock) {
        self.tables += 1;
        let table_id = self.tables;

        if let Some(caption) = table.caption.as_deref() {
            let caption = collapse_whitespace(caption);
            if !caption.is_empty() {
                self.cell(table_id, CellRole::Caption, 0, 0, caption, 1, 1);
            }
        }

        let promote = self.opts.promote_header_row && table.headers.is_empty();
        let (header_rows, data_rows) = if promote && !table.rows.is_empty() {
            (&table.rows[..1], &table.rows[1..])
        } else {
            (&table.headers[..], &table.rows[..])
        };

        for (r, row) in header_rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let text = collapse_whitespace(&cell.text.joined());
                self.cell(
                    table_id,
                    CellRole::Header,
                    r + 1,
                    c + 1,
                    text,
                    cell.rowspan,
                    cell.colspan,
                );
            }
        }
        let offset = header_rows.len();
        for (r, row) in data_rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let text = collapse_whitespace(&cell.text.joined());
                self.cell(
                    table_id,
                    CellRole::Data,
                    offset + r + 1,
                    c + 1,
                    text,
                    cell.rowspan,
                    cell.colspan,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cell(
        &mut self,
        table_id: usize,
        role: CellRole,
        row_id: usize,
        col_id: usize,
        cell_text: String,
        rowspan: u32,
        colspan: u32,
    ) {
        self.out.table_cells.push(TableCellRecord {
            base: self.base.clone(),
            table_id,
            content_type: role,
            row_id,
            col_id,
            cell_text,
            rowspan,
            colspan,
        });
    }
}
