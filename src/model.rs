use serde::{Deserialize, Serialize};

/// `<integer>_<name>` identity parsed from a crawl directory or file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub name: String,
}

impl Identity {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Identity {
            id,
            name: name.into(),
        }
    }
}

/// One scraped page/tab. Built once by the assembler and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub category: Option<Identity>,
    pub page: Option<Identity>,
    pub title: String,
    pub tabs: Vec<Tab>,
    pub sections: Vec<Section>,
    /// Content of a page without section headings. Always empty when
    /// `sections` is not.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsectioned: Vec<ContentBlock>,
}

impl Document {
    pub fn selected_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.selected)
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub fn page_id(&self) -> Option<i64> {
        self.page.as_ref().map(|p| p.id)
    }

    pub fn page_name(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub label: String,
    pub href: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph { text: String },
    List { items: Vec<ListItem> },
    Table(TableBlock),
    Image { src: String, alt: String },
    HighlightBox { items: Vec<ListItem> },
}

impl ContentBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph { text: text.into() }
    }
}

/// A list entry. `Composite` iff the source `li` carried an emphasis marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListItem {
    Simple {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        sub_items: Vec<ListItem>,
    },
    Composite {
        title: String,
        content: Vec<ContentBlock>,
    },
}

impl ListItem {
    pub fn simple(text: impl Into<String>) -> Self {
        ListItem::Simple {
            text: text.into(),
            sub_items: Vec::new(),
        }
    }

    /// Leading text of the item: `text` for simple items, `title` otherwise.
    pub fn label(&self) -> &str {
        match self {
            ListItem::Simple { text, .. } => text,
            ListItem::Composite { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    pub caption: Option<String>,
    pub headers: Vec<Vec<Cell>>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub text: CellText,
    pub is_header: bool,
    pub rowspan: u32,
    pub colspan: u32,
}

/// Cell text; `Items` when the cell wraps its own list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellText {
    Text(String),
    Items(Vec<String>),
}

impl CellText {
    /// Single-line rendering; sub-list entries are joined with `", "`.
    pub fn joined(&self) -> String {
        match self {
            CellText::Text(t) => t.clone(),
            CellText::Items(items) => items.join(", "),
        }
    }
}
