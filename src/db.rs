use std::path::Path;

use anyhow::Result;
use rusqlite::{params, Connection};

use crate::aggregate::{Aggregate, RecordBase};

pub const TABLES: [&str; 5] = [
    "headings",
    "paragraphs",
    "list_items",
    "table_cells",
    "tab_summaries",
];

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS headings (
            id            INTEGER PRIMARY KEY,
            category_id   INTEGER,
            category_name TEXT,
            page_id       INTEGER,
            page_name     TEXT,
            tab_title     TEXT NOT NULL,
            tab_menu_id   INTEGER,
            heading_text  TEXT NOT NULL,
            heading_level INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_headings_page ON headings(category_id, page_id);

        CREATE TABLE IF NOT EXISTS paragraphs (
            id             INTEGER PRIMARY KEY,
            category_id    INTEGER,
            category_name  TEXT,
            page_id        INTEGER,
            page_name      TEXT,
            tab_title      TEXT NOT NULL,
            tab_menu_id    INTEGER,
            paragraph_id   INTEGER NOT NULL,
            paragraph_text TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_paragraphs_page ON paragraphs(category_id, page_id);

        CREATE TABLE IF NOT EXISTS list_items (
            id            INTEGER PRIMARY KEY,
            category_id   INTEGER,
            category_name TEXT,
            page_id       INTEGER,
            page_name     TEXT,
            tab_title     TEXT NOT NULL,
            tab_menu_id   INTEGER,
            list_id       INTEGER NOT NULL,
            list_kind     TEXT NOT NULL CHECK(list_kind IN ('list','highlight_box','sub_items')),
            item_id       INTEGER NOT NULL,
            depth         INTEGER NOT NULL,
            item_text     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_list_items_page ON list_items(category_id, page_id);

        CREATE TABLE IF NOT EXISTS table_cells (
            id            INTEGER PRIMARY KEY,
            category_id   INTEGER,
            category_name TEXT,
            page_id       INTEGER,
            page_name     TEXT,
            tab_title     TEXT NOT NULL,
            tab_menu_id   INTEGER,
            table_id      INTEGER NOT NULL,
            content_type  TEXT NOT NULL CHECK(content_type IN ('caption','header','data')),
            row_id        INTEGER NOT NULL,
            col_id        INTEGER NOT NULL,
            cell_text     TEXT NOT NULL,
            rowspan       INTEGER NOT NULL DEFAULT 1,
            colspan       INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_table_cells_page ON table_cells(category_id, page_id, table_id);

        CREATE TABLE IF NOT EXISTS tab_summaries (
            id               INTEGER PRIMARY KEY,
            category_id      INTEGER,
            category_name    TEXT,
            page_id          INTEGER,
            page_name        TEXT,
            tab_title        TEXT NOT NULL,
            tab_menu_id      INTEGER,
            page_title       TEXT NOT NULL,
            text_length      INTEGER NOT NULL,
            sections_count   INTEGER NOT NULL,
            headings_count   INTEGER NOT NULL,
            paragraphs_count INTEGER NOT NULL,
            lists_count      INTEGER NOT NULL,
            tables_count     INTEGER NOT NULL
        );
        ",
    )?;
    Ok(())
}

/// Replace the exported rows with `agg`, in one transaction.
pub fn save_aggregate(conn: &Connection, agg: &Aggregate) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for table in TABLES {
        tx.execute(&format!("DELETE FROM {}", table), [])?;
    }
    {
        const BASE_COLS: &str =
            "category_id, category_name, page_id, page_name, tab_title, tab_menu_id";

        let mut h_stmt = tx.prepare(&format!(
            "INSERT INTO headings ({}, heading_text, heading_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            BASE_COLS
        ))?;
        for h in &agg.headings {
            let b = base_params(&h.base);
            h_stmt.execute(params![b.0, b.1, b.2, b.3, b.4, b.5, h.heading_text, h.heading_level])?;
        }

        let mut p_stmt = tx.prepare(&format!(
            "INSERT INTO paragraphs ({}, paragraph_id, paragraph_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            BASE_COLS
        ))?;
        for p in &agg.paragraphs {
            let b = base_params(&p.base);
            p_stmt.execute(params![
                b.0, b.1, b.2, b.3, b.4, b.5, p.paragraph_id as i64, p.paragraph_text,
            ])?;
        }

        let mut l_stmt = tx.prepare(&format!(
            "INSERT INTO list_items ({}, list_id, list_kind, item_id, depth, item_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            BASE_COLS
        ))?;
        for l in &agg.list_items {
            let b = base_params(&l.base);
            l_stmt.execute(params![
                b.0, b.1, b.2, b.3, b.4, b.5,
                l.list_id as i64, l.list_kind.as_str(), l.item_id as i64, l.depth as i64, l.item_text,
            ])?;
        }

        let mut c_stmt = tx.prepare(&format!(
            "INSERT INTO table_cells
             ({}, table_id, content_type, row_id, col_id, cell_text, rowspan, colspan)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            BASE_COLS
        ))?;
        for c in &agg.table_cells {
            let b = base_params(&c.base);
            c_stmt.execute(params![
                b.0, b.1, b.2, b.3, b.4, b.5,
                c.table_id as i64, c.content_type.as_str(), c.row_id as i64, c.col_id as i64,
                c.cell_text, c.rowspan, c.colspan,
            ])?;
        }

        let mut t_stmt = tx.prepare(&format!(
            "INSERT INTO tab_summaries
             ({}, page_title, text_length, sections_count, headings_count,
              paragraphs_count, lists_count, tables_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            BASE_COLS
        ))?;
        for t in &agg.tabs {
            let b = base_params(&t.base);
            t_stmt.execute(params![
                b.0, b.1, b.2, b.3, b.4, b.5,
                t.page_title, t.text_length as i64, t.sections_count as i64,
                t.headings_count as i64, t.paragraphs_count as i64,
                t.lists_count as i64, t.tables_count as i64,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

type BaseParams<'a> = (
    Option<i64>,
    Option<&'a str>,
    Option<i64>,
    Option<&'a str>,
    &'a str,
    Option<i64>,
);

fn base_params(base: &RecordBase) -> BaseParams<'_> {
    (
        base.category_id,
        base.category_name.as_deref(),
        base.page_id,
        base.page_name.as_deref(),
        base.tab_title.as_str(),
        base.tab_menu_id,
    )
}

/// Row count per exported table, in `TABLES` order.
pub fn table_counts(conn: &Connection) -> Result<Vec<(&'static str, usize)>> {
    TABLES
        .iter()
        .map(|&table| -> Result<(&'static str, usize)> {
            let n: usize =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok((table, n))
        })
        .collect()
}
