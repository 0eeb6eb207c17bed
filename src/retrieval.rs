//! Per-section feed for the retrieval index.

use serde::Serialize;

use crate::flatten::flatten;
use crate::identity::menu_id_from_href;
use crate::model::Document;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexMetadata {
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub page_id: Option<i64>,
    pub page_name: Option<String>,
    pub page_title: String,
    pub selected_tab: Option<String>,
    pub tab_menu_id: Option<i64>,
    pub section_title: String,
    /// `<category_name>/<page_title>/<section_title>`
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRecord {
    /// Stable key: `<category_id>-<page_id>-<section_index>`.
    pub id: String,
    pub text: String,
    pub metadata: IndexMetadata,
}

/// One record per section with non-empty flattened text, in section order.
pub fn index_records(doc: &Document) -> Vec<IndexRecord> {
    let selected = doc.selected_tab();
    let category_key = key_part(doc.category_id());
    let page_key = key_part(doc.page_id());

    doc.sections
        .iter()
        .enumerate()
        .filter_map(|(idx, section)| {
            let text = flatten(&section.content);
            if text.is_empty() {
                return None;
            }
            let category_name = doc.category_name().unwrap_or_default();
            Some(IndexRecord {
                id: format!("{}-{}-{}", category_key, page_key, idx),
                text,
                metadata: IndexMetadata {
                    category_id: doc.category_id(),
                    category_name: doc.category_name().map(str::to_string),
                    page_id: doc.page_id(),
                    page_name: doc.page_name().map(str::to_string),
                    page_title: doc.title.clone(),
                    selected_tab: selected.map(|t| t.label.clone()),
                    tab_menu_id: selected.and_then(|t| menu_id_from_href(&t.href)),
                    section_title: section.title.clone(),
                    source: format!("{}/{}/{}", category_name, doc.title, section.title),
                },
            })
        })
        .collect()
}

fn key_part(id: Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_else(|| "x".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::parser::process_page;

    fn fixture_doc(dir: &str, file: &str) -> Document {
        let markup = std::fs::read_to_string(format!("tests/fixtures/{}/{}", dir, file)).unwrap();
        process_page(dir, file, &markup, &Settings::default()).unwrap()
    }

    #[test]
    fn empty_sections_are_left_out() {
        let doc = fixture_doc("287_이른둥이", "2_의료비_지원.html");
        assert_eq!(doc.sections.len(), 2);

        let records = index_records(&doc);
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.id, "287-2-0");
        assert_eq!(rec.text, "입원 및 외래 진료비 중 본인부담금을 지원합니다.");
        assert_eq!(rec.metadata.section_title, "지원 내용");
        assert_eq!(rec.metadata.selected_tab.as_deref(), Some("의료비 지원"));
        assert_eq!(rec.metadata.tab_menu_id, Some(288));
        assert_eq!(rec.metadata.source, "이른둥이/이른둥이/지원 내용");
    }

    #[test]
    fn ids_follow_section_positions() {
        let doc = fixture_doc("287_이른둥이", "1_이른둥이란.html");
        let ids: Vec<_> = index_records(&doc).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["287-1-0", "287-1-1", "287-1-2"]);
    }

    #[test]
    fn unmatched_identity_uses_placeholder() {
        let doc = process_page(
            "misc",
            "page.html",
            r#"<h4 class="title_line">A</h4><p>본문</p>"#,
            &Settings::default(),
        )
        .unwrap();
        let records = index_records(&doc);
        assert_eq!(records[0].id, "x-x-0");
        assert_eq!(records[0].metadata.category_id, None);
        assert_eq!(records[0].metadata.source, "//A");
    }
}
