use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{ExtractError, Result};
use crate::model::Document;
use crate::parser::process_page;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

const CHUNK_SIZE: usize = 500;

/// Raw page as stored by the crawler: `<category>/<file>` plus its bytes.
#[derive(Debug, Clone)]
pub struct PageInput {
    pub category: String,
    pub file: String,
    pub markup: Vec<u8>,
}

#[derive(Debug)]
pub struct PageFailure {
    pub category: String,
    pub file: String,
    pub error: ExtractError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Sorted by category id, page id, then the raw identifiers.
    pub documents: Vec<Document>,
    pub failures: Vec<PageFailure>,
}

pub fn extract_page(input: &PageInput, settings: &Settings) -> Result<Document> {
    let markup = std::str::from_utf8(&input.markup)?;
    process_page(&input.category, &input.file, markup, settings)
}

pub fn process_batch(inputs: &[PageInput], settings: &Settings) -> Result<BatchOutcome> {
    process_batch_with(inputs, settings, |_| {})
}

/// Extract every page, calling `on_progress` with the size of each finished
/// chunk. A failing page is recorded and skipped; only an empty batch is an
/// error.
pub fn process_batch_with<F>(
    inputs: &[PageInput],
    settings: &Settings,
    on_progress: F,
) -> Result<BatchOutcome>
where
    F: Fn(usize),
{
    if inputs.is_empty() {
        return Err(ExtractError::NoPages);
    }

    let mut keyed = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();
    for chunk in inputs.chunks(CHUNK_SIZE) {
        for (input, result) in chunk.iter().zip(extract_chunk(chunk, settings)) {
            match result {
                Ok(doc) => {
                    let key = (
                        doc.category_id(),
                        doc.page_id(),
                        input.category.clone(),
                        input.file.clone(),
                    );
                    keyed.push((key, doc));
                }
                Err(error) => {
                    warn!(category = %input.category, file = %input.file, %error, "page skipped");
                    failures.push(PageFailure {
                        category: input.category.clone(),
                        file: input.file.clone(),
                        error,
                    });
                }
            }
        }
        on_progress(chunk.len());
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    failures.sort_by(|a, b| (&a.category, &a.file).cmp(&(&b.category, &b.file)));

    info!(
        pages = inputs.len(),
        documents = keyed.len(),
        failures = failures.len(),
        "batch extracted"
    );
    Ok(BatchOutcome {
        documents: keyed.into_iter().map(|(_, doc)| doc).collect(),
        failures,
    })
}

#[cfg(feature = "rayon")]
fn extract_chunk(chunk: &[PageInput], settings: &Settings) -> Vec<Result<Document>> {
    chunk.par_iter().map(|p| extract_page(p, settings)).collect()
}

#[cfg(not(feature = "rayon"))]
fn extract_chunk(chunk: &[PageInput], settings: &Settings) -> Vec<Result<Document>> {
    chunk.iter().map(|p| extract_page(p, settings)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn page(category: &str, file: &str, markup: &[u8]) -> PageInput {
        PageInput {
            category: category.into(),
            file: file.into(),
            markup: markup.to_vec(),
        }
    }

    fn section_page(title: &str) -> Vec<u8> {
        format!(r#"<h4 class="title_line">{}</h4><p>본문</p>"#, title).into_bytes()
    }

    #[test]
    fn bad_page_does_not_abort_batch() {
        let inputs = vec![
            page("287_이른둥이", "1_a.html", &section_page("하나")),
            page("287_이른둥이", "2_b.html", &[0x3c, 0x70, 0xff, 0xfe]),
            page("287_이른둥이", "3_c.html", &section_page("셋")),
        ];
        let outcome = process_batch(&inputs, &Settings::default()).unwrap();
        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file, "2_b.html");
        assert!(matches!(outcome.failures[0].error, ExtractError::InvalidEncoding(_)));
    }

    #[test]
    fn deep_nesting_is_a_page_failure() {
        let deep = format!(
            r#"<h4 class="title_line">T</h4>{}x{}"#,
            "<ul><li>".repeat(10),
            "</li></ul>".repeat(10)
        );
        let settings = Settings {
            max_depth: 4,
            ..Settings::default()
        };
        let inputs = vec![
            page("1_a", "1_deep.html", deep.as_bytes()),
            page("1_a", "2_ok.html", &section_page("ok")),
        ];
        let outcome = process_batch(&inputs, &settings).unwrap();
        assert_eq!(outcome.documents.len(), 1);
        assert!(matches!(
            outcome.failures[0].error,
            ExtractError::NestingTooDeep { limit: 4 }
        ));
    }

    #[test]
    fn output_is_sorted_by_identity() {
        let inputs = vec![
            page("290_육아정보", "1_a.html", &section_page("c")),
            page("287_이른둥이", "10_b.html", &section_page("b")),
            page("287_이른둥이", "2_a.html", &section_page("a")),
        ];
        let outcome = process_batch(&inputs, &Settings::default()).unwrap();
        let keys: Vec<_> = outcome
            .documents
            .iter()
            .map(|d| (d.category_id(), d.page_id()))
            .collect();
        assert_eq!(keys, [(Some(287), Some(2)), (Some(287), Some(10)), (Some(290), Some(1))]);
    }

    #[test]
    fn empty_batch_is_terminal() {
        assert!(matches!(
            process_batch(&[], &Settings::default()),
            Err(ExtractError::NoPages)
        ));
    }

    #[test]
    fn progress_sees_every_page() {
        let inputs: Vec<_> = (1..=3)
            .map(|i| page("1_a", &format!("{}_p.html", i), &section_page("t")))
            .collect();
        let seen = Cell::new(0);
        process_batch_with(&inputs, &Settings::default(), |n| seen.set(seen.get() + n)).unwrap();
        assert_eq!(seen.get(), 3);
    }
}
