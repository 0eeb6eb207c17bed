//! Loading crawler output: `<input>/<category_dir>/<page>.html`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::batch::PageInput;

const PAGE_EXTENSION: &str = "html";

/// Every `*.html` page one level below each category directory of `root`,
/// in name order. Loose files in `root` are ignored.
pub fn load_pages(root: &Path) -> Result<Vec<PageInput>> {
    let mut pages = Vec::new();
    for category_dir in sorted_entries(root)? {
        if !category_dir.is_dir() {
            continue;
        }
        let category = file_name(&category_dir);
        for path in sorted_entries(&category_dir)? {
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(PAGE_EXTENSION)
            {
                debug!(path = %path.display(), "not a page file");
                continue;
            }
            let markup =
                fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            pages.push(PageInput {
                category: category.clone(),
                file: file_name(&path),
                markup,
            });
        }
    }
    Ok(pages)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("listing {}", dir.display()))?;
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_fixture_crawl() {
        let pages = load_pages(Path::new("tests/fixtures")).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| format!("{}/{}", p.category, p.file))
            .collect();
        assert_eq!(
            names,
            [
                "287_이른둥이/1_이른둥이란.html",
                "287_이른둥이/2_의료비_지원.html",
                "290_육아정보/2_안내.html",
            ]
        );
        assert!(pages.iter().all(|p| !p.markup.is_empty()));
    }

    #[test]
    fn skips_non_pages() {
        let dir = tempfile::tempdir().unwrap();
        let cat = dir.path().join("3_보육");
        fs::create_dir(&cat).unwrap();
        fs::write(cat.join("1_안내.html"), "<p>x</p>").unwrap();
        fs::write(cat.join("notes.txt"), "skip").unwrap();
        fs::write(dir.path().join("index.html"), "<p>loose</p>").unwrap();

        let pages = load_pages(dir.path()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].category, "3_보육");
        assert_eq!(pages[0].file, "1_안내.html");
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_pages(&dir.path().join("absent")).is_err());
    }
}
