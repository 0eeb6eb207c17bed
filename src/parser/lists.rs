use scraper::ElementRef;

use super::blocks::image_block;
use super::markup::{check_depth, element_children, is_list, is_tag, text_of};
use super::tables::extract_table;
use crate::config::Settings;
use crate::error::Result;
use crate::model::{ContentBlock, ListItem};

/// Unfold the direct `li` children of a `ul`/`ol`. Nested lists recurse with
/// `depth + 1`; the walk fails once `settings.max_depth` is exceeded.
pub fn extract_list(
    list: ElementRef<'_>,
    settings: &Settings,
    depth: usize,
) -> Result<Vec<ListItem>> {
    check_depth(depth, settings.max_depth)?;
    element_children(list)
        .filter(|c| is_tag(*c, "li"))
        .map(|li| extract_item(li, settings, depth))
        .collect()
}

fn extract_item(li: ElementRef<'_>, settings: &Settings, depth: usize) -> Result<ListItem> {
    match find_marker(li, &settings.emphasis_tag) {
        Some(marker) => composite_item(li, marker, settings, depth),
        None => simple_item(li, settings, depth),
    }
}

fn simple_item(li: ElementRef<'_>, settings: &Settings, depth: usize) -> Result<ListItem> {
    let mut sub_items = Vec::new();
    for nested in nested_lists(li) {
        sub_items.extend(extract_list(nested, settings, depth + 1)?);
    }
    Ok(ListItem::Simple {
        text: text_of(li),
        sub_items,
    })
}

fn composite_item(
    li: ElementRef<'_>,
    marker: ElementRef<'_>,
    settings: &Settings,
    depth: usize,
) -> Result<ListItem> {
    let mut content = Vec::new();
    collect_item_blocks(li, marker, settings, depth + 1, &mut content)?;

    if content.is_empty() {
        let rest = without_marker(li, marker);
        if !rest.is_empty() {
            content.push(ContentBlock::paragraph(rest));
        }
    }

    Ok(ListItem::Composite {
        title: text_of(marker),
        content,
    })
}

/// Emphasis marker of an item: the first matching element reachable without
/// entering a nested list or table.
fn find_marker<'a>(li: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    let mut stack: Vec<ElementRef<'a>> = element_children(li).collect();
    stack.reverse();
    while let Some(el) = stack.pop() {
        if is_tag(el, tag) {
            return Some(el);
        }
        if is_list(el) || is_tag(el, "table") {
            continue;
        }
        let mark = stack.len();
        stack.extend(element_children(el));
        stack[mark..].reverse();
    }
    None
}

/// Paragraphs, nested lists, tables and images below a composite item, in
/// document order. Wrappers are walked through; the marker itself is skipped.
fn collect_item_blocks(
    el: ElementRef<'_>,
    marker: ElementRef<'_>,
    settings: &Settings,
    depth: usize,
    out: &mut Vec<ContentBlock>,
) -> Result<()> {
    check_depth(depth, settings.max_depth)?;
    for child in element_children(el) {
        if child.id() == marker.id() {
            continue;
        }
        if is_tag(child, "p") {
            if !contains(child, marker) {
                out.push(ContentBlock::paragraph(text_of(child)));
            } else {
                let rest = without_marker(child, marker);
                if !rest.is_empty() {
                    out.push(ContentBlock::paragraph(rest));
                }
            }
        } else if is_list(child) {
            out.push(ContentBlock::List {
                items: extract_list(child, settings, depth)?,
            });
        } else if is_tag(child, "table") {
            out.push(ContentBlock::Table(extract_table(child)));
        } else if is_tag(child, "img") {
            out.push(image_block(child));
        } else {
            collect_item_blocks(child, marker, settings, depth + 1, out)?;
        }
    }
    Ok(())
}

fn contains(outer: ElementRef<'_>, inner: ElementRef<'_>) -> bool {
    inner.ancestors().any(|a| a.id() == outer.id())
}

/// Text of `el` with the marker's text removed once, trimmed.
fn without_marker(el: ElementRef<'_>, marker: ElementRef<'_>) -> String {
    let full: String = el.text().collect();
    let marker_text: String = marker.text().collect();
    full.replacen(&marker_text, "", 1).trim().to_string()
}

/// Lists below `li` that are not nested inside another of its lists.
fn nested_lists<'a>(li: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    li.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| {
            is_list(*el)
                && !el
                    .ancestors()
                    .take_while(|a| a.id() != li.id())
                    .filter_map(ElementRef::wrap)
                    .any(is_list)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::parser::markup::find_descendant;
    use scraper::Html;

    fn items_of(markup: &str) -> Vec<ListItem> {
        items_with(markup, &Settings::default())
    }

    fn items_with(markup: &str, settings: &Settings) -> Vec<ListItem> {
        let html = Html::parse_fragment(markup);
        let list = find_descendant(html.root_element(), is_list).unwrap();
        extract_list(list, settings, 0).unwrap()
    }

    #[test]
    fn plain_items() {
        let items = items_of("<ul><li> a </li><li>b</li></ul>");
        assert_eq!(items, vec![ListItem::simple("a"), ListItem::simple("b")]);
    }

    #[test]
    fn composite_with_paragraph() {
        let items = items_of(r#"<ul><li><strong>제목</strong><p class="txt">내용</p></li></ul>"#);
        assert_eq!(
            items,
            vec![ListItem::Composite {
                title: "제목".into(),
                content: vec![ContentBlock::paragraph("내용")],
            }]
        );
    }

    #[test]
    fn composite_falls_back_to_remaining_text() {
        let items = items_of("<ul><li><strong>신청기간</strong> 출생일로부터 60일 이내</li></ul>");
        match &items[0] {
            ListItem::Composite { title, content } => {
                assert_eq!(title, "신청기간");
                assert_eq!(
                    content,
                    &vec![ContentBlock::paragraph("출생일로부터 60일 이내")]
                );
            }
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn composite_without_extra_text_has_no_content() {
        let items = items_of("<ul><li><strong>단독</strong></li></ul>");
        assert!(matches!(&items[0], ListItem::Composite { content, .. } if content.is_empty()));
    }

    #[test]
    fn composite_blocks_in_document_order() {
        let items = items_of(
            r#"<ul><li><strong>서류</strong>
                 <div class="img"><img src="a.png" alt="서식"></div>
                 <p>첫째</p>
                 <ul><li>하위</li></ul>
                 <table><tr><td>셀</td></tr></table>
               </li></ul>"#,
        );
        let ListItem::Composite { content, .. } = &items[0] else {
            panic!("expected composite");
        };
        let kinds: Vec<_> = content
            .iter()
            .map(|b| match b {
                ContentBlock::Paragraph { .. } => "p",
                ContentBlock::List { .. } => "list",
                ContentBlock::Table(_) => "table",
                ContentBlock::Image { .. } => "img",
                ContentBlock::HighlightBox { .. } => "box",
            })
            .collect();
        assert_eq!(kinds, ["img", "p", "list", "table"]);
    }

    #[test]
    fn marker_inside_nested_list_does_not_promote_parent() {
        let items = items_of("<ul><li>상위<ul><li><strong>하위 제목</strong></li></ul></li></ul>");
        match &items[0] {
            ListItem::Simple { text, sub_items } => {
                assert!(text.starts_with("상위"));
                assert_eq!(sub_items.len(), 1);
                assert!(matches!(
                    &sub_items[0],
                    ListItem::Composite { title, .. } if title == "하위 제목"
                ));
            }
            other => panic!("expected simple, got {:?}", other),
        }
    }

    #[test]
    fn marker_wrapped_in_paragraph() {
        let items = items_of("<ul><li><p><strong>제목</strong></p><p>본문</p></li></ul>");
        assert_eq!(
            items[0],
            ListItem::Composite {
                title: "제목".into(),
                content: vec![ContentBlock::paragraph("본문")],
            }
        );
    }

    #[test]
    fn marker_paragraph_keeps_its_other_text() {
        let items = items_of(
            "<ul><li><p><strong>신청방법</strong> 주민센터 방문 신청</p><ul><li>신분증</li></ul></li></ul>",
        );
        assert_eq!(
            items[0],
            ListItem::Composite {
                title: "신청방법".into(),
                content: vec![
                    ContentBlock::paragraph("주민센터 방문 신청"),
                    ContentBlock::List {
                        items: vec![ListItem::simple("신분증")],
                    },
                ],
            }
        );
    }

    #[test]
    fn every_nested_list_becomes_sub_items() {
        let items = items_of("<ul><li>준비물<ul><li>a</li></ul><ul><li>b<ol><li>c</li></ol></li></ul></li></ul>");
        let ListItem::Simple { sub_items, .. } = &items[0] else {
            panic!("expected simple");
        };
        let labels: Vec<_> = sub_items.iter().map(|i| i.label()).collect();
        assert_eq!(labels, ["a", "bc"]);
        let ListItem::Simple { sub_items: inner, .. } = &sub_items[1] else {
            panic!("expected simple");
        };
        assert_eq!(inner, &vec![ListItem::simple("c")]);
    }

    #[test]
    fn simple_item_with_sub_items() {
        let items = items_of("<ol><li>준비물<ul><li>신분증</li><li>통장</li></ul></li></ol>");
        let ListItem::Simple { sub_items, .. } = &items[0] else {
            panic!("expected simple");
        };
        assert_eq!(sub_items, &vec![ListItem::simple("신분증"), ListItem::simple("통장")]);
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut markup = String::new();
        for _ in 0..6 {
            markup.push_str("<ul><li>x");
        }
        for _ in 0..6 {
            markup.push_str("</li></ul>");
        }
        let html = Html::parse_fragment(&markup);
        let list = find_descendant(html.root_element(), is_list).unwrap();
        let settings = Settings {
            max_depth: 3,
            ..Settings::default()
        };
        assert!(matches!(
            extract_list(list, &settings, 0),
            Err(ExtractError::NestingTooDeep { limit: 3 })
        ));
        assert!(!items_with(&markup, &Settings::default()).is_empty());
    }
}
