use ego_tree::NodeId;
use scraper::Html;

use crate::dom;

/// Where the entry lives on the page, most specific first.
///
/// 1. the bilingual article container
/// 2. the combined French/English content block
/// 3. any `<article>`
pub const CONTENT_SELECTORS: [&str; 3] = ["article.article_bilingue", "div.content.fr-en", "article"];

/// Locate the entry's content region. The first selector with a match wins.
pub fn find_content_region(document: &Html) -> Option<NodeId> {
    CONTENT_SELECTORS.iter().find_map(|css| {
        let found = document.select(&dom::selector(css)).next().map(|e| e.id());
        if found.is_some() {
            tracing::debug!(selector = css, "Matched content region");
        }
        found
    })
}

/// Text of the page's `<title>`, trimmed; `None` if missing or blank.
pub fn page_title(document: &Html) -> Option<String> {
    let title = document.select(&dom::selector("title")).next()?;
    let text = title.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}
