use ego_tree::NodeId;
use maud::{html, PreEscaped, DOCTYPE};
use scraper::{ElementRef, Html};

use crate::dom;

const BODY_STYLE: &str = "body { margin: 24px; }";

/// Build the standalone snapshot document.
///
/// The head keeps the stylesheet links from the original `<head>` and the body
/// holds the content region followed by every `<script src>` left in the page
/// outside that region. Links and scripts with a blank source are left out.
/// Run this after localization so that only rewritten references remain.
pub fn assemble(document: &Html, region: NodeId, title: &str) -> String {
    let stylesheets: Vec<String> = document
        .select(&dom::selector(r#"head link[rel~="stylesheet"]"#))
        .filter(|e| has_source(e, "href"))
        .map(|e| e.html())
        .collect();

    let scripts: Vec<String> = document
        .select(&dom::selector("script[src]"))
        .filter(|e| has_source(e, "src"))
        .filter(|e| !dom::is_descendant_of(document, e.id(), region))
        .map(|e| e.html())
        .collect();

    let content = dom::outer_html(document, region).unwrap_or_default();

    let markup = html! {
        (DOCTYPE)
        html lang="fr" {
            head {
                meta charset="UTF-8";
                title { (title) }
                @for link in &stylesheets {
                    (PreEscaped(link))
                }
                style { (PreEscaped(BODY_STYLE)) }
            }
            body {
                (PreEscaped(content))
                @for script in &scripts {
                    (PreEscaped(script))
                }
            }
        }
    };

    markup.into_string()
}

fn has_source(element: &ElementRef<'_>, attr: &str) -> bool {
    element
        .value()
        .attr(attr)
        .is_some_and(|value| !value.trim().is_empty())
}

/// Document written when the page has no recognizable entry.
pub fn placeholder_document(input: &str) -> String {
    html! {
        (DOCTYPE)
        html lang="fr" {
            head {
                meta charset="UTF-8";
                title { "No entry found" }
            }
            body {
                p { "No article found for '" (input) "'." }
            }
        }
    }
    .into_string()
}
