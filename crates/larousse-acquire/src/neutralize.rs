use ego_tree::NodeId;
use scraper::Html;

use crate::dom;

/// Attributes that make an element navigable.
const NAVIGATION_ATTRS: [&str; 2] = ["href", "target"];

/// Turn every `<a>` inside `region` into an inert `<span>`.
///
/// Children and remaining attributes are kept so the text and styling stay the
/// same; only the ability to navigate away is removed. Returns how many links
/// were converted.
pub fn neutralize_links(document: &mut Html, region: NodeId) -> usize {
    let links = dom::select_ids(document, Some(region), &dom::selector("a"));

    let mut converted = 0;
    for id in links {
        let done = dom::edit_element(document, id, |name, attrs| {
            *name = "span".to_string();
            dom::remove_in(attrs, &NAVIGATION_ATTRS);
        });
        if done {
            converted += 1;
        }
    }

    tracing::debug!(links = converted, "Neutralized links");
    converted
}
