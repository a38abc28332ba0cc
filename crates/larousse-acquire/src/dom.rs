//! In-place edits on a parsed `scraper::Html` tree.
//!
//! `scraper` exposes the underlying `ego_tree` directly, so passes collect the
//! node ids they care about first and then mutate through `tree.get_mut`.

use ego_tree::NodeId;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Ids of elements matching `sel`, in document order.
///
/// With a `scope`, only descendants of that element are considered.
pub fn select_ids(document: &Html, scope: Option<NodeId>, sel: &Selector) -> Vec<NodeId> {
    match scope.and_then(|id| element_ref(document, id)) {
        Some(root) => root.select(sel).map(|e| e.id()).collect(),
        None if scope.is_some() => Vec::new(),
        None => document.select(sel).map(|e| e.id()).collect(),
    }
}

pub fn element_ref(document: &Html, id: NodeId) -> Option<ElementRef<'_>> {
    document.tree.get(id).and_then(ElementRef::wrap)
}

pub fn attr<'a>(document: &'a Html, id: NodeId, name: &str) -> Option<&'a str> {
    element_ref(document, id).and_then(|e| e.value().attr(name))
}

/// Outer HTML of an element, or `None` if it was detached or is not an element.
pub fn outer_html(document: &Html, id: NodeId) -> Option<String> {
    element_ref(document, id).map(|e| e.html())
}

/// Whether `id` sits below `ancestor` in the tree.
pub fn is_descendant_of(document: &Html, id: NodeId, ancestor: NodeId) -> bool {
    document
        .tree
        .get(id)
        .map(|node| node.ancestors().any(|a| a.id() == ancestor))
        .unwrap_or(false)
}

/// Remove an element (and its subtree) from the document.
pub fn detach(document: &mut Html, id: NodeId) {
    if let Some(mut node) = document.tree.get_mut(id) {
        node.detach();
    }
}

/// Rewrite an element's tag name and attributes in place, keeping its children.
///
/// `edit` receives the current tag name and attributes and may change either.
/// Returns false if `id` is not an element.
pub fn edit_element<F>(document: &mut Html, id: NodeId, edit: F) -> bool
where
    F: FnOnce(&mut String, &mut Vec<(String, String)>),
{
    let Some(mut node) = document.tree.get_mut(id) else {
        return false;
    };

    let Node::Element(element) = node.value() else {
        return false;
    };

    let mut name = element.name().to_string();
    let mut attrs: Vec<(String, String)> = element
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    edit(&mut name, &mut attrs);

    *element = new_element(&name, attrs);
    true
}

/// Put a new `name` element in place of `id` and move `id` inside it.
///
/// Returns the wrapper's id, or `None` if `id` is not in the tree.
pub fn wrap(document: &mut Html, id: NodeId, name: &str, attrs: Vec<(String, String)>) -> Option<NodeId> {
    let wrapper = document
        .tree
        .get_mut(id)?
        .insert_before(Node::Element(new_element(name, attrs)))
        .id();
    document.tree.get_mut(wrapper)?.append_id(id);
    Some(wrapper)
}

/// Elements that never have content, so renaming them would lose what they show.
pub fn is_void(document: &Html, id: NodeId) -> bool {
    const VOID: &[&str] = &[
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
        "track", "wbr",
    ];
    element_ref(document, id).is_some_and(|e| VOID.contains(&e.value().name()))
}

fn new_element(name: &str, attrs: Vec<(String, String)>) -> Element {
    let attributes = attrs
        .into_iter()
        .map(|(k, v)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(k.as_str())),
            value: v.into(),
        })
        .collect();
    let qual_name = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(name),
    );

    Element::new(qual_name, attributes)
}

/// Set (or add) one attribute.
pub fn set_attr(document: &mut Html, id: NodeId, key: &str, value: &str) -> bool {
    edit_element(document, id, |_, attrs| set_in(attrs, key, value))
}

pub fn set_in(attrs: &mut Vec<(String, String)>, key: &str, value: &str) {
    match attrs.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = value.to_string(),
        None => attrs.push((key.to_string(), value.to_string())),
    }
}

pub fn remove_in(attrs: &mut Vec<(String, String)>, keys: &[&str]) {
    attrs.retain(|(k, _)| !keys.contains(&k.as_str()));
}

/// Append a class to the `class` attribute unless it is already present.
pub fn add_class_in(attrs: &mut Vec<(String, String)>, class: &str) {
    match attrs.iter_mut().find(|(k, _)| k == "class") {
        Some((_, v)) if v.split_whitespace().any(|c| c == class) => {}
        Some((_, v)) if v.trim().is_empty() => *v = class.to_string(),
        Some((_, v)) => {
            v.push(' ');
            v.push_str(class);
        }
        None => attrs.push(("class".to_string(), class.to_string())),
    }
}
