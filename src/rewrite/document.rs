// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Mutable HTML document wrapping scraper (html5ever)
//!
//! Each retrieval attempt parses its own `Document`, rewrites it in place
//! and serializes it back to text. The tree is never shared.

use ego_tree::NodeId;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// How many leading bytes are inspected for binary content
const SNIFF_LEN: usize = 1024;

/// The body could not be interpreted as HTML
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse HTML: {reason}")]
pub struct ParseError {
    pub reason: String,
}

/// A parsed page, mutated in place by the rewriter
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse decoded response bytes
    ///
    /// html5ever accepts any text, so the only failure is a body that is
    /// plainly binary (for instance a compressed payload that could not be
    /// decoded).
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let window = &bytes[..bytes.len().min(SNIFF_LEN)];
        if window.contains(&0) {
            return Err(ParseError {
                reason: "body is binary, not HTML".to_string(),
            });
        }

        let text = String::from_utf8_lossy(bytes);
        Ok(Self::from_html(&text))
    }

    pub fn from_html(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Concatenated text content of the whole document
    pub fn text(&self) -> String {
        self.html.root_element().text().collect()
    }

    /// Serialize the document back to HTML
    pub fn to_html(&self) -> String {
        self.html.html()
    }

    /// Ids of every element matching a selector, in document order
    pub(crate) fn select_ids(&self, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Ok(selector) => self.html.select(&selector).map(|el| el.id()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Ids of descendants of `id` matching a selector
    pub(crate) fn select_within(&self, id: NodeId, selector: &str) -> Vec<NodeId> {
        let (Some(element), Ok(selector)) = (self.element(id), Selector::parse(selector)) else {
            return Vec::new();
        };
        element.select(&selector).map(|el| el.id()).collect()
    }

    pub(crate) fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.element(id)
            .and_then(|el| el.value().attr(name))
            .map(str::to_string)
    }

    /// Apply an edit to an element's attribute list
    ///
    /// The element is rebuilt only when the edit actually changed something.
    pub(crate) fn edit_attrs<F>(&mut self, id: NodeId, edit: F)
    where
        F: FnOnce(&mut Vec<(String, String)>),
    {
        let Some(element) = self.element(id) else {
            return;
        };
        let name = element.value().name.clone();
        let original: Vec<(String, String)> = element
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut attrs = original.clone();
        edit(&mut attrs);
        if attrs == original {
            return;
        }

        if let Some(mut node) = self.html.tree.get_mut(id) {
            *node.value() = Node::Element(build_element(name, &attrs));
        }
    }

    /// Detach an element (and its subtree) from the document
    pub(crate) fn remove(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Append a new HTML element as the last child of `parent`
    pub(crate) fn append_element(&mut self, parent: NodeId, name: &str, attrs: &[(String, String)]) {
        let qual = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(name));
        if let Some(mut node) = self.html.tree.get_mut(parent) {
            node.append(Node::Element(build_element(qual, attrs)));
        }
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }
}

fn build_element(name: QualName, attrs: &[(String, String)]) -> Element {
    let attributes = attrs
        .iter()
        .map(|(key, value)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(key.as_str())),
            value: StrTendril::from(value.as_str()),
        })
        .collect();
    Element::new(name, attributes)
}

/// Set an attribute in an attribute list, replacing any existing value
pub(crate) fn set_attr(attrs: &mut Vec<(String, String)>, name: &str, value: String) {
    match attrs.iter_mut().find(|(k, _)| k == name) {
        Some(entry) => entry.1 = value,
        None => attrs.push((name.to_string(), value)),
    }
}

/// Remove an attribute from an attribute list
pub(crate) fn take_attr(attrs: &mut Vec<(String, String)>, name: &str) -> Option<String> {
    let pos = attrs.iter().position(|(k, _)| k == name)?;
    Some(attrs.remove(pos).1)
}

pub(crate) fn get_attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}
