//! Interaction and conversion detection.
//!
//! The host page reports a click as the clicked element plus its ancestor
//! chain, and a submit as the form element. Detectors look for the closest
//! element matching a conversion signature, the way delegated document
//! listeners do.

mod detector;

pub use detector::{Conversion, InteractionDetector};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot of a DOM element as seen by the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Text content, including descendants.
    #[serde(default)]
    pub text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// The `href` attribute of a link element; other elements have none.
    pub fn link_href(&self) -> Option<&str> {
        if self.is("a") || self.is("area") {
            self.attr("href").map(str::trim).filter(|href| !href.is_empty())
        } else {
            None
        }
    }
}

/// The clicked element followed by its ancestors, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickTarget {
    path: Vec<Element>,
}

impl ClickTarget {
    pub fn new(target: Element) -> Self {
        Self { path: vec![target] }
    }

    pub fn from_path(path: Vec<Element>) -> Self {
        Self { path }
    }

    pub fn with_ancestor(mut self, ancestor: Element) -> Self {
        self.path.push(ancestor);
        self
    }

    pub fn target(&self) -> Option<&Element> {
        self.path.first()
    }

    /// The innermost element, starting at the target, matching `predicate`.
    pub fn closest(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        self.path.iter().find(|element| predicate(element))
    }
}
