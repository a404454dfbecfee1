use std::fmt;

use serde::{Deserialize, Serialize};
use xmltree::{Element, XMLNode};

use crate::constants::{FLAT_LOCATOR, FLAT_TAG, STRUCTURED_CONTAINER, STRUCTURED_FIELD, STRUCTURED_LOCATOR};

/// Rule for finding candidate fields in a document tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FieldLocator {
    /// Every element named `tag`, anywhere in the tree.
    /// Names match elements outside any XML namespace only.
    FlatScan { tag: String },
    /// The first direct child named `field` of every element named `container`
    StructuredScan { container: String, field: String },
}

impl FieldLocator {
    pub fn flat() -> Self {
        Self::FlatScan {
            tag: FLAT_TAG.to_string(),
        }
    }

    pub fn structured() -> Self {
        Self::StructuredScan {
            container: STRUCTURED_CONTAINER.to_string(),
            field: STRUCTURED_FIELD.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlatScan { .. } => FLAT_LOCATOR,
            Self::StructuredScan { .. } => STRUCTURED_LOCATOR,
        }
    }

    /// Call `visit` on each candidate element in document (pre-)order.
    pub fn for_each_candidate<F>(&self, root: &mut Element, visit: &mut F)
    where
        F: FnMut(&mut Element),
    {
        match self {
            Self::FlatScan { tag } => visit_matching(root, tag, visit),
            Self::StructuredScan { container, field } => {
                visit_matching(root, container, &mut |el: &mut Element| {
                    let child = el.children.iter_mut().find_map(|node| match node {
                        XMLNode::Element(child) if is_named(child, field) => Some(child),
                        _ => None,
                    });
                    if let Some(child) = child {
                        visit(child);
                    }
                })
            }
        }
    }
}

impl Default for FieldLocator {
    fn default() -> Self {
        Self::flat()
    }
}

impl fmt::Display for FieldLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlatScan { tag } => write!(f, "{} <{}>", FLAT_LOCATOR, tag),
            Self::StructuredScan { container, field } => {
                write!(f, "{} <{}>/<{}>", STRUCTURED_LOCATOR, container, field)
            }
        }
    }
}

/// Plain `name` with no namespace. `<b:Postnummer>` or `<Postnummer>` under a
/// default `xmlns` belong to another vocabulary and never match.
fn is_named(element: &Element, name: &str) -> bool {
    element.name == name && element.namespace.as_deref().map_or(true, str::is_empty)
}

/// Pre-order walk calling `visit` on every element named `name`, root included.
/// A matching element is visited before its descendants.
fn visit_matching<F>(element: &mut Element, name: &str, visit: &mut F)
where
    F: FnMut(&mut Element),
{
    if is_named(element, name) {
        visit(element);
    }
    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            visit_matching(child, name, visit);
        }
    }
}
