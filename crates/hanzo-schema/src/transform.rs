//! Schema rewriting for model-facing requests
//!
//! Models regularly produce URLs that are right in substance but fail strict
//! URL parsing (relative links, stray escapes, long query strings). The schema
//! handed to a model therefore drops the URL check; [`repair_urls`] and a final
//! validation against the original schema restore it afterwards.
//!
//! [`repair_urls`]: crate::repair_urls

use crate::types::{ArraySchema, ObjectSchema, Schema, SchemaNode, StringCheck, StringSchema};
use std::sync::Arc;

impl Schema {
    /// Same schema with every URL check relaxed to a plain string.
    ///
    /// Kinds, property names and order, other checks, and descriptions are
    /// kept at every level. Unchanged subtrees are shared with `self`.
    pub fn for_llm(&self) -> Schema {
        relax(self).unwrap_or_else(|| self.clone())
    }
}

/// Free-function form of [`Schema::for_llm`]
pub fn for_llm(schema: &Schema) -> Schema {
    schema.for_llm()
}

/// Rebuilt node, or `None` when nothing below `schema` carries a URL check
fn relax(schema: &Schema) -> Option<Schema> {
    match &schema.node {
        SchemaNode::String(string) if string.has_url() => {
            let checks = string
                .checks
                .iter()
                .filter(|check| !check.is_url())
                .cloned()
                .collect::<Vec<StringCheck>>();
            Some(schema.with_node(SchemaNode::String(StringSchema { checks })))
        }
        SchemaNode::Object(object) => {
            let relaxed: Vec<Option<Schema>> = object
                .properties
                .iter()
                .map(|(_, property)| relax(property))
                .collect();
            if relaxed.iter().all(Option::is_none) {
                return None;
            }

            let properties = object
                .properties
                .iter()
                .zip(relaxed)
                .map(|((key, original), relaxed)| {
                    let property = relaxed.map(Arc::new).unwrap_or_else(|| Arc::clone(original));
                    (key.clone(), property)
                })
                .collect();
            Some(schema.with_node(SchemaNode::Object(ObjectSchema {
                properties,
                strict: object.strict,
            })))
        }
        SchemaNode::Array(array) => relax(&array.element).map(|element| {
            schema.with_node(SchemaNode::Array(ArraySchema {
                element: Arc::new(element),
                min_items: array.min_items,
                max_items: array.max_items,
            }))
        }),
        SchemaNode::Optional(inner) => {
            relax(inner).map(|inner| schema.with_node(SchemaNode::Optional(Arc::new(inner))))
        }
        SchemaNode::Nullable(inner) => {
            relax(inner).map(|inner| schema.with_node(SchemaNode::Nullable(Arc::new(inner))))
        }
        _ => None,
    }
}
