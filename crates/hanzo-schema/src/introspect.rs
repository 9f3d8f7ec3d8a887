//! Structural classification of schema nodes
//!
//! Everything downstream dispatches on [`SchemaKind`], never on where a schema
//! came from. Nodes that are not one of the four structural kinds are reported
//! as [`SchemaKind::Primitive`] so callers fall back to validating them whole.

use crate::types::{Schema, SchemaNode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structural kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    /// Validated as a whole (scalars, refinements, opaque fragments)
    Primitive,
    /// Object with named properties
    Object,
    /// Homogeneous array
    Array,
    /// Value may be absent
    Optional,
    /// Value may be null
    Nullable,
}

impl Schema {
    /// Structural kind of this node
    pub fn kind(&self) -> SchemaKind {
        match &self.node {
            SchemaNode::Object(_) => SchemaKind::Object,
            SchemaNode::Array(_) => SchemaKind::Array,
            SchemaNode::Optional(_) => SchemaKind::Optional,
            SchemaNode::Nullable(_) => SchemaKind::Nullable,
            SchemaNode::String(_)
            | SchemaNode::Number(_)
            | SchemaNode::Boolean
            | SchemaNode::Null
            | SchemaNode::Literal(_)
            | SchemaNode::Enum(_)
            | SchemaNode::Any
            | SchemaNode::Refined(_)
            | SchemaNode::Opaque(_) => SchemaKind::Primitive,
        }
    }

    /// True only for a string node carrying a URL check
    pub fn has_url_constraint(&self) -> bool {
        match &self.node {
            SchemaNode::String(string) => string.has_url(),
            _ => false,
        }
    }

    /// Wrapped schema of an optional or nullable node
    pub fn inner(&self) -> Option<&Arc<Schema>> {
        match &self.node {
            SchemaNode::Optional(inner) | SchemaNode::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    /// Item schema of an array node
    pub fn element(&self) -> Option<&Arc<Schema>> {
        match &self.node {
            SchemaNode::Array(array) => Some(&array.element),
            _ => None,
        }
    }

    /// Ordered property schemas of an object node
    pub fn properties(&self) -> Option<&[(String, Arc<Schema>)]> {
        match &self.node {
            SchemaNode::Object(object) => Some(&object.properties),
            _ => None,
        }
    }
}

/// Which wrapper sits outermost on a chain of optional/nullable nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wrapper {
    Optional,
    Nullable,
}

/// A wrapper chain reduced to its policy and the first non-wrapper node
#[derive(Debug)]
pub(crate) struct Peeled<'a> {
    /// First non-wrapper node
    pub core: &'a Schema,
    /// Outermost wrapper, if any
    pub outermost: Option<Wrapper>,
    /// Some wrapper in the chain is nullable
    pub accepts_null: bool,
    /// Some wrapper in the chain is optional
    pub accepts_absent: bool,
}

/// Strip every optional/nullable layer off `schema`
pub(crate) fn peel(schema: &Schema) -> Peeled<'_> {
    let mut core = schema;
    let mut outermost = None;
    let mut accepts_null = false;
    let mut accepts_absent = false;

    loop {
        let wrapper = match &core.node {
            SchemaNode::Optional(inner) => (Wrapper::Optional, inner),
            SchemaNode::Nullable(inner) => (Wrapper::Nullable, inner),
            _ => break,
        };
        match wrapper.0 {
            Wrapper::Optional => accepts_absent = true,
            Wrapper::Nullable => accepts_null = true,
        }
        outermost.get_or_insert(wrapper.0);
        core = wrapper.1.as_ref();
    }

    Peeled {
        core,
        outermost,
        accepts_null,
        accepts_absent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_of_each_node() {
        assert_eq!(Schema::string().kind(), SchemaKind::Primitive);
        assert_eq!(Schema::any().kind(), SchemaKind::Primitive);
        assert_eq!(Schema::array(Schema::number()).kind(), SchemaKind::Array);
        assert_eq!(
            Schema::object([("a", Schema::string())]).kind(),
            SchemaKind::Object
        );
        assert_eq!(Schema::string().optional().kind(), SchemaKind::Optional);
        assert_eq!(Schema::string().nullable().kind(), SchemaKind::Nullable);
    }

    #[test]
    fn test_unrecognized_nodes_are_primitive() {
        let refined = Schema::object([("a", Schema::number())]).refine(|_| true, "never");
        assert_eq!(refined.kind(), SchemaKind::Primitive);

        let opaque = Schema::from_json_schema(&json!({ "allOf": [{ "type": "string" }] }));
        assert_eq!(opaque.kind(), SchemaKind::Primitive);
    }

    #[test]
    fn test_has_url_constraint() {
        assert!(Schema::string().url().has_url_constraint());
        assert!(!Schema::string().email().has_url_constraint());
        // Only the string node itself counts, not wrappers around it
        assert!(!Schema::string().url().optional().has_url_constraint());
    }

    #[test]
    fn test_child_accessors() {
        let schema = Schema::array(Schema::string().nullable());
        let element = schema.element().unwrap();
        assert_eq!(element.kind(), SchemaKind::Nullable);
        assert_eq!(element.inner().unwrap().kind(), SchemaKind::Primitive);
        assert!(schema.properties().is_none());
        assert!(schema.inner().is_none());
    }

    #[test]
    fn test_peel_outermost_wrapper_wins() {
        let schema = Schema::string().nullable().optional();
        let peeled = peel(&schema);
        assert_eq!(peeled.outermost, Some(Wrapper::Optional));
        assert!(peeled.accepts_null);
        assert_eq!(peeled.core.kind(), SchemaKind::Primitive);

        let schema = Schema::string().optional().nullable();
        let peeled = peel(&schema);
        assert_eq!(peeled.outermost, Some(Wrapper::Nullable));
        // An optional layer anywhere in the chain allows a missing key
        assert!(peeled.accepts_absent);

        let schema = Schema::string().nullable();
        assert!(!peel(&schema).accepts_absent);

        let schema = Schema::string();
        let peeled = peel(&schema);
        assert_eq!(peeled.outermost, None);
        assert!(!peeled.accepts_null);
        assert!(!peeled.accepts_absent);
    }
}
