//! Recover the largest schema-conformant part of a model-produced value
//!
//! The walk follows the schema and the value in lock-step:
//!
//! - required object properties that fail invalidate the whole object
//! - optional properties that fail are omitted, nullable ones become `null`
//! - array items that fail are dropped, survivors keep their order
//! - every object and array is re-validated once rebuilt
//! - anything else must validate as a whole
//!
//! Whatever comes back as [`Sanitized::Value`] satisfies the schema.

use crate::config::SanitizerConfig;
use crate::introspect::{peel, SchemaKind, Wrapper};
use crate::path::Path;
use crate::types::Schema;
use crate::validate::is_valid;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Outcome of sanitizing one value
#[derive(Debug, Clone, PartialEq)]
pub enum Sanitized {
    /// A value that satisfies the schema
    Value(Value),
    /// Nothing usable, but the schema allows the value to be absent
    Absent,
    /// Nothing satisfying the schema could be recovered
    Unsanitizable,
}

impl Sanitized {
    /// The recovered value, if there is one
    pub fn value(&self) -> Option<&Value> {
        match self {
            Sanitized::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Consume into the recovered value
    pub fn into_value(self) -> Option<Value> {
        match self {
            Sanitized::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The value should be omitted from its parent
    pub fn is_absent(&self) -> bool {
        matches!(self, Sanitized::Absent)
    }

    /// Nothing could be recovered
    pub fn is_unsanitizable(&self) -> bool {
        matches!(self, Sanitized::Unsanitizable)
    }
}

/// Schema-driven sanitizer
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    config: SanitizerConfig,
}

impl Sanitizer {
    /// Create a sanitizer with the given configuration
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    /// Sanitize `value` against `schema`
    pub fn sanitize(&self, schema: &Schema, value: &Value) -> Sanitized {
        let mut path = Path::default();
        self.visit(schema, value, &mut path, 0)
    }

    fn visit(&self, schema: &Schema, value: &Value, path: &mut Path, depth: usize) -> Sanitized {
        if depth > self.config.max_depth {
            warn!(
                path = %path,
                max_depth = self.config.max_depth,
                "Schema nesting exceeds sanitizer depth limit"
            );
            return Sanitized::Unsanitizable;
        }

        match schema.kind() {
            SchemaKind::Optional | SchemaKind::Nullable => {
                self.visit_wrapped(schema, value, path, depth)
            }
            SchemaKind::Object => self.visit_object(schema, value, path, depth),
            SchemaKind::Array => self.visit_array(schema, value, path, depth),
            SchemaKind::Primitive => whole(schema, value),
        }
    }

    /// Optional and nullable chains. The outermost wrapper decides what a
    /// failure turns into; `null` passes if any layer is nullable.
    fn visit_wrapped(
        &self,
        schema: &Schema,
        value: &Value,
        path: &mut Path,
        depth: usize,
    ) -> Sanitized {
        let peeled = peel(schema);
        if value.is_null() && peeled.accepts_null {
            return Sanitized::Value(Value::Null);
        }

        match self.visit(peeled.core, value, path, depth + 1) {
            Sanitized::Value(value) => Sanitized::Value(value),
            _ => match peeled.outermost {
                Some(Wrapper::Nullable) => {
                    debug!(path = %path, "Replacing invalid nullable value with null");
                    Sanitized::Value(Value::Null)
                }
                _ => {
                    debug!(path = %path, "Omitting invalid optional value");
                    Sanitized::Absent
                }
            },
        }
    }

    fn visit_object(
        &self,
        schema: &Schema,
        value: &Value,
        path: &mut Path,
        depth: usize,
    ) -> Sanitized {
        let (Some(properties), Some(input)) = (schema.properties(), value.as_object()) else {
            return Sanitized::Unsanitizable;
        };

        let mut output = Map::new();
        for (key, property) in properties {
            let Some(child) = input.get(key) else {
                continue;
            };

            path.push_key(key);
            let result = self.visit(property, child, path, depth + 1);
            if result.is_unsanitizable() {
                debug!(path = %path, "Required property could not be sanitized");
                path.pop();
                return Sanitized::Unsanitizable;
            }
            path.pop();

            if let Sanitized::Value(value) = result {
                output.insert(key.clone(), value);
            }
        }

        revalidate(schema, Value::Object(output), path)
    }

    fn visit_array(
        &self,
        schema: &Schema,
        value: &Value,
        path: &mut Path,
        depth: usize,
    ) -> Sanitized {
        let (Some(element), Some(items)) = (schema.element(), value.as_array()) else {
            return Sanitized::Unsanitizable;
        };

        let mut kept = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            path.push_index(index);
            match self.visit(element, item, path, depth + 1) {
                Sanitized::Value(value) => kept.push(value),
                _ => debug!(path = %path, "Dropping invalid array item"),
            }
            path.pop();
        }

        revalidate(schema, Value::Array(kept), path)
    }
}

/// Sanitize with the default configuration
pub fn sanitize(schema: &Schema, value: &Value) -> Sanitized {
    Sanitizer::default().sanitize(schema, value)
}

impl Schema {
    /// Sanitize a value against this schema with the default configuration
    pub fn sanitize(&self, value: &Value) -> Sanitized {
        sanitize(self, value)
    }
}

fn whole(schema: &Schema, value: &Value) -> Sanitized {
    if is_valid(schema, value) {
        Sanitized::Value(value.clone())
    } else {
        Sanitized::Unsanitizable
    }
}

fn revalidate(schema: &Schema, candidate: Value, path: &Path) -> Sanitized {
    if is_valid(schema, &candidate) {
        Sanitized::Value(candidate)
    } else {
        debug!(path = %path, "Rebuilt value still fails its schema");
        Sanitized::Unsanitizable
    }
}
