//! JSON Schema interop
//!
//! Import classifies a document by structural keywords only, whatever tool
//! produced it. Anything outside the recognized subset becomes an
//! [`OpaqueSchema`] and is validated as a whole.

use crate::error::{Result, SchemaError};
use crate::introspect::peel;
use crate::types::{
    ArraySchema, NumberCheck, NumberSchema, ObjectSchema, OpaqueSchema, Schema, SchemaNode,
    StringCheck, StringSchema,
};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Keywords the structural importer understands. Annotations are accepted
/// and dropped; any other keyword makes the node opaque.
const KNOWN_KEYWORDS: &[&str] = &[
    "type",
    "description",
    "properties",
    "required",
    "additionalProperties",
    "items",
    "minItems",
    "maxItems",
    "minLength",
    "maxLength",
    "format",
    "pattern",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "enum",
    "const",
    "anyOf",
    "oneOf",
    // annotations
    "$schema",
    "$id",
    "title",
    "default",
    "examples",
];

impl Schema {
    /// Parse a JSON Schema document from text
    pub fn from_json_str(text: &str) -> Result<Schema> {
        let document: Value = serde_json::from_str(text)?;
        if !(document.is_object() || document.is_boolean()) {
            return Err(SchemaError::InvalidJsonSchema(format!(
                "expected an object or boolean, found {}",
                document
            )));
        }
        Ok(Schema::from_json_schema(&document))
    }

    /// Import a JSON Schema document
    pub fn from_json_schema(document: &Value) -> Schema {
        import(document)
            .unwrap_or_else(|| Schema::new(SchemaNode::Opaque(OpaqueSchema::new(document.clone()))))
    }

    /// Export as a JSON Schema document suitable for structured-output requests
    pub fn to_json_schema(&self) -> Value {
        let mut document = export(self);
        if let (Some(description), Value::Object(map)) = (self.description(), &mut document) {
            map.insert("description".to_string(), json!(description));
        }
        document
    }
}

fn import(document: &Value) -> Option<Schema> {
    let map = match document {
        Value::Bool(true) => return Some(Schema::any()),
        Value::Object(map) => map,
        _ => return None,
    };

    if map.keys().any(|key| !KNOWN_KEYWORDS.contains(&key.as_str())) {
        return None;
    }

    let schema = import_node(map)?;
    Some(match map.get("description").and_then(Value::as_str) {
        Some(description) => schema.describe(description),
        None => schema,
    })
}

fn import_node(map: &Map<String, Value>) -> Option<Schema> {
    // anyOf / oneOf with exactly one null branch
    for keyword in ["anyOf", "oneOf"] {
        if let Some(branches) = map.get(keyword) {
            return import_nullable_union(branches.as_array()?);
        }
    }

    if let Some(expected) = map.get("const") {
        return Some(Schema::literal(expected.clone()));
    }

    if let Some(options) = map.get("enum") {
        let options = options
            .as_array()?
            .iter()
            .map(|option| option.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        return Some(Schema::enumeration(options));
    }

    match map.get("type") {
        None => {
            // Only annotations left
            let structural = map.keys().any(|key| {
                !matches!(
                    key.as_str(),
                    "description" | "$schema" | "$id" | "title" | "default" | "examples"
                )
            });
            (!structural).then(Schema::any)
        }
        Some(Value::String(ty)) => import_typed(ty, map),
        Some(Value::Array(types)) => {
            let names = types.iter().map(Value::as_str).collect::<Option<Vec<_>>>()?;
            match names.as_slice() {
                [ty] => import_typed(ty, map),
                [a, b] if *b == "null" && *a != "null" => import_typed(a, map).map(Schema::nullable),
                [a, b] if *a == "null" && *b != "null" => import_typed(b, map).map(Schema::nullable),
                _ => None,
            }
        }
        Some(_) => None,
    }
}

fn import_nullable_union(branches: &[Value]) -> Option<Schema> {
    let is_null = |branch: &Value| branch.get("type").and_then(Value::as_str) == Some("null");
    match branches {
        [a, b] if is_null(b) && !is_null(a) => import(a).map(Schema::nullable),
        [a, b] if is_null(a) && !is_null(b) => import(b).map(Schema::nullable),
        [only] => import(only),
        _ => None,
    }
}

fn import_typed(ty: &str, map: &Map<String, Value>) -> Option<Schema> {
    match ty {
        "string" => import_string(map),
        "number" | "integer" => import_number(ty == "integer", map),
        "boolean" => Some(Schema::boolean()),
        "null" => Some(Schema::null()),
        "object" => import_object(map),
        "array" => import_array(map),
        _ => None,
    }
}

fn usize_keyword(map: &Map<String, Value>, keyword: &str) -> Option<Option<usize>> {
    match map.get(keyword) {
        None => Some(None),
        Some(value) => value.as_u64().map(|n| Some(n as usize)),
    }
}

fn import_string(map: &Map<String, Value>) -> Option<Schema> {
    let mut checks = Vec::new();
    if let Some(min) = usize_keyword(map, "minLength")? {
        checks.push(StringCheck::MinLength(min));
    }
    if let Some(max) = usize_keyword(map, "maxLength")? {
        checks.push(StringCheck::MaxLength(max));
    }
    if let Some(format) = map.get("format") {
        match format.as_str()? {
            "uri" | "url" => checks.push(StringCheck::Url),
            "email" => checks.push(StringCheck::Email),
            "uuid" => checks.push(StringCheck::Uuid),
            "date-time" => checks.push(StringCheck::DateTime),
            _ => return None,
        }
    }
    if let Some(pattern) = map.get("pattern") {
        checks.push(StringCheck::Regex(Regex::new(pattern.as_str()?).ok()?));
    }
    Some(Schema::new(SchemaNode::String(StringSchema { checks })))
}

fn import_number(integer: bool, map: &Map<String, Value>) -> Option<Schema> {
    let bound = |keyword: &str| -> Option<Option<f64>> {
        match map.get(keyword) {
            None => Some(None),
            Some(value) => value.as_f64().map(Some),
        }
    };

    let mut checks = Vec::new();
    if let Some(value) = bound("minimum")? {
        checks.push(NumberCheck::Min { value, inclusive: true });
    }
    if let Some(value) = bound("exclusiveMinimum")? {
        checks.push(NumberCheck::Min { value, inclusive: false });
    }
    if let Some(value) = bound("maximum")? {
        checks.push(NumberCheck::Max { value, inclusive: true });
    }
    if let Some(value) = bound("exclusiveMaximum")? {
        checks.push(NumberCheck::Max { value, inclusive: false });
    }
    if let Some(step) = bound("multipleOf")? {
        checks.push(NumberCheck::MultipleOf(step));
    }
    Some(Schema::new(SchemaNode::Number(NumberSchema { integer, checks })))
}

fn import_object(map: &Map<String, Value>) -> Option<Schema> {
    let required: Vec<&str> = match map.get("required") {
        None => Vec::new(),
        Some(list) => list
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()?,
    };

    let strict = match map.get("additionalProperties") {
        None | Some(Value::Bool(true)) => false,
        Some(Value::Bool(false)) => true,
        // Schemas for additional properties are outside the structural subset
        Some(_) => return None,
    };

    let mut properties = Vec::new();
    if let Some(declared) = map.get("properties") {
        for (key, property) in declared.as_object()? {
            let schema = Schema::from_json_schema(property);
            let schema = if required.contains(&key.as_str()) {
                schema
            } else {
                schema.optional()
            };
            properties.push((key.clone(), Arc::new(schema)));
        }
    }

    Some(Schema::new(SchemaNode::Object(ObjectSchema { properties, strict })))
}

fn import_array(map: &Map<String, Value>) -> Option<Schema> {
    let element = match map.get("items") {
        None => Schema::any(),
        Some(items) if items.is_object() || items.is_boolean() => Schema::from_json_schema(items),
        // Tuple validation
        Some(_) => return None,
    };

    Some(Schema::new(SchemaNode::Array(ArraySchema {
        element: Arc::new(element),
        min_items: usize_keyword(map, "minItems")?,
        max_items: usize_keyword(map, "maxItems")?,
    })))
}

fn export(schema: &Schema) -> Value {
    match &schema.node {
        SchemaNode::String(string) => {
            let mut map = Map::new();
            map.insert("type".into(), json!("string"));
            for check in &string.checks {
                match check {
                    StringCheck::MinLength(n) => map.insert("minLength".into(), json!(n)),
                    StringCheck::MaxLength(n) => map.insert("maxLength".into(), json!(n)),
                    StringCheck::Length(n) => {
                        map.insert("minLength".into(), json!(n));
                        map.insert("maxLength".into(), json!(n))
                    }
                    StringCheck::Url => map.insert("format".into(), json!("uri")),
                    StringCheck::Email => map.insert("format".into(), json!("email")),
                    StringCheck::Uuid => map.insert("format".into(), json!("uuid")),
                    StringCheck::DateTime => map.insert("format".into(), json!("date-time")),
                    StringCheck::Regex(pattern) => {
                        map.insert("pattern".into(), json!(pattern.as_str()))
                    }
                };
            }
            Value::Object(map)
        }
        SchemaNode::Number(number) => {
            let mut map = Map::new();
            let ty = if number.integer { "integer" } else { "number" };
            map.insert("type".into(), json!(ty));
            for check in &number.checks {
                match *check {
                    NumberCheck::Min { value, inclusive: true } => {
                        map.insert("minimum".into(), json!(value))
                    }
                    NumberCheck::Min { value, inclusive: false } => {
                        map.insert("exclusiveMinimum".into(), json!(value))
                    }
                    NumberCheck::Max { value, inclusive: true } => {
                        map.insert("maximum".into(), json!(value))
                    }
                    NumberCheck::Max { value, inclusive: false } => {
                        map.insert("exclusiveMaximum".into(), json!(value))
                    }
                    NumberCheck::MultipleOf(step) => map.insert("multipleOf".into(), json!(step)),
                    NumberCheck::Finite => None,
                };
            }
            Value::Object(map)
        }
        SchemaNode::Boolean => json!({ "type": "boolean" }),
        SchemaNode::Null => json!({ "type": "null" }),
        SchemaNode::Literal(value) => json!({ "const": value }),
        SchemaNode::Enum(options) => json!({ "type": "string", "enum": options }),
        SchemaNode::Any => json!({}),
        SchemaNode::Object(object) => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for (key, property) in &object.properties {
                let document = match &property.node {
                    SchemaNode::Optional(inner) => export_optional(property, inner),
                    _ => property.to_json_schema(),
                };
                properties.insert(key.clone(), document);
                if !peel(property).accepts_absent {
                    required.push(json!(key));
                }
            }
            let mut map = Map::new();
            map.insert("type".into(), json!("object"));
            map.insert("properties".into(), Value::Object(properties));
            map.insert("required".into(), Value::Array(required));
            if object.strict {
                map.insert("additionalProperties".into(), json!(false));
            }
            Value::Object(map)
        }
        SchemaNode::Array(array) => {
            let mut map = Map::new();
            map.insert("type".into(), json!("array"));
            map.insert("items".into(), array.element.to_json_schema());
            if let Some(min) = array.min_items {
                map.insert("minItems".into(), json!(min));
            }
            if let Some(max) = array.max_items {
                map.insert("maxItems".into(), json!(max));
            }
            Value::Object(map)
        }
        // JSON has no "absent" value; the enclosing object leaves it out of `required`
        SchemaNode::Optional(inner) => inner.to_json_schema(),
        SchemaNode::Nullable(inner) => json!({
            "anyOf": [inner.to_json_schema(), { "type": "null" }]
        }),
        // Predicates cannot be expressed; the model sees the inner shape
        SchemaNode::Refined(refinement) => refinement.inner.to_json_schema(),
        SchemaNode::Opaque(opaque) => opaque.raw.clone(),
    }
}

/// An optional property, with the wrapper's description taking precedence
fn export_optional(wrapper: &Schema, inner: &Schema) -> Value {
    let mut document = inner.to_json_schema();
    if let (Some(description), Value::Object(map)) = (wrapper.description(), &mut document) {
        map.insert("description".to_string(), json!(description));
    }
    document
}
