//! Undo Markdown escaping inside URL-typed values
//!
//! Links in converted Markdown have their parentheses escaped (`\(`, `\)`).
//! A model quoting such a link back keeps the backslashes, so every string the
//! schema marks as a URL is unescaped before the final validation.

use crate::types::{Schema, SchemaNode};
use serde_json::Value;

/// Unescape `\(` and `\)` in every URL-typed string of `value`.
///
/// The walk mirrors the schema but never drops anything: shapes that do not
/// match, `null`, and unrecognized nodes pass through untouched.
pub fn repair_urls(value: Value, schema: &Schema) -> Value {
    match (&schema.node, value) {
        (_, Value::Null) => Value::Null,
        (SchemaNode::String(string), Value::String(text)) if string.has_url() => {
            Value::String(unescape_parens(&text))
        }
        (SchemaNode::Object(object), Value::Object(mut map)) => {
            for (key, property) in &object.properties {
                if let Some(slot) = map.get_mut(key) {
                    let child = slot.take();
                    *slot = repair_urls(child, property);
                }
            }
            Value::Object(map)
        }
        (SchemaNode::Array(array), Value::Array(items)) => Value::Array(
            items
                .into_iter()
                .map(|item| repair_urls(item, &array.element))
                .collect(),
        ),
        (SchemaNode::Optional(inner) | SchemaNode::Nullable(inner), value) => {
            repair_urls(value, inner)
        }
        (_, value) => value,
    }
}

/// Replace `\(` with `(` and `\)` with `)`
pub fn unescape_parens(text: &str) -> String {
    text.replace("\\(", "(").replace("\\)", ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_round_trip() {
        let schema = Schema::string().url();
        let repaired = repair_urls(json!(r"https://example.com/meeting-\(2023\)"), &schema);
        assert_eq!(repaired, json!("https://example.com/meeting-(2023)"));
    }

    #[test]
    fn test_only_url_fields_are_touched() {
        let schema = Schema::object([
            ("note", Schema::string()),
            ("link", Schema::string().url().optional()),
            (
                "gallery",
                Schema::array(Schema::object([("src", Schema::string().url())])).nullable(),
            ),
        ]);

        let value = json!({
            "note": r"keep \(this\)",
            "link": r"https://en.wikipedia.org/wiki/Rust_\(language\)",
            "gallery": [{ "src": r"https://img.example/a\(1\).png" }, "stray"],
            "extra": r"\(untouched\)"
        });

        assert_eq!(
            repair_urls(value, &schema),
            json!({
                "note": r"keep \(this\)",
                "link": "https://en.wikipedia.org/wiki/Rust_(language)",
                "gallery": [{ "src": "https://img.example/a(1).png" }, "stray"],
                "extra": r"\(untouched\)"
            })
        );
    }

    #[test]
    fn test_mismatched_shapes_pass_through() {
        let schema = Schema::array(Schema::string().url());
        assert_eq!(repair_urls(json!({ "a": 1 }), &schema), json!({ "a": 1 }));
        assert_eq!(repair_urls(json!(null), &schema), json!(null));
        assert_eq!(
            repair_urls(json!(5), &Schema::string().url()),
            json!(5)
        );
    }
}
