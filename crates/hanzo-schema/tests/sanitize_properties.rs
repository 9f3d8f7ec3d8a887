//! Property-based tests for the sanitizer
//!
//! Random, mostly-wrong values are pushed through a fixed article schema; the
//! sanitizer must only ever remove data and whatever it returns must conform.

use hanzo_schema::{Sanitized, Schema};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn article_schema() -> Schema {
    Schema::object([
        ("title", Schema::string().min_length(1)),
        ("links", Schema::array(Schema::string().url())),
        ("author", Schema::string().optional()),
        ("score", Schema::number().min(0.0).max(1.0).nullable()),
        (
            "meta",
            Schema::object([
                ("source", Schema::string().url()),
                ("tags", Schema::array(Schema::enumeration(["news", "blog", "docs"])).max_items(3)),
            ])
            .optional(),
        ),
    ])
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-2i64..3).prop_map(|n| Value::Number(n.into())),
        prop_oneof![Just(0.25f64), Just(0.5), Just(1.5)]
            .prop_map(|f| serde_json::json!(f)),
        prop_oneof![
            Just("https://example.com/a".to_string()),
            Just("/relative".to_string()),
            Just("news".to_string()),
            Just("docs".to_string()),
            Just(String::new()),
            "[a-z ]{1,12}",
        ]
        .prop_map(Value::String),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let keys = prop_oneof![
        Just("title"),
        Just("links"),
        Just("author"),
        Just("score"),
        Just("meta"),
        Just("source"),
        Just("tags"),
        Just("extra"),
    ];

    leaf_strategy().prop_recursive(4, 48, 6, move |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            proptest::collection::btree_map(keys.clone(), inner, 0..6).prop_map(|entries| {
                Value::Object(
                    entries
                        .into_iter()
                        .map(|(key, value)| (key.to_string(), value))
                        .collect::<Map<String, Value>>(),
                )
            }),
        ]
    })
}

/// True if every key of `output` exists in `input`, recursively, and every
/// array in `output` is an order-preserving subsequence of the input array
fn only_removes(input: &Value, output: &Value) -> bool {
    match (input, output) {
        (Value::Object(input), Value::Object(output)) => output.iter().all(|(key, child)| {
            input
                .get(key)
                .map(|original| only_removes(original, child) || child.is_null())
                .unwrap_or(false)
        }),
        (Value::Array(input), Value::Array(output)) => {
            let mut remaining = input.iter();
            output
                .iter()
                .all(|kept| remaining.any(|original| only_removes(original, kept)))
        }
        (_, Value::Null) => true,
        (input, output) => input == output,
    }
}

proptest! {
    #[test]
    fn prop_output_conforms(value in value_strategy()) {
        let schema = article_schema();
        if let Sanitized::Value(output) = schema.sanitize(&value) {
            prop_assert!(schema.is_valid(&output), "non-conforming output: {}", output);
        }
    }

    #[test]
    fn prop_sanitize_is_idempotent(value in value_strategy()) {
        let schema = article_schema();
        if let Sanitized::Value(output) = schema.sanitize(&value) {
            prop_assert_eq!(schema.sanitize(&output), Sanitized::Value(output));
        }
    }

    #[test]
    fn prop_sanitize_only_removes(value in value_strategy()) {
        let schema = article_schema();
        if let Sanitized::Value(output) = schema.sanitize(&value) {
            prop_assert!(only_removes(&value, &output), "{} -> {}", value, output);
        }
    }

    #[test]
    fn prop_valid_input_survives(value in value_strategy()) {
        let schema = article_schema();
        if schema.is_valid(&value) {
            prop_assert!(matches!(schema.sanitize(&value), Sanitized::Value(_)));
        }
    }

    #[test]
    fn prop_url_arrays_filter(items in proptest::collection::vec(leaf_strategy(), 0..12)) {
        let schema = Schema::array(Schema::string().url());
        let Sanitized::Value(Value::Array(kept)) = schema.sanitize(&Value::Array(items.clone())) else {
            panic!("array of urls is always sanitizable");
        };
        let expected: Vec<Value> = items
            .into_iter()
            .filter(|item| item.as_str() == Some("https://example.com/a"))
            .collect();
        prop_assert_eq!(kept, expected);
    }
}
