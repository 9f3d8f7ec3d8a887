//! Whole-value validation against a schema

use crate::error::{ValidationError, ValidationIssue};
use crate::introspect::peel;
use crate::path::Path;
use crate::types::{
    ArraySchema, NumberCheck, NumberSchema, ObjectSchema, Schema, SchemaNode, StringCheck,
    StringSchema,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .unwrap()
});

/// Validate `value` against `schema`, collecting every issue
pub fn validate(schema: &Schema, value: &Value) -> Result<(), ValidationError> {
    let mut checker = Checker::default();
    checker.check(schema, value);
    if checker.issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            issues: checker.issues,
        })
    }
}

/// True if `value` satisfies `schema`
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_ok()
}

impl Schema {
    /// Validate a value against this schema
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        validate(self, value)
    }

    /// True if the value satisfies this schema
    pub fn is_valid(&self, value: &Value) -> bool {
        is_valid(self, value)
    }
}

#[derive(Default)]
struct Checker {
    path: Path,
    issues: Vec<ValidationIssue>,
}

impl Checker {
    fn fail(&mut self, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: self.path.to_string(),
            message: message.into(),
        });
    }

    fn check(&mut self, schema: &Schema, value: &Value) {
        match &schema.node {
            SchemaNode::String(string) => self.check_string(string, value),
            SchemaNode::Number(number) => self.check_number(number, value),
            SchemaNode::Boolean => {
                if !value.is_boolean() {
                    self.fail(format!("expected boolean, received {}", type_name(value)));
                }
            }
            SchemaNode::Null => {
                if !value.is_null() {
                    self.fail(format!("expected null, received {}", type_name(value)));
                }
            }
            SchemaNode::Literal(expected) => {
                if value != expected {
                    self.fail(format!("expected literal {}", expected));
                }
            }
            SchemaNode::Enum(options) => match value.as_str() {
                Some(text) if options.iter().any(|option| option == text) => {}
                _ => self.fail(format!("expected one of [{}]", options.join(", "))),
            },
            SchemaNode::Any => {}
            SchemaNode::Object(object) => self.check_object(object, value),
            SchemaNode::Array(array) => self.check_array(array, value),
            // Absence is handled by the enclosing object; a present value must
            // satisfy the inner schema.
            SchemaNode::Optional(inner) => self.check(inner, value),
            SchemaNode::Nullable(inner) => {
                if !value.is_null() {
                    self.check(inner, value);
                }
            }
            SchemaNode::Refined(refinement) => {
                let before = self.issues.len();
                self.check(&refinement.inner, value);
                if self.issues.len() == before && !(refinement.predicate)(value) {
                    self.fail(refinement.message.clone());
                }
            }
            SchemaNode::Opaque(opaque) => {
                if !opaque.accepts(value) {
                    self.fail("does not match JSON Schema fragment");
                }
            }
        }
    }

    fn check_string(&mut self, string: &StringSchema, value: &Value) {
        let Some(text) = value.as_str() else {
            self.fail(format!("expected string, received {}", type_name(value)));
            return;
        };

        let chars = text.chars().count();
        for check in &string.checks {
            match check {
                StringCheck::MinLength(min) if chars < *min => {
                    self.fail(format!("must contain at least {} character(s)", min))
                }
                StringCheck::MaxLength(max) if chars > *max => {
                    self.fail(format!("must contain at most {} character(s)", max))
                }
                StringCheck::Length(len) if chars != *len => {
                    self.fail(format!("must contain exactly {} character(s)", len))
                }
                StringCheck::Url if url::Url::parse(text).is_err() => self.fail("invalid url"),
                StringCheck::Email if !EMAIL.is_match(text) => self.fail("invalid email"),
                StringCheck::Uuid if uuid::Uuid::parse_str(text).is_err() => {
                    self.fail("invalid uuid")
                }
                StringCheck::DateTime if chrono::DateTime::parse_from_rfc3339(text).is_err() => {
                    self.fail("invalid datetime")
                }
                StringCheck::Regex(pattern) if !pattern.is_match(text) => {
                    self.fail(format!("must match pattern {}", pattern.as_str()))
                }
                _ => {}
            }
        }
    }

    fn check_number(&mut self, number: &NumberSchema, value: &Value) {
        let Some(n) = value.as_f64() else {
            self.fail(format!("expected number, received {}", type_name(value)));
            return;
        };

        if number.integer && n.fract() != 0.0 {
            self.fail("expected integer, received float");
        }

        for check in &number.checks {
            match *check {
                NumberCheck::Min { value, inclusive } => {
                    let ok = if inclusive { n >= value } else { n > value };
                    if !ok {
                        let op = if inclusive { ">=" } else { ">" };
                        self.fail(format!("must be {} {}", op, value));
                    }
                }
                NumberCheck::Max { value, inclusive } => {
                    let ok = if inclusive { n <= value } else { n < value };
                    if !ok {
                        let op = if inclusive { "<=" } else { "<" };
                        self.fail(format!("must be {} {}", op, value));
                    }
                }
                NumberCheck::MultipleOf(step) => {
                    let quotient = n / step;
                    if step != 0.0 && (quotient - quotient.round()).abs() > 1e-9 {
                        self.fail(format!("must be a multiple of {}", step));
                    }
                }
                NumberCheck::Finite => {
                    if !n.is_finite() {
                        self.fail("must be finite");
                    }
                }
            }
        }
    }

    fn check_object(&mut self, object: &ObjectSchema, value: &Value) {
        let Some(map) = value.as_object() else {
            self.fail(format!("expected object, received {}", type_name(value)));
            return;
        };

        for (key, property) in &object.properties {
            self.path.push_key(key);
            match map.get(key) {
                Some(child) => self.check(property, child),
                None if peel(property).accepts_absent => {}
                None => self.fail("required"),
            }
            self.path.pop();
        }

        if object.strict {
            for key in map.keys() {
                if object.get(key).is_none() {
                    self.fail(format!("unrecognized key '{}'", key));
                }
            }
        }
    }

    fn check_array(&mut self, array: &ArraySchema, value: &Value) {
        let Some(items) = value.as_array() else {
            self.fail(format!("expected array, received {}", type_name(value)));
            return;
        };

        if let Some(min) = array.min_items {
            if items.len() < min {
                self.fail(format!("must contain at least {} item(s)", min));
            }
        }
        if let Some(max) = array.max_items {
            if items.len() > max {
                self.fail(format!("must contain at most {} item(s)", max));
            }
        }

        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            self.check(&array.element, item);
            self.path.pop();
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_formats() {
        assert!(Schema::string().url().is_valid(&json!("https://example.com/a?b=c")));
        assert!(!Schema::string().url().is_valid(&json!("/relative/path")));
        assert!(Schema::string().email().is_valid(&json!("jane.doe@example.co.uk")));
        assert!(!Schema::string().email().is_valid(&json!("jane@")));
        assert!(Schema::string()
            .uuid()
            .is_valid(&json!("67e55044-10b1-426f-9247-bb680e5fe0c8")));
        assert!(Schema::string().datetime().is_valid(&json!("2024-03-01T12:00:00Z")));
        assert!(!Schema::string().datetime().is_valid(&json!("March 1st")));
    }

    #[test]
    fn test_string_lengths_count_chars() {
        let schema = Schema::string().min_length(2).max_length(3);
        assert!(schema.is_valid(&json!("日本")));
        assert!(!schema.is_valid(&json!("x")));
        assert!(!schema.is_valid(&json!("abcd")));
        assert!(Schema::string().length(1).is_valid(&json!("é")));
    }

    #[test]
    fn test_numbers() {
        assert!(Schema::integer().is_valid(&json!(3)));
        assert!(Schema::integer().is_valid(&json!(3.0)));
        assert!(!Schema::integer().is_valid(&json!(3.5)));
        assert!(!Schema::number().is_valid(&json!("3")));

        let bounded = Schema::number().gt(0.0).max(10.0);
        assert!(bounded.is_valid(&json!(10)));
        assert!(!bounded.is_valid(&json!(0)));
        assert!(Schema::number().multiple_of(0.5).is_valid(&json!(2.5)));
        assert!(!Schema::number().multiple_of(2.0).is_valid(&json!(3)));
    }

    #[test]
    fn test_object_required_and_optional() {
        let schema = Schema::object([
            ("name", Schema::string()),
            ("age", Schema::number().optional()),
            ("nick", Schema::string().nullable()),
        ]);

        assert!(schema.is_valid(&json!({ "name": "x", "nick": null })));
        // Nullable does not mean absent
        let err = schema.validate(&json!({ "name": "x" })).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "/nick");
        assert_eq!(err.issues[0].message, "required");

        // Undeclared keys are ignored unless the object is strict
        assert!(schema.is_valid(&json!({ "name": "x", "nick": "y", "extra": 1 })));
        let strict = Schema::object([("name", Schema::string())]).strict();
        assert!(!strict.is_valid(&json!({ "name": "x", "extra": 1 })));
    }

    #[test]
    fn test_optional_under_nullable_may_be_missing() {
        let schema = Schema::object([
            ("name", Schema::string()),
            ("nick", Schema::string().optional().nullable()),
        ]);

        assert!(schema.is_valid(&json!({ "name": "x" })));
        assert!(schema.is_valid(&json!({ "name": "x", "nick": null })));
        assert!(schema.is_valid(&json!({ "name": "x", "nick": "y" })));
        assert!(!schema.is_valid(&json!({ "name": "x", "nick": 1 })));
    }

    #[test]
    fn test_issue_paths() {
        let schema = Schema::object([("links", Schema::array(Schema::string().url()))]);
        let err = schema
            .validate(&json!({ "links": ["https://a.example", "nope", 5] }))
            .unwrap_err();

        let paths: Vec<_> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["/links/1", "/links/2"]);
    }

    #[test]
    fn test_array_bounds() {
        let schema = Schema::array(Schema::number()).min_items(1).max_items(2);
        assert!(!schema.is_valid(&json!([])));
        assert!(schema.is_valid(&json!([1, 2])));
        assert!(!schema.is_valid(&json!([1, 2, 3])));
    }

    #[test]
    fn test_refinement_runs_after_inner() {
        let schema = Schema::object([("min", Schema::number()), ("max", Schema::number())])
            .refine(
                |v| v["min"].as_f64() <= v["max"].as_f64(),
                "min must not exceed max",
            );

        assert!(schema.is_valid(&json!({ "min": 1, "max": 2 })));
        let err = schema.validate(&json!({ "min": 3, "max": 2 })).unwrap_err();
        assert_eq!(err.issues[0].message, "min must not exceed max");

        // Inner failures are reported without evaluating the predicate
        let err = schema.validate(&json!({ "min": "a", "max": 2 })).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "/min");
    }

    #[test]
    fn test_literals_and_enums() {
        assert!(Schema::literal("v1").is_valid(&json!("v1")));
        assert!(!Schema::literal(1).is_valid(&json!(2)));
        let colors = Schema::enumeration(["red", "green"]);
        assert!(colors.is_valid(&json!("red")));
        assert!(!colors.is_valid(&json!("blue")));
    }
}
