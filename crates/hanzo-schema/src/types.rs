//! Core schema types and the builder API
//!
//! A [`Schema`] is an immutable tree. Children sit behind [`Arc`] so the same
//! subtree can appear in several schemas, and rebuilding a tree (see
//! [`Schema::for_llm`](crate::Schema::for_llm)) only allocates the nodes on
//! the path to a change.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A schema node together with its human-readable description
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) node: SchemaNode,
    pub(crate) description: Option<String>,
}

/// The shape a schema node describes
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// A string with optional checks
    String(StringSchema),
    /// A number (or integer) with optional checks
    Number(NumberSchema),
    /// `true` or `false`
    Boolean,
    /// Only `null`
    Null,
    /// Exactly this value
    Literal(Value),
    /// One of a fixed set of strings
    Enum(Vec<String>),
    /// Anything at all
    Any,
    /// An object with ordered, named properties
    Object(ObjectSchema),
    /// An array whose items all share one schema
    Array(ArraySchema),
    /// The value may be absent
    Optional(Arc<Schema>),
    /// The value may be `null`
    Nullable(Arc<Schema>),
    /// An inner schema plus a whole-value predicate
    Refined(Refinement),
    /// A JSON Schema fragment that could not be classified structurally
    Opaque(OpaqueSchema),
}

/// String node
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    /// Checks in the order they were declared
    pub checks: Vec<StringCheck>,
}

impl StringSchema {
    /// True if one of the checks requires a URL
    pub fn has_url(&self) -> bool {
        self.checks.iter().any(StringCheck::is_url)
    }
}

/// A constraint on a string value
#[derive(Debug, Clone)]
pub enum StringCheck {
    /// At least this many characters
    MinLength(usize),
    /// At most this many characters
    MaxLength(usize),
    /// Exactly this many characters
    Length(usize),
    /// Must parse as an absolute URL
    Url,
    /// Must look like an email address
    Email,
    /// Must parse as a UUID
    Uuid,
    /// Must parse as an RFC 3339 timestamp
    DateTime,
    /// Must match the pattern
    Regex(Regex),
}

impl StringCheck {
    /// True for the URL check
    pub fn is_url(&self) -> bool {
        matches!(self, StringCheck::Url)
    }
}

/// Number node
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    /// Only integral values are accepted
    pub integer: bool,
    /// Range and step checks
    pub checks: Vec<NumberCheck>,
}

/// A constraint on a numeric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberCheck {
    /// Lower bound
    Min { value: f64, inclusive: bool },
    /// Upper bound
    Max { value: f64, inclusive: bool },
    /// Value must be a multiple of this step
    MultipleOf(f64),
    /// Value must be finite
    Finite,
}

/// Object node
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    /// Properties in declaration order
    pub properties: Vec<(String, Arc<Schema>)>,
    /// Reject keys that are not declared (they are ignored otherwise)
    pub strict: bool,
}

impl ObjectSchema {
    /// Look up a property schema by name
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, schema)| schema)
    }
}

/// Array node
#[derive(Debug, Clone)]
pub struct ArraySchema {
    /// Schema applied to every item
    pub element: Arc<Schema>,
    /// Minimum number of items
    pub min_items: Option<usize>,
    /// Maximum number of items
    pub max_items: Option<usize>,
}

/// Predicate type used by [`Refinement`]
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// An inner schema with an extra check on the whole value
#[derive(Clone)]
pub struct Refinement {
    /// Schema the value must satisfy first
    pub inner: Arc<Schema>,
    /// Whole-value check
    pub predicate: Predicate,
    /// Message reported when the predicate fails
    pub message: String,
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("inner", &self.inner)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// A raw JSON Schema fragment validated by a compiled validator
#[derive(Clone)]
pub struct OpaqueSchema {
    /// The fragment as received
    pub raw: Value,
    #[cfg(feature = "opaque")]
    pub(crate) validator: Option<Arc<jsonschema::Validator>>,
}

impl OpaqueSchema {
    /// Compile a fragment. A fragment that does not compile rejects every value.
    pub fn new(raw: Value) -> Self {
        #[cfg(feature = "opaque")]
        {
            let validator = match jsonschema::validator_for(&raw) {
                Ok(validator) => Some(Arc::new(validator)),
                Err(err) => {
                    tracing::warn!(error = %err, "JSON Schema fragment does not compile");
                    None
                }
            };
            Self { raw, validator }
        }
        #[cfg(not(feature = "opaque"))]
        {
            Self { raw }
        }
    }

    /// Check a value against the fragment
    pub fn accepts(&self, value: &Value) -> bool {
        #[cfg(feature = "opaque")]
        {
            self.validator
                .as_ref()
                .map(|validator| validator.is_valid(value))
                .unwrap_or(false)
        }
        #[cfg(not(feature = "opaque"))]
        {
            let _ = value;
            false
        }
    }
}

impl fmt::Debug for OpaqueSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueSchema")
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// Wrap a node with no description
    pub fn new(node: SchemaNode) -> Self {
        Self {
            node,
            description: None,
        }
    }

    /// Same description, different node
    pub fn with_node(&self, node: SchemaNode) -> Self {
        Self {
            node,
            description: self.description.clone(),
        }
    }

    /// The node this schema describes
    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// Human-readable description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Attach a description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn string() -> Self {
        Self::new(SchemaNode::String(StringSchema::default()))
    }

    pub fn number() -> Self {
        Self::new(SchemaNode::Number(NumberSchema::default()))
    }

    pub fn integer() -> Self {
        Self::new(SchemaNode::Number(NumberSchema {
            integer: true,
            checks: Vec::new(),
        }))
    }

    pub fn boolean() -> Self {
        Self::new(SchemaNode::Boolean)
    }

    pub fn null() -> Self {
        Self::new(SchemaNode::Null)
    }

    pub fn any() -> Self {
        Self::new(SchemaNode::Any)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(SchemaNode::Literal(value.into()))
    }

    /// One of the given strings
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaNode::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// An object with the given properties, in order.
    ///
    /// Properties accept either owned schemas or shared `Arc<Schema>` subtrees.
    pub fn object<I, K, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Arc<Schema>>,
    {
        Self::new(SchemaNode::Object(ObjectSchema {
            properties: properties
                .into_iter()
                .map(|(key, schema)| (key.into(), schema.into()))
                .collect(),
            strict: false,
        }))
    }

    /// An array of `element`
    pub fn array(element: impl Into<Arc<Schema>>) -> Self {
        Self::new(SchemaNode::Array(ArraySchema {
            element: element.into(),
            min_items: None,
            max_items: None,
        }))
    }

    /// Allow the value to be absent
    pub fn optional(self) -> Self {
        Self::new(SchemaNode::Optional(Arc::new(self)))
    }

    /// Allow the value to be `null`
    pub fn nullable(self) -> Self {
        Self::new(SchemaNode::Nullable(Arc::new(self)))
    }

    /// Add a whole-value check on top of this schema
    pub fn refine<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(SchemaNode::Refined(Refinement {
            inner: Arc::new(self),
            predicate: Arc::new(predicate),
            message: message.into(),
        }))
    }

    // String checks. They have no effect on non-string nodes.

    pub fn min_length(self, len: usize) -> Self {
        self.with_string_check(StringCheck::MinLength(len))
    }

    pub fn max_length(self, len: usize) -> Self {
        self.with_string_check(StringCheck::MaxLength(len))
    }

    pub fn length(self, len: usize) -> Self {
        self.with_string_check(StringCheck::Length(len))
    }

    pub fn url(self) -> Self {
        self.with_string_check(StringCheck::Url)
    }

    pub fn email(self) -> Self {
        self.with_string_check(StringCheck::Email)
    }

    pub fn uuid(self) -> Self {
        self.with_string_check(StringCheck::Uuid)
    }

    pub fn datetime(self) -> Self {
        self.with_string_check(StringCheck::DateTime)
    }

    pub fn regex(self, pattern: Regex) -> Self {
        self.with_string_check(StringCheck::Regex(pattern))
    }

    fn with_string_check(mut self, check: StringCheck) -> Self {
        if let SchemaNode::String(string) = &mut self.node {
            string.checks.push(check);
        }
        self
    }

    // Number checks. They have no effect on non-number nodes.

    /// Inclusive lower bound
    pub fn min(self, value: f64) -> Self {
        self.with_number_check(NumberCheck::Min {
            value,
            inclusive: true,
        })
    }

    /// Inclusive upper bound
    pub fn max(self, value: f64) -> Self {
        self.with_number_check(NumberCheck::Max {
            value,
            inclusive: true,
        })
    }

    /// Exclusive lower bound
    pub fn gt(self, value: f64) -> Self {
        self.with_number_check(NumberCheck::Min {
            value,
            inclusive: false,
        })
    }

    /// Exclusive upper bound
    pub fn lt(self, value: f64) -> Self {
        self.with_number_check(NumberCheck::Max {
            value,
            inclusive: false,
        })
    }

    pub fn multiple_of(self, step: f64) -> Self {
        self.with_number_check(NumberCheck::MultipleOf(step))
    }

    pub fn finite(self) -> Self {
        self.with_number_check(NumberCheck::Finite)
    }

    fn with_number_check(mut self, check: NumberCheck) -> Self {
        if let SchemaNode::Number(number) = &mut self.node {
            number.checks.push(check);
        }
        self
    }

    // Array bounds. They have no effect on non-array nodes.

    pub fn min_items(mut self, count: usize) -> Self {
        if let SchemaNode::Array(array) = &mut self.node {
            array.min_items = Some(count);
        }
        self
    }

    pub fn max_items(mut self, count: usize) -> Self {
        if let SchemaNode::Array(array) = &mut self.node {
            array.max_items = Some(count);
        }
        self
    }

    /// At least one item
    pub fn nonempty(self) -> Self {
        self.min_items(1)
    }

    /// Reject undeclared keys. No effect on non-object nodes.
    pub fn strict(mut self) -> Self {
        if let SchemaNode::Object(object) = &mut self.node {
            object.strict = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chains_checks_in_order() {
        let schema = Schema::string().min_length(3).url().describe("Homepage");

        let SchemaNode::String(string) = schema.node() else {
            panic!("expected a string node");
        };
        assert_eq!(string.checks.len(), 2);
        assert!(matches!(string.checks[0], StringCheck::MinLength(3)));
        assert!(string.has_url());
        assert_eq!(schema.description(), Some("Homepage"));
    }

    #[test]
    fn test_checks_on_wrong_kind_are_ignored() {
        let schema = Schema::number().url().min_items(2);
        let SchemaNode::Number(number) = schema.node() else {
            panic!("expected a number node");
        };
        assert!(number.checks.is_empty());
    }

    #[test]
    fn test_shared_subtrees() {
        let address = Arc::new(Schema::object([("city", Schema::string())]));
        let schema = Schema::object([
            ("home", Arc::clone(&address)),
            ("work", Arc::clone(&address)),
        ]);

        let SchemaNode::Object(object) = schema.node() else {
            panic!("expected an object node");
        };
        assert!(Arc::ptr_eq(object.get("home").unwrap(), &address));
        assert!(Arc::ptr_eq(object.get("work").unwrap(), &address));
        assert!(object.get("office").is_none());
    }

    #[test]
    fn test_opaque_debug_hides_validator() {
        let opaque = OpaqueSchema::new(serde_json::json!({ "type": "string" }));
        let rendered = format!("{:?}", opaque);
        assert!(rendered.starts_with("OpaqueSchema"));
        assert!(rendered.contains("raw"));
    }
}
