//! # Hanzo Schema
//!
//! Schema-driven sanitization of structured LLM output.
//!
//! Models asked for JSON matching a schema usually get most of it right. Hanzo
//! Schema keeps the part that conforms instead of rejecting the whole answer:
//!
//! - **Sanitize**: drop failing array items and optional fields, null out
//!   failing nullable fields, fail only where a required value is unusable
//! - **Relax**: derive a model-facing schema with URL checks removed
//! - **Repair**: undo Markdown paren escaping in URL-typed strings
//! - **Validate**: check a value against a schema with JSON-pointer issues
//! - **Interop**: import and export JSON Schema documents
//!
//! ## Quick Start
//!
//! ```rust
//! use hanzo_schema::prelude::*;
//! use serde_json::json;
//!
//! let schema = Schema::object([
//!     ("title", Schema::string()),
//!     ("links", Schema::array(Schema::string().url())),
//!     ("author", Schema::string().optional()),
//! ]);
//!
//! let raw = json!({
//!     "title": "Release notes",
//!     "links": ["https://example.com/a", "not a url"],
//!     "author": 42
//! });
//!
//! match schema.sanitize(&raw) {
//!     Sanitized::Value(value) => {
//!         assert_eq!(value, json!({ "title": "Release notes", "links": ["https://example.com/a"] }));
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   Schema ──for_llm──► relaxed schema ──► LLM provider
//!                                              │
//!                                              ▼
//!                                          raw JSON
//!                                              │
//!                     ┌────────────────────────┴─┐
//!                     │ Sanitizer (relaxed)      │
//!                     └────────────┬─────────────┘
//!                                  ▼
//!                     ┌──────────────────────────┐
//!                     │ repair_urls (original)   │
//!                     └────────────┬─────────────┘
//!                                  ▼
//!                     ┌──────────────────────────┐
//!                     │ validate (original)      │
//!                     └──────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod introspect;
pub mod json_schema;
mod path;
pub mod repair;
pub mod sanitize;
pub mod transform;
pub mod types;
pub mod validate;

pub use config::SanitizerConfig;
pub use error::{Result, SchemaError, ValidationError, ValidationIssue};
pub use introspect::SchemaKind;
pub use repair::{repair_urls, unescape_parens};
pub use sanitize::{sanitize, Sanitized, Sanitizer};
pub use transform::for_llm;
pub use types::*;
pub use validate::{is_valid, validate};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::SanitizerConfig;
    pub use crate::error::{Result, SchemaError, ValidationError};
    pub use crate::introspect::SchemaKind;
    pub use crate::repair::repair_urls;
    pub use crate::sanitize::{Sanitized, Sanitizer};
    pub use crate::types::*;
}
