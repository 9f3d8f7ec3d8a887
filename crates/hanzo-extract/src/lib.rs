//! # Hanzo Extract
//!
//! Content preparation and output finalization for schema-driven LLM
//! extraction.
//!
//! This crate converts HTML into compact Markdown for the prompt, and turns
//! the model's answer back into a value that satisfies the caller's schema
//! via `hanzo-schema`.
//!
//! ## Features
//!
//! - **Markdown**: rule-based HTML to Markdown with URL resolution, optional
//!   images, tracking-suffix cleanup and main-content extraction
//! - **Schema**: sanitize, repair and validate model output against a
//!   [`hanzo_schema::Schema`]
//!
//! ## Example
//!
//! ```rust
//! use hanzo_extract::{to_markdown, MarkdownOptions};
//!
//! let markdown = to_markdown(
//!     r#"<a href="/about">About</a>"#,
//!     &MarkdownOptions::default(),
//!     Some("https://example.com/company/"),
//! );
//! assert_eq!(markdown, "[About](https://example.com/about)");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────────┐
//! │    HTML     │ ──► │  Converter   │ ──► │    Markdown     │
//! │ (+ base URL)│     │ (tidy, rules)│     │  (LLM prompt)   │
//! └─────────────┘     └──────────────┘     └─────────────────┘
//!                                                   │
//!                                                   ▼
//!                                          ┌─────────────────┐
//!                                          │  Model answer   │
//!                                          └─────────────────┘
//!                                                   │
//!                                                   ▼
//!                                          ┌─────────────────┐
//!                                          │ finalize_output │
//!                                          │ (hanzo-schema)  │
//!                                          └─────────────────┘
//! ```

pub mod boilerplate;
pub mod config;
pub mod error;
pub mod result;
pub mod urls;

#[cfg(feature = "markdown")]
pub mod markdown;

#[cfg(feature = "markdown")]
mod tidy;

#[cfg(feature = "schema")]
pub mod structured;

pub use boilerplate::BoilerplatePatterns;
pub use config::MarkdownOptions;
pub use error::{ExtractError, Result};
pub use result::ConversionResult;
pub use urls::UrlCleanRule;

#[cfg(feature = "markdown")]
pub use markdown::{to_markdown, MarkdownConverter};

#[cfg(feature = "schema")]
pub use structured::{finalize_output, finalize_output_str};
