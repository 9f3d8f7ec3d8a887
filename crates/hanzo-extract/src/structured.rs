//! Turning raw model output into a schema-conformant value
//!
//! The model is given [`Schema::for_llm`]; its answer is sanitized against
//! that relaxed schema, URL escapes are repaired, and the result must then
//! pass the original schema.

use crate::error::{ExtractError, Result};
use hanzo_schema::{repair_urls, Sanitized, Schema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```$").unwrap());

/// Finalize a parsed model answer against `schema`
pub fn finalize_output(schema: &Schema, raw: &Value) -> Result<Value> {
    let relaxed = schema.for_llm();

    let sanitized = match relaxed.sanitize(raw) {
        Sanitized::Value(value) => value,
        outcome => {
            warn!(
                absent = outcome.is_absent(),
                "No schema-conformant data in model output"
            );
            return Err(ExtractError::NoRecoverableData);
        }
    };

    let repaired = repair_urls(sanitized, schema);
    if let Err(err) = schema.validate(&repaired) {
        warn!(issues = err.issues.len(), error = %err, "Repaired output fails the original schema");
        return Err(ExtractError::UrlValidation(err));
    }

    debug!("Model output finalized");
    Ok(repaired)
}

/// Parse model text (optionally inside a Markdown code fence) and finalize it
pub fn finalize_output_str(schema: &Schema, text: &str) -> Result<Value> {
    let raw: Value = serde_json::from_str(strip_code_fence(text))?;
    finalize_output(schema, &raw)
}

/// Body of a surrounding ```` ```json ```` fence, or the trimmed text
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    CODE_FENCE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .unwrap_or(trimmed)
}
