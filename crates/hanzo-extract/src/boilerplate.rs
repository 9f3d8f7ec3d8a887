//! Boilerplate patterns used by main-content extraction
//!
//! The pattern lists are data, not code. The built-in set ships as
//! `data/boilerplate.toml` and can be replaced at runtime with
//! [`BoilerplatePatterns::from_toml_str`].

use crate::error::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const BUILTIN: &str = include_str!("../data/boilerplate.toml");

static BUILTIN_PATTERNS: Lazy<BoilerplatePatterns> = Lazy::new(|| {
    BoilerplatePatterns::from_toml_str(BUILTIN).expect("built-in boilerplate patterns are valid TOML")
});

/// Elements the filter never removes, whatever their attributes say
const PROTECTED_TAGS: &[&str] = &["html", "head", "body", "main", "article"];

/// Versioned pattern lists. All entries are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoilerplatePatterns {
    /// Version of the pattern data
    pub version: u32,
    /// Element names removed outright
    #[serde(default)]
    pub tags: Vec<String>,
    /// `role` attribute tokens
    #[serde(default)]
    pub roles: Vec<String>,
    /// Matched anywhere inside the id or a class name
    #[serde(default)]
    pub substrings: Vec<String>,
    /// Matched at the start of the id or a class name
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl Default for BoilerplatePatterns {
    fn default() -> Self {
        BUILTIN_PATTERNS.clone()
    }
}

impl BoilerplatePatterns {
    /// Parse pattern data from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut patterns: Self = toml::from_str(text)?;
        for list in [
            &mut patterns.tags,
            &mut patterns.roles,
            &mut patterns.substrings,
            &mut patterns.prefixes,
        ] {
            for entry in list.iter_mut() {
                *entry = entry.trim().to_ascii_lowercase();
            }
            list.retain(|entry| !entry.is_empty());
        }
        Ok(patterns)
    }

    /// True if an element with these attributes is boilerplate
    pub fn matches<'a>(
        &self,
        tag: &str,
        id: Option<&'a str>,
        classes: impl IntoIterator<Item = &'a str>,
        role: Option<&str>,
    ) -> bool {
        let tag = tag.to_ascii_lowercase();
        if PROTECTED_TAGS.contains(&tag.as_str()) {
            return false;
        }
        if self.tags.contains(&tag) {
            return true;
        }

        if let Some(role) = role {
            let hit = role
                .split_whitespace()
                .any(|token| self.roles.contains(&token.to_ascii_lowercase()));
            if hit {
                return true;
            }
        }

        id.into_iter()
            .chain(classes)
            .map(str::to_ascii_lowercase)
            .any(|token| self.matches_token(&token))
    }

    fn matches_token(&self, token: &str) -> bool {
        self.substrings.iter().any(|pattern| token.contains(pattern.as_str()))
            || self.prefixes.iter().any(|prefix| token.starts_with(prefix.as_str()))
    }
}
