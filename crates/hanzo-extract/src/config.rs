//! Converter configuration

use crate::boilerplate::BoilerplatePatterns;
use crate::urls::{default_clean_rules, UrlCleanRule};
use serde::{Deserialize, Serialize};

/// Options for HTML to Markdown conversion.
///
/// The three switches default to off. The remaining fields tune the
/// main-content heuristic and rarely need changing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Keep images (`![alt](src)`); they are stripped otherwise
    pub include_images: bool,

    /// Remove boilerplate regions before converting
    pub extract_main_html: bool,

    /// Strip tracking suffixes from recognized URLs
    pub clean_urls: bool,

    /// Main content shorter than this share of the full conversion is suspect
    pub min_main_ratio: f64,

    /// Main content shorter than this many characters is suspect
    pub min_main_chars: usize,

    /// Elements nested deeper than this are skipped
    pub max_depth: usize,

    /// Patterns used by main-content extraction
    pub boilerplate: BoilerplatePatterns,

    /// Rules applied when `clean_urls` is on
    pub clean_rules: Vec<UrlCleanRule>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_images: false,
            extract_main_html: false,
            clean_urls: false,
            min_main_ratio: 0.2,
            min_main_chars: 500,
            max_depth: 512,
            boilerplate: BoilerplatePatterns::default(),
            clean_rules: default_clean_rules(),
        }
    }
}

impl MarkdownOptions {
    /// Enable or disable images
    pub fn with_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    /// Enable or disable main-content extraction
    pub fn with_main_content(mut self, extract: bool) -> Self {
        self.extract_main_html = extract;
        self
    }

    /// Enable or disable URL cleaning
    pub fn with_clean_urls(mut self, clean: bool) -> Self {
        self.clean_urls = clean;
        self
    }

    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the boilerplate patterns
    pub fn with_boilerplate(mut self, patterns: BoilerplatePatterns) -> Self {
        self.boilerplate = patterns;
        self
    }
}
