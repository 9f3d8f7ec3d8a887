//! Conversion result types

use serde::{Deserialize, Serialize};

/// Result of converting one HTML document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The Markdown that was selected
    pub markdown: String,

    /// Document title, whitespace-collapsed
    pub title: Option<String>,

    /// Whether the main-content conversion was kept
    pub used_main_content: bool,

    /// Length of the full-document conversion in characters
    pub full_length: usize,

    /// Length of the main-content conversion, when one ran
    pub main_length: Option<usize>,
}

impl ConversionResult {
    /// Create a result from a full-document conversion
    pub fn new(markdown: String) -> Self {
        let full_length = markdown.chars().count();
        Self {
            markdown,
            title: None,
            used_main_content: false,
            full_length,
            main_length: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Record the main-content pass and whether it was kept
    pub fn with_main_content(mut self, main: String, keep: bool) -> Self {
        self.main_length = Some(main.chars().count());
        if keep {
            self.markdown = main;
            self.used_main_content = true;
        }
        self
    }

    /// Length of the selected Markdown in characters
    pub fn len(&self) -> usize {
        self.markdown.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.markdown.is_empty()
    }
}
