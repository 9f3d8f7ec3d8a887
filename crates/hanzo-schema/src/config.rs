//! Configuration for the sanitizer

use serde::{Deserialize, Serialize};

/// Sanitizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Deepest schema level the sanitizer descends into. Nodes below it are
    /// treated as unsanitizable.
    pub max_depth: usize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

impl SanitizerConfig {
    /// Set the depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SanitizerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_depth, 128);

        let config = SanitizerConfig::default().with_max_depth(4);
        assert_eq!(config.max_depth, 4);
    }
}
