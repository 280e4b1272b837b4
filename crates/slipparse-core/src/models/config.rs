//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the slipparse pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlipConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Runtime policy applied by the caller.
    pub runtime: RuntimeConfig,
}

impl Default for SlipConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Use table/form-field layout data when the document carries it.
    pub use_layout: bool,

    /// Run the item classifier on extracted item names.
    pub classify_items: bool,

    /// Attach reconciliation warnings to the parse result.
    pub reconcile: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            use_layout: true,
            classify_items: true,
            reconcile: true,
        }
    }
}

/// Runtime policy. The engine itself is synchronous and never blocks; the
/// timeout is enforced by the caller around each parse invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Wall-clock budget per parse invocation, in seconds.
    pub parse_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            parse_timeout_secs: 10,
        }
    }
}

impl SlipConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let config = SlipConfig::default();
        assert_eq!(config.runtime.parse_timeout_secs, 10);
        assert!(config.extraction.use_layout);
    }

    #[test]
    fn test_partial_json() {
        let config: SlipConfig =
            serde_json::from_str(r#"{"runtime": {"parse_timeout_secs": 5}}"#).unwrap();
        assert_eq!(config.runtime.parse_timeout_secs, 5);
        assert!(config.extraction.classify_items);
    }
}
