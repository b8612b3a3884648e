//! Configuration schema types for `ppmview.toml`

use serde::{Deserialize, Serialize};

use crate::resize::ScaleFilter;

/// Longest redraw delay accepted from config.
const MAX_REDRAW_DELAY_MS: u32 = 60_000;

/// Display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Keep the original aspect ratio when one canvas dimension changes
    #[serde(default = "default_true")]
    pub keep_aspect_ratio: bool,
    /// Quiet period before a resize is redrawn, in milliseconds
    #[serde(default = "default_redraw_delay_ms")]
    pub redraw_delay_ms: u32,
    /// Resampling filter for the display transform
    #[serde(default)]
    pub filter: ScaleFilter,
}

fn default_true() -> bool {
    true
}

fn default_redraw_delay_ms() -> u32 {
    1000
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            keep_aspect_ratio: true,
            redraw_delay_ms: default_redraw_delay_ms(),
            filter: ScaleFilter::default(),
        }
    }
}

/// Watch mode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Clear terminal between rebuilds
    #[serde(default = "default_true")]
    pub clear_screen: bool,
}

fn default_debounce_ms() -> u32 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), clear_screen: true }
    }
}

/// Complete ppmview.toml configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "watch.debounce_ms")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ppmview.toml: '{}' {}", self.field, self.message)
    }
}

impl ViewerConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.view.redraw_delay_ms > MAX_REDRAW_DELAY_MS {
            errors.push(ConfigValidationError {
                field: "view.redraw_delay_ms".to_string(),
                message: format!("must be at most {}", MAX_REDRAW_DELAY_MS),
            });
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ViewerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert!(config.view.keep_aspect_ratio);
        assert_eq!(config.view.redraw_delay_ms, 1000);
        assert_eq!(config.view.filter, ScaleFilter::Nearest);
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[view]
keep_aspect_ratio = false
redraw_delay_ms = 250
filter = "lanczos3"

[watch]
debounce_ms = 500
clear_screen = false
"#;
        let config: ViewerConfig = toml::from_str(toml).unwrap();
        assert!(!config.view.keep_aspect_ratio);
        assert_eq!(config.view.redraw_delay_ms, 250);
        assert_eq!(config.view.filter, ScaleFilter::Lanczos3);
        assert_eq!(config.watch.debounce_ms, 500);
        assert!(!config.watch.clear_screen);
        assert!(config.is_valid());
    }

    #[test]
    fn test_unknown_filter_fails_to_parse() {
        let result: Result<ViewerConfig, _> = toml::from_str("[view]\nfilter = \"sharp\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ViewerConfig::default();
        config.view.redraw_delay_ms = 120_000;
        config.watch.debounce_ms = 0;

        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "view.redraw_delay_ms");
        assert!(errors[1].to_string().contains("watch.debounce_ms"));
    }
}
