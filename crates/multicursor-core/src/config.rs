//! Engine options.

use crate::document::DEFAULT_TAB_WIDTH;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options controlling the multi-selection engine.
///
/// Unknown fields are rejected; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiSelectOptions {
    /// When `false`, command dispatch ignores replay tags and runs every command once.
    pub enable_multiselect: bool,
    /// When `false`, toggling block selection never derives a rectangular block.
    pub enable_block_select: bool,
    /// Vertical centering ratio passed to the viewport when revealing a new range.
    pub scroll_centering: f32,
    /// Tab width used by screen mapping.
    pub tab_width: usize,
}

impl Default for MultiSelectOptions {
    fn default() -> Self {
        Self {
            enable_multiselect: true,
            enable_block_select: true,
            scroll_centering: 0.5,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

/// Errors raised while loading options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid options: {0}")]
    Json(#[from] serde_json::Error),
}

impl MultiSelectOptions {
    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| {
            tracing::warn!("Failed to parse multi-select options: {}", err);
            ConfigError::from(err)
        })
    }

    /// Serialize options to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let options = MultiSelectOptions::from_json(r#"{ "enable_block_select": false }"#).unwrap();
        assert!(options.enable_multiselect);
        assert!(!options.enable_block_select);
        assert_eq!(options.tab_width, DEFAULT_TAB_WIDTH);
    }

    #[test]
    fn test_round_trip() {
        let options = MultiSelectOptions {
            tab_width: 8,
            ..MultiSelectOptions::default()
        };
        let json = options.to_json().unwrap();
        assert_eq!(MultiSelectOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        assert!(matches!(
            MultiSelectOptions::from_json(r#"{ "bogus": 1 }"#),
            Err(ConfigError::Json(_))
        ));
    }
}
