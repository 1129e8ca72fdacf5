//! Settings access for the resolver.
//!
//! Callers hand the resolver a "settings" object that may come from a typed
//! config struct or a loose map. The resolver depends on one capability only:
//! get an optional field by name. Two adapters are provided: the typed
//! [`ClientSettings`] struct and a plain `HashMap` of [`FieldValue`]s.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Field Values
// =============================================================================

/// A loosely-typed settings field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// String value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Float(f64),
}

impl FieldValue {
    /// String content, if this is a text field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content widened to `f64`, if this is a numeric field.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }

    /// Numeric content as an unsigned integer, if representable.
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Integer(i) => u32::try_from(*i).ok(),
            Self::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX) => {
                Some(*f as u32)
            }
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

// =============================================================================
// Settings Trait
// =============================================================================

/// Narrow settings capability: get an optional field by name.
///
/// Absent fields and `None` values are treated identically as "not provided".
pub trait Settings {
    /// Raw field lookup.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// String field, with empty strings treated as unset.
    fn text_field(&self, name: &str) -> Option<String> {
        self.field(name)
            .and_then(|v| v.as_text().map(str::to_string))
            .filter(|s| !s.trim().is_empty())
    }

    /// Numeric field widened to `f64`.
    fn float_field(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(|v| v.as_f64())
    }

    /// Unsigned integer field.
    fn uint_field(&self, name: &str) -> Option<u32> {
        self.field(name).and_then(|v| v.as_u32())
    }
}

impl Settings for HashMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.get(name).cloned()
    }
}

/// Empty settings, for callers that configure everything explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSettings;

impl Settings for NoSettings {
    fn field(&self, _name: &str) -> Option<FieldValue> {
        None
    }
}

// =============================================================================
// Typed Settings
// =============================================================================

/// Typed settings struct covering the fields the resolver understands.
///
/// Vendor-specific key fields follow the `<provider>_api_key` naming that
/// mirrors each provider's environment variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Provider identifier, or `"auto"` to infer.
    pub provider: Option<String>,
    /// Generic API key (applies to whichever provider resolves).
    pub api_key: Option<String>,
    /// Vendor-specific API keys.
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub together_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub ollama_api_key: Option<String>,
    pub openai_compatible_api_key: Option<String>,
    /// Explicit endpoint override.
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// Sampling temperature passthrough.
    pub temperature: Option<f64>,
    /// Completion token cap passthrough.
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds, passthrough.
    pub timeout: Option<f64>,
}

impl Settings for ClientSettings {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "provider" => self.provider.clone().map(FieldValue::Text),
            "api_key" => self.api_key.clone().map(FieldValue::Text),
            "openai_api_key" => self.openai_api_key.clone().map(FieldValue::Text),
            "groq_api_key" => self.groq_api_key.clone().map(FieldValue::Text),
            "together_api_key" => self.together_api_key.clone().map(FieldValue::Text),
            "anthropic_api_key" => self.anthropic_api_key.clone().map(FieldValue::Text),
            "openrouter_api_key" => self.openrouter_api_key.clone().map(FieldValue::Text),
            "ollama_api_key" => self.ollama_api_key.clone().map(FieldValue::Text),
            "openai_compatible_api_key" => {
                self.openai_compatible_api_key.clone().map(FieldValue::Text)
            }
            "base_url" => self.base_url.clone().map(FieldValue::Text),
            "model" => self.model.clone().map(FieldValue::Text),
            "temperature" => self.temperature.map(FieldValue::Float),
            "max_tokens" => self.max_tokens.map(|v| FieldValue::Integer(i64::from(v))),
            "timeout" => self.timeout.map(FieldValue::Float),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_settings_field_access() {
        let settings = ClientSettings {
            provider: Some("groq".to_string()),
            groq_api_key: Some("gsk-test".to_string()),
            temperature: Some(0.7),
            max_tokens: Some(2048),
            ..Default::default()
        };

        assert_eq!(settings.text_field("provider"), Some("groq".to_string()));
        assert_eq!(settings.text_field("groq_api_key"), Some("gsk-test".to_string()));
        assert_eq!(settings.float_field("temperature"), Some(0.7));
        assert_eq!(settings.uint_field("max_tokens"), Some(2048));
        assert_eq!(settings.text_field("model"), None);
        assert_eq!(settings.field("unknown_field"), None);
    }

    #[test]
    fn map_settings_field_access() {
        let mut map: HashMap<String, FieldValue> = HashMap::new();
        map.insert("model".to_string(), "gpt-4o".into());
        map.insert("timeout".to_string(), 30.0.into());
        map.insert("max_tokens".to_string(), 512i64.into());

        assert_eq!(map.text_field("model"), Some("gpt-4o".to_string()));
        assert_eq!(map.float_field("timeout"), Some(30.0));
        assert_eq!(map.uint_field("max_tokens"), Some(512));
        assert_eq!(map.text_field("provider"), None);
    }

    #[test]
    fn empty_text_fields_count_as_unset() {
        let settings = ClientSettings {
            api_key: Some(String::new()),
            model: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.text_field("api_key"), None);
        assert_eq!(settings.text_field("model"), None);
    }

    #[test]
    fn field_value_coercions() {
        assert_eq!(FieldValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(FieldValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(FieldValue::Text("x".to_string()).as_f64(), None);
        assert_eq!(FieldValue::Float(4.0).as_u32(), Some(4));
        assert_eq!(FieldValue::Float(4.5).as_u32(), None);
        assert_eq!(FieldValue::Integer(-1).as_u32(), None);
    }

    #[test]
    fn no_settings_has_no_fields() {
        assert_eq!(NoSettings.field("provider"), None);
        assert_eq!(NoSettings.text_field("model"), None);
    }
}
