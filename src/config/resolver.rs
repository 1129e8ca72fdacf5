//! Request configuration resolution.
//!
//! Turns loosely-specified, possibly partial configuration (explicit call-time
//! arguments, a [`Settings`] object, an environment mapping) into a fully
//! resolved, provider-ready [`ResolvedConfig`], or fails fast with an error
//! naming exactly which field could not be resolved.
//!
//! ## Precedence
//!
//! For every field, first non-empty wins:
//! 1. Explicit call-time argument
//! 2. Settings field (typed struct or map)
//! 3. Provider-specific environment variable
//! 4. Provider registry default
//!
//! All functions here are pure with respect to their inputs: no caching, no
//! mutation of settings, no hidden reads beyond the supplied [`EnvSource`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::env::EnvSource;
use crate::config::registry::{self, DEFAULT_PROVIDER, ProviderSpec};
use crate::config::settings::Settings;
use crate::error::{LlmKitError, Result};

/// Sentinel provider name that triggers inference.
pub const AUTO_PROVIDER: &str = "auto";

/// Placeholder credential handed to local providers so downstream HTTP
/// clients always receive a syntactically valid key.
pub const PLACEHOLDER_API_KEY: &str = "not-needed";

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved, provider-ready request configuration.
///
/// Constructed once per request/session by [`resolve_request_config`]; never
/// mutated afterwards and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    /// Selected provider identifier (never `"auto"`).
    pub provider: String,
    /// Resolved credential; a placeholder for local providers.
    pub api_key: String,
    /// Resolved endpoint.
    pub base_url: String,
    /// Concrete model identifier.
    pub model: String,
    /// Sampling temperature, passed through unvalidated.
    pub temperature: Option<f64>,
    /// Completion token cap, passed through unvalidated.
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds, passed through unvalidated.
    pub timeout: Option<f64>,
    /// Additional provider-specific parameters; starts empty.
    pub provider_kwargs: BTreeMap<String, serde_json::Value>,
}

// =============================================================================
// Field Resolvers
// =============================================================================

/// Resolve the provider.
///
/// An explicit name (other than `"auto"`) is validated against the registry.
/// Otherwise inference runs in fixed order: base-URL host pattern, then any
/// registry entry whose base-URL environment variable is set, then the
/// `"openai"` fallback.
///
/// # Errors
///
/// [`LlmKitError::UnknownProvider`] if an explicit name is not registered.
pub fn resolve_provider<E: EnvSource>(
    provider: Option<&str>,
    base_url: Option<&str>,
    env: &E,
) -> Result<&'static ProviderSpec> {
    if let Some(name) = provider.map(str::trim).filter(|p| !p.is_empty()) {
        if !name.eq_ignore_ascii_case(AUTO_PROVIDER) {
            return registry::lookup(name);
        }
    }

    if let Some(spec) = base_url.and_then(registry::infer_from_base_url) {
        return Ok(spec);
    }

    if let Some(spec) = registry::all()
        .iter()
        .find(|spec| env.get_non_empty(spec.base_url_env).is_some())
    {
        return Ok(spec);
    }

    registry::lookup(DEFAULT_PROVIDER)
}

/// Resolve the API key for a provider.
///
/// Precedence: explicit argument, then the vendor-specific settings field
/// (e.g. `openai_api_key`), then the vendor environment variable. Cloud
/// providers fail when nothing resolves; local providers fall back to
/// [`PLACEHOLDER_API_KEY`] so the result is never empty.
///
/// # Errors
///
/// [`LlmKitError::MissingApiKey`] for cloud providers with no resolvable key.
pub fn resolve_api_key<E: EnvSource>(
    spec: &ProviderSpec,
    api_key: Option<&str>,
    settings: Option<&dyn Settings>,
    env: &E,
) -> Result<String> {
    if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    if let Some(key) = settings.and_then(|s| s.text_field(&spec.settings_api_key_field())) {
        return Ok(key);
    }

    if let Some(key) = env.get_non_empty(spec.api_key_env) {
        return Ok(key);
    }

    if spec.requires_api_key {
        return Err(LlmKitError::MissingApiKey {
            provider: spec.id.to_string(),
            env_var: spec.api_key_env.to_string(),
        });
    }

    Ok(PLACEHOLDER_API_KEY.to_string())
}

/// Resolve the base URL for a provider.
///
/// Precedence: explicit argument, then the provider's base-URL environment
/// variable, then the registry default.
///
/// # Errors
///
/// [`LlmKitError::MissingBaseUrl`] for providers without a registry default
/// (the generic `openai_compatible` passthrough) when nothing else resolves.
pub fn resolve_base_url<E: EnvSource>(
    spec: &ProviderSpec,
    base_url: Option<&str>,
    env: &E,
) -> Result<String> {
    if let Some(url) = base_url.map(str::trim).filter(|u| !u.is_empty()) {
        return Ok(url.to_string());
    }

    if let Some(url) = env.get_non_empty(spec.base_url_env) {
        return Ok(url);
    }

    spec.default_base_url.map(str::to_string).ok_or_else(|| {
        LlmKitError::MissingBaseUrl {
            provider: spec.id.to_string(),
        }
    })
}

/// Resolve the model for a provider.
///
/// Precedence: the settings `model` field, then the registry default.
///
/// # Errors
///
/// [`LlmKitError::MissingModel`] when neither is available.
pub fn resolve_model(settings: &dyn Settings, spec: &ProviderSpec) -> Result<String> {
    if let Some(model) = settings.text_field("model") {
        return Ok(model);
    }

    spec.default_model.map(str::to_string).ok_or_else(|| {
        LlmKitError::MissingModel {
            provider: spec.id.to_string(),
        }
    })
}

// =============================================================================
// Orchestration
// =============================================================================

/// Resolve a complete request configuration.
///
/// Runs the field resolvers in fixed order (provider, API key, base URL,
/// model), then copies `temperature` / `max_tokens` / `timeout` through from
/// settings unchanged. The first sub-resolver error propagates; a partial
/// configuration is never returned.
///
/// The explicit `provider` argument wins over the settings `provider` field;
/// the explicit `base_url` argument participates in provider inference.
///
/// # Errors
///
/// Any of [`LlmKitError::UnknownProvider`], [`LlmKitError::MissingApiKey`],
/// [`LlmKitError::MissingBaseUrl`], [`LlmKitError::MissingModel`].
pub fn resolve_request_config<E: EnvSource>(
    settings: &dyn Settings,
    provider: Option<&str>,
    api_key: Option<&str>,
    base_url: Option<&str>,
    env: &E,
) -> Result<ResolvedConfig> {
    let settings_provider = settings.text_field("provider");
    let requested = provider.or(settings_provider.as_deref());

    let settings_base_url = settings.text_field("base_url");
    let requested_url = base_url.or(settings_base_url.as_deref());

    let spec = resolve_provider(requested, requested_url, env)?;

    let settings_api_key = settings.text_field("api_key");
    let api_key = resolve_api_key(
        spec,
        api_key.or(settings_api_key.as_deref()),
        Some(settings),
        env,
    )?;
    let base_url = resolve_base_url(spec, requested_url, env)?;
    let model = resolve_model(settings, spec)?;

    Ok(ResolvedConfig {
        provider: spec.id.to_string(),
        api_key,
        base_url,
        model,
        temperature: settings.float_field("temperature"),
        max_tokens: settings.uint_field("max_tokens"),
        timeout: settings.float_field("timeout"),
        provider_kwargs: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{ClientSettings, NoSettings};
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn explicit_provider_wins() {
        let spec = resolve_provider(Some("groq"), None, &env(&[])).unwrap();
        assert_eq!(spec.id, "groq");
    }

    #[test]
    fn auto_provider_infers_from_base_url() {
        let spec =
            resolve_provider(Some("auto"), Some("https://api.anthropic.com"), &env(&[])).unwrap();
        assert_eq!(spec.id, "anthropic");
    }

    #[test]
    fn auto_provider_infers_from_env() {
        let spec = resolve_provider(
            None,
            None,
            &env(&[("OLLAMA_HOST", "http://localhost:11434")]),
        )
        .unwrap();
        assert_eq!(spec.id, "ollama");
    }

    #[test]
    fn auto_provider_falls_back_to_openai() {
        let spec = resolve_provider(None, None, &env(&[])).unwrap();
        assert_eq!(spec.id, "openai");
    }

    #[test]
    fn unknown_provider_is_rejected_before_inference() {
        let err = resolve_provider(Some("not-a-real-provider"), None, &env(&[])).unwrap_err();
        assert!(matches!(err, LlmKitError::UnknownProvider { .. }));
    }

    #[test]
    fn api_key_precedence_explicit_over_settings_over_env() {
        let spec = registry::find("openai").unwrap();
        let settings = ClientSettings {
            openai_api_key: Some("from-settings".to_string()),
            ..Default::default()
        };
        let env = env(&[("OPENAI_API_KEY", "from-env")]);

        let key = resolve_api_key(spec, Some("explicit"), Some(&settings), &env).unwrap();
        assert_eq!(key, "explicit");

        let key = resolve_api_key(spec, None, Some(&settings), &env).unwrap();
        assert_eq!(key, "from-settings");

        let key = resolve_api_key(spec, None, Some(&NoSettings), &env).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn cloud_provider_without_key_fails() {
        let spec = registry::find("openai").unwrap();
        let err = resolve_api_key(spec, None, None, &env(&[])).unwrap_err();
        assert!(matches!(err, LlmKitError::MissingApiKey { .. }));
        assert_eq!(err.provider(), Some("openai"));
    }

    #[test]
    fn local_provider_without_key_gets_placeholder() {
        let spec = registry::find("ollama").unwrap();
        let key = resolve_api_key(spec, None, None, &env(&[])).unwrap();
        assert_eq!(key, PLACEHOLDER_API_KEY);
        assert!(!key.is_empty());
    }

    #[test]
    fn empty_explicit_key_falls_through() {
        let spec = registry::find("openai").unwrap();
        let env = env(&[("OPENAI_API_KEY", "from-env")]);
        let key = resolve_api_key(spec, Some("  "), None, &env).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn base_url_precedence() {
        let spec = registry::find("ollama").unwrap();

        let url = resolve_base_url(spec, Some("http://remote:11434"), &env(&[])).unwrap();
        assert_eq!(url, "http://remote:11434");

        let url =
            resolve_base_url(spec, None, &env(&[("OLLAMA_HOST", "http://box:11434")])).unwrap();
        assert_eq!(url, "http://box:11434");

        let url = resolve_base_url(spec, None, &env(&[])).unwrap();
        assert_eq!(url, "http://localhost:11434");
    }

    #[test]
    fn generic_passthrough_requires_base_url() {
        let spec = registry::find("openai_compatible").unwrap();
        let err = resolve_base_url(spec, None, &env(&[])).unwrap_err();
        assert!(matches!(err, LlmKitError::MissingBaseUrl { .. }));

        let url = resolve_base_url(
            spec,
            None,
            &env(&[("OPENAI_COMPATIBLE_BASE_URL", "http://gw:8080/v1")]),
        )
        .unwrap();
        assert_eq!(url, "http://gw:8080/v1");
    }

    #[test]
    fn model_precedence() {
        let spec = registry::find("openai").unwrap();

        let settings = ClientSettings {
            model: Some("gpt-4o".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_model(&settings, spec).unwrap(), "gpt-4o");
        assert_eq!(resolve_model(&NoSettings, spec).unwrap(), "gpt-4o-mini");
    }

    #[test]
    fn passthrough_without_model_fails() {
        let spec = registry::find("openai_compatible").unwrap();
        let err = resolve_model(&NoSettings, spec).unwrap_err();
        assert!(matches!(err, LlmKitError::MissingModel { .. }));
    }

    #[test]
    fn full_resolution_happy_path() {
        let settings = ClientSettings {
            provider: Some("groq".to_string()),
            groq_api_key: Some("gsk-test".to_string()),
            temperature: Some(0.2),
            max_tokens: Some(1024),
            timeout: Some(30.0),
            ..Default::default()
        };

        let config = resolve_request_config(&settings, None, None, None, &env(&[])).unwrap();
        assert_eq!(config.provider, "groq");
        assert_eq!(config.api_key, "gsk-test");
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.max_tokens, Some(1024));
        assert_eq!(config.timeout, Some(30.0));
        assert!(config.provider_kwargs.is_empty());
    }

    #[test]
    fn explicit_provider_argument_wins_over_settings() {
        let settings = ClientSettings {
            provider: Some("groq".to_string()),
            anthropic_api_key: Some("sk-ant".to_string()),
            ..Default::default()
        };

        let config =
            resolve_request_config(&settings, Some("anthropic"), None, None, &env(&[])).unwrap();
        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.api_key, "sk-ant");
    }

    #[test]
    fn first_failure_propagates_without_partial_config() {
        // Provider resolves but the key is missing; the error arrives before
        // base URL or model resolution could have produced anything.
        let result = resolve_request_config(&NoSettings, Some("openai"), None, None, &env(&[]));
        let err = result.unwrap_err();
        assert!(matches!(err, LlmKitError::MissingApiKey { .. }));
    }

    #[test]
    fn resolution_is_deterministic() {
        let settings = ClientSettings {
            provider: Some("together".to_string()),
            together_api_key: Some("tk-1".to_string()),
            ..Default::default()
        };
        let env = env(&[("TOGETHER_BASE_URL", "https://api.together.xyz/v1")]);

        let first = resolve_request_config(&settings, None, None, None, &env).unwrap();
        let second = resolve_request_config(&settings, None, None, None, &env).unwrap();
        assert_eq!(first, second);
    }
}
