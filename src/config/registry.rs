//! Provider registry.
//!
//! A single explicit table of provider metadata consulted by every resolver
//! function. Adding a provider is a one-row edit here; nothing else in the
//! crate matches on provider names.

use crate::error::{LlmKitError, Result};

// =============================================================================
// Provider Spec
// =============================================================================

/// Static metadata for one supported provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Canonical provider identifier (e.g. `"openai"`).
    pub id: &'static str,
    /// Whether a real API credential is required ("cloud" classification).
    pub requires_api_key: bool,
    /// Known default base URL, if the provider has one.
    pub default_base_url: Option<&'static str>,
    /// Known default model, if the provider has one.
    pub default_model: Option<&'static str>,
    /// Environment variable consulted for the API key.
    pub api_key_env: &'static str,
    /// Environment variable consulted for the base URL.
    pub base_url_env: &'static str,
    /// Host substring used to infer this provider from an explicit base URL.
    pub host_pattern: Option<&'static str>,
}

impl ProviderSpec {
    /// Whether this provider is classified as "cloud" (needs a real credential).
    #[must_use]
    pub const fn is_cloud(&self) -> bool {
        self.requires_api_key
    }

    /// Settings field name holding this provider's API key (e.g. `openai_api_key`).
    #[must_use]
    pub fn settings_api_key_field(&self) -> String {
        self.api_key_env.to_lowercase()
    }
}

// =============================================================================
// Registry Table
// =============================================================================

/// All supported providers, in inference-priority order.
///
/// Local servers come first so that a dedicated base-URL environment variable
/// (e.g. `OLLAMA_HOST`) wins provider inference over cloud defaults.
pub const REGISTRY: &[ProviderSpec] = &[
    ProviderSpec {
        id: "ollama",
        requires_api_key: false,
        default_base_url: Some("http://localhost:11434"),
        default_model: Some("llama3.2"),
        api_key_env: "OLLAMA_API_KEY",
        base_url_env: "OLLAMA_HOST",
        host_pattern: Some(":11434"),
    },
    ProviderSpec {
        id: "fastchat",
        requires_api_key: false,
        default_base_url: Some("http://localhost:8000/v1"),
        default_model: Some("vicuna-7b-v1.5"),
        api_key_env: "FASTCHAT_API_KEY",
        base_url_env: "FASTCHAT_BASE_URL",
        host_pattern: None,
    },
    ProviderSpec {
        id: "text_generation_webui",
        requires_api_key: false,
        default_base_url: Some("http://localhost:5000/v1"),
        default_model: Some("local-model"),
        api_key_env: "TEXT_GENERATION_WEBUI_API_KEY",
        base_url_env: "TEXT_GENERATION_WEBUI_BASE_URL",
        host_pattern: None,
    },
    ProviderSpec {
        id: "openai",
        requires_api_key: true,
        default_base_url: Some("https://api.openai.com/v1"),
        default_model: Some("gpt-4o-mini"),
        api_key_env: "OPENAI_API_KEY",
        base_url_env: "OPENAI_BASE_URL",
        host_pattern: Some("api.openai.com"),
    },
    ProviderSpec {
        id: "groq",
        requires_api_key: true,
        default_base_url: Some("https://api.groq.com/openai/v1"),
        default_model: Some("llama-3.3-70b-versatile"),
        api_key_env: "GROQ_API_KEY",
        base_url_env: "GROQ_BASE_URL",
        host_pattern: Some("api.groq.com"),
    },
    ProviderSpec {
        id: "together",
        requires_api_key: true,
        default_base_url: Some("https://api.together.xyz/v1"),
        default_model: Some("meta-llama/Llama-3.3-70B-Instruct-Turbo"),
        api_key_env: "TOGETHER_API_KEY",
        base_url_env: "TOGETHER_BASE_URL",
        host_pattern: Some("api.together.xyz"),
    },
    ProviderSpec {
        id: "anthropic",
        requires_api_key: true,
        default_base_url: Some("https://api.anthropic.com"),
        default_model: Some("claude-3-5-sonnet-latest"),
        api_key_env: "ANTHROPIC_API_KEY",
        base_url_env: "ANTHROPIC_BASE_URL",
        host_pattern: Some("api.anthropic.com"),
    },
    ProviderSpec {
        id: "openrouter",
        requires_api_key: true,
        default_base_url: Some("https://openrouter.ai/api/v1"),
        default_model: Some("openrouter/auto"),
        api_key_env: "OPENROUTER_API_KEY",
        base_url_env: "OPENROUTER_BASE_URL",
        host_pattern: Some("openrouter.ai"),
    },
    // Generic passthrough: no defaults, caller must supply base URL and model.
    ProviderSpec {
        id: "openai_compatible",
        requires_api_key: false,
        default_base_url: None,
        default_model: None,
        api_key_env: "OPENAI_COMPATIBLE_API_KEY",
        base_url_env: "OPENAI_COMPATIBLE_BASE_URL",
        host_pattern: None,
    },
];

/// Fallback provider used when inference finds nothing.
pub const DEFAULT_PROVIDER: &str = "openai";

// =============================================================================
// Lookup
// =============================================================================

/// All registered provider specs, in registry order.
#[must_use]
pub const fn all() -> &'static [ProviderSpec] {
    REGISTRY
}

/// All registered provider identifiers, in registry order.
#[must_use]
pub fn ids() -> Vec<&'static str> {
    REGISTRY.iter().map(|spec| spec.id).collect()
}

/// Look up a provider by identifier.
///
/// Lookup is case-insensitive and treats `-` and `_` interchangeably, so
/// `"openai-compatible"` and `"OpenAI_Compatible"` both resolve.
#[must_use]
pub fn find(id: &str) -> Option<&'static ProviderSpec> {
    let normalized = id.trim().to_lowercase().replace('-', "_");
    REGISTRY.iter().find(|spec| spec.id == normalized)
}

/// Look up a provider by identifier, failing with [`LlmKitError::UnknownProvider`].
pub fn lookup(id: &str) -> Result<&'static ProviderSpec> {
    find(id).ok_or_else(|| LlmKitError::UnknownProvider {
        provider: id.to_string(),
    })
}

/// Infer a provider from a base URL by matching known host patterns.
#[must_use]
pub fn infer_from_base_url(base_url: &str) -> Option<&'static ProviderSpec> {
    REGISTRY
        .iter()
        .find(|spec| spec.host_pattern.is_some_and(|pat| base_url.contains(pat)))
}
