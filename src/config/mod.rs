//! Configuration resolution.
//!
//! Deterministically turns explicit arguments, a settings object, and an
//! environment mapping into a provider-ready [`ResolvedConfig`], with typed
//! errors for every unresolvable required field.

pub mod env;
pub mod registry;
pub mod resolver;
pub mod settings;

pub use env::{EnvSource, ProcessEnv};
pub use registry::{DEFAULT_PROVIDER, ProviderSpec};
pub use resolver::{
    AUTO_PROVIDER, PLACEHOLDER_API_KEY, ResolvedConfig, resolve_api_key, resolve_base_url,
    resolve_model, resolve_provider, resolve_request_config,
};
pub use settings::{ClientSettings, FieldValue, NoSettings, Settings};
