//! llmkit - configuration resolution and usage tracking for LLM clients.
//!
//! Two subsystems:
//!
//! - [`config`]: pure resolution of provider, API key, base URL, and model
//!   from explicit arguments, a settings object, and an environment mapping,
//!   with typed errors for every unresolvable required field.
//! - [`tracking`]: a durable token/request counter keyed by scope (per-client,
//!   per-process, or global), safe across threads and processes, with
//!   automatic daily rollover of the "today" counters.
//!
//! HTTP provider calls, CLI wizards, and metrics exporters live outside this
//! crate; callers resolve a [`ResolvedConfig`] before issuing a request and
//! record usage on a [`UsageTracker`] after each call completes.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod tracking;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{
    ClientSettings, EnvSource, NoSettings, ProcessEnv, ProviderSpec, ResolvedConfig, Settings,
    resolve_request_config,
};
pub use error::{ErrorCategory, LlmKitError, Result};
pub use tracking::{LockRegistry, Scope, UsageStats, UsageTracker};
