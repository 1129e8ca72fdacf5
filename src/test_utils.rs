//! Test utilities for llmkit.
//!
//! Shared factories for settings, environment maps, and usage stats, used by
//! unit and integration tests alike.
//!
//! # Usage
//!
//! ```rust,ignore
//! use llmkit::test_utils::*;
//!
//! let env = env_map(&[("OPENAI_API_KEY", "sk-test")]);
//! let settings = openai_settings("sk-test");
//! let stats = make_test_stats(100, 4);
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::settings::ClientSettings;
use crate::tracking::stats::{UsageStats, today};

/// Build an environment map from key/value pairs.
#[must_use]
pub fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Settings preconfigured for OpenAI with the given key.
#[must_use]
pub fn openai_settings(api_key: &str) -> ClientSettings {
    ClientSettings {
        provider: Some("openai".to_string()),
        openai_api_key: Some(api_key.to_string()),
        ..Default::default()
    }
}

/// Stats dated today with the given counters (totals mirror today's values).
#[must_use]
pub fn make_test_stats(tokens: u64, requests: u64) -> UsageStats {
    UsageStats {
        tokens_used_today: tokens,
        requests_today: requests,
        last_reset: today(),
        total_tokens: tokens,
        total_requests: requests,
        client_id: None,
        process_id: None,
    }
}

/// Stats with a stale `last_reset`, for exercising daily rollover.
#[must_use]
pub fn make_stale_stats(last_reset: NaiveDate, tokens_today: u64, total: u64) -> UsageStats {
    UsageStats {
        tokens_used_today: tokens_today,
        requests_today: tokens_today.min(u64::from(u32::MAX)) / 10,
        last_reset,
        total_tokens: total,
        total_requests: total / 10,
        client_id: None,
        process_id: None,
    }
}
