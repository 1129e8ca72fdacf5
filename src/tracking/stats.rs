//! Usage statistics value objects.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

// =============================================================================
// Scope
// =============================================================================

/// Sharing granularity of a usage counter.
///
/// One stats file exists per distinct (scope, identity) pair; files are never
/// merged across scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// One counter per client identity.
    PerClient,
    /// One counter per OS process.
    PerProcess,
    /// A single shared counter.
    Global,
}

impl Scope {
    /// All scopes.
    pub const ALL: &'static [Self] = &[Self::PerClient, Self::PerProcess, Self::Global];

    /// Scope name as used in serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerClient => "per_client",
            Self::PerProcess => "per_process",
            Self::Global => "global",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Usage Stats
// =============================================================================

/// Token and request counters for one (scope, identity) pair.
///
/// `tokens_used_today` / `requests_today` reset when `last_reset` falls behind
/// the current date; `total_tokens` / `total_requests` only reset through an
/// explicit [`reset`](UsageStats::reset). After every successful recording,
/// the "today" counters never exceed their all-time totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStats {
    /// Tokens recorded since the last daily rollover.
    pub tokens_used_today: u64,
    /// Requests recorded since the last daily rollover.
    pub requests_today: u64,
    /// Date the daily counters were last valid for (ISO `YYYY-MM-DD`).
    pub last_reset: NaiveDate,
    /// All-time token count.
    pub total_tokens: u64,
    /// All-time request count.
    pub total_requests: u64,
    /// Client identity, present for per-client scope.
    pub client_id: Option<String>,
    /// OS process id, present for per-process and global scope.
    pub process_id: Option<u32>,
}

impl Default for UsageStats {
    fn default() -> Self {
        Self {
            tokens_used_today: 0,
            requests_today: 0,
            last_reset: today(),
            total_tokens: 0,
            total_requests: 0,
            client_id: None,
            process_id: None,
        }
    }
}

impl UsageStats {
    /// Fresh zero-valued stats dated today.
    #[must_use]
    pub fn fresh(client_id: Option<String>, process_id: Option<u32>) -> Self {
        Self {
            client_id,
            process_id,
            ..Self::default()
        }
    }

    /// Apply daily rollover if the stored date is not `today`.
    ///
    /// Zeroes the "today" counters and advances `last_reset`; totals are left
    /// untouched. Returns whether a rollover happened.
    pub fn roll_over_if_stale(&mut self, today: NaiveDate) -> bool {
        if self.last_reset == today {
            return false;
        }
        self.tokens_used_today = 0;
        self.requests_today = 0;
        self.last_reset = today;
        true
    }

    /// Record one request carrying `tokens` tokens.
    ///
    /// Every call counts as exactly one request, including zero-token calls.
    pub fn record(&mut self, tokens: u64) {
        self.tokens_used_today = self.tokens_used_today.saturating_add(tokens);
        self.total_tokens = self.total_tokens.saturating_add(tokens);
        self.requests_today = self.requests_today.saturating_add(1);
        self.total_requests = self.total_requests.saturating_add(1);
    }

    /// Zero all four counters and date the stats today.
    ///
    /// Identity fields survive the reset.
    pub fn reset(&mut self, today: NaiveDate) {
        self.tokens_used_today = 0;
        self.requests_today = 0;
        self.total_tokens = 0;
        self.total_requests = 0;
        self.last_reset = today;
    }
}

/// The current local calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn scope_serialized_names() {
        assert_eq!(Scope::PerClient.as_str(), "per_client");
        assert_eq!(Scope::PerProcess.as_str(), "per_process");
        assert_eq!(Scope::Global.as_str(), "global");
    }

    #[test]
    fn record_counts_every_call_as_one_request() {
        let mut stats = UsageStats::default();
        stats.record(10);
        stats.record(0);
        stats.record(5);

        assert_eq!(stats.tokens_used_today, 15);
        assert_eq!(stats.requests_today, 3);
        assert_eq!(stats.total_tokens, 15);
        assert_eq!(stats.total_requests, 3);
    }

    #[test]
    fn today_counters_never_exceed_totals() {
        let mut stats = UsageStats::default();
        for _ in 0..20 {
            stats.record(7);
            assert!(stats.tokens_used_today <= stats.total_tokens);
            assert!(stats.requests_today <= stats.total_requests);
        }
    }

    #[test]
    fn rollover_preserves_totals() {
        let mut stats = UsageStats {
            tokens_used_today: 100,
            requests_today: 4,
            last_reset: date("2026-01-09"),
            total_tokens: 500,
            total_requests: 20,
            ..Default::default()
        };

        assert!(stats.roll_over_if_stale(date("2026-01-10")));
        assert_eq!(stats.tokens_used_today, 0);
        assert_eq!(stats.requests_today, 0);
        assert_eq!(stats.total_tokens, 500);
        assert_eq!(stats.total_requests, 20);
        assert_eq!(stats.last_reset, date("2026-01-10"));
    }

    #[test]
    fn rollover_is_noop_on_same_day() {
        let mut stats = UsageStats {
            tokens_used_today: 42,
            last_reset: date("2026-01-10"),
            ..Default::default()
        };
        assert!(!stats.roll_over_if_stale(date("2026-01-10")));
        assert_eq!(stats.tokens_used_today, 42);
    }

    #[test]
    fn reset_clears_everything_but_identity() {
        let mut stats = UsageStats {
            tokens_used_today: 1,
            requests_today: 2,
            total_tokens: 3,
            total_requests: 4,
            last_reset: date("2026-01-09"),
            client_id: Some("client-a".to_string()),
            process_id: Some(42),
        };

        stats.reset(date("2026-01-10"));
        assert_eq!(stats.tokens_used_today, 0);
        assert_eq!(stats.requests_today, 0);
        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.last_reset, date("2026-01-10"));
        assert_eq!(stats.client_id.as_deref(), Some("client-a"));
        assert_eq!(stats.process_id, Some(42));
    }

    #[test]
    fn serialized_form_matches_on_disk_layout() {
        let stats = UsageStats {
            tokens_used_today: 0,
            requests_today: 0,
            last_reset: date("2026-01-10"),
            total_tokens: 0,
            total_requests: 0,
            client_id: None,
            process_id: Some(12345),
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["tokens_used_today"], 0);
        assert_eq!(json["last_reset"], "2026-01-10");
        assert_eq!(json["process_id"], 12345);
        assert!(json["client_id"].is_null());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        // Older files may omit identity fields; serde(default) fills them in.
        let stats: UsageStats =
            serde_json::from_str(r#"{"tokens_used_today": 7, "last_reset": "2026-01-10"}"#)
                .unwrap();
        assert_eq!(stats.tokens_used_today, 7);
        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.client_id, None);
    }
}
