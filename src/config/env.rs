//! Read-only environment lookup for the resolver.
//!
//! The resolver never reads process state directly; it is handed an
//! [`EnvSource`] so tests and embedders can supply a plain map. Empty values
//! are treated as unset everywhere.

use std::collections::HashMap;

/// Read-only key/value lookup over environment variables.
pub trait EnvSource {
    /// Value for `key`, or `None` if unset.
    fn get(&self, key: &str) -> Option<String>;

    /// Value for `key`, treating empty/whitespace values as unset.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        Self::get(self, key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_lookup() {
        let mut env = HashMap::new();
        env.insert("OPENAI_API_KEY".to_string(), "sk-test".to_string());
        assert_eq!(
            EnvSource::get(&env, "OPENAI_API_KEY"),
            Some("sk-test".to_string())
        );
        assert_eq!(EnvSource::get(&env, "MISSING"), None);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let mut env = HashMap::new();
        env.insert("A".to_string(), String::new());
        env.insert("B".to_string(), "   ".to_string());
        env.insert("C".to_string(), "x".to_string());
        assert_eq!(env.get_non_empty("A"), None);
        assert_eq!(env.get_non_empty("B"), None);
        assert_eq!(env.get_non_empty("C"), Some("x".to_string()));
    }
}
