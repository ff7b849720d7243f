//! Rate policy resolution.
//!
//! A policy is computed fresh for every lookup and handed to the limiter by
//! value. Nothing is written back into the process environment.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::warn;

use crate::config::GroupLimitConfig;

/// Built-in limits used when neither the environment nor the config file
/// configures a field: `(group, max, window_ms)`.
pub const DEFAULT_POLICIES: &[(&str, u64, u64)] = &[
    ("GLOBAL", 120, 60_000),
    ("AUTH", 60, 60_000),
    ("ADMIN", 90, 60_000),
    ("LISTINGS", 60, 60_000),
];

/// Effective limiting rule for one route group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatePolicy {
    pub group: String,
    pub max: u64,
    pub window_ms: u64,
}

impl RatePolicy {
    pub fn new(group: impl Into<String>, max: u64, window_ms: u64) -> Self {
        Self {
            group: normalize_group(&group.into()),
            max,
            window_ms,
        }
    }

    /// A zero max or zero window disables limiting for the group.
    pub fn is_unlimited(&self) -> bool {
        self.max == 0 || self.window_ms == 0
    }

    /// Fixed, epoch-aligned window containing `now_ms`.
    ///
    /// Windows longer than `i64::MAX` ms are clamped, never wrapped.
    pub fn window_index(&self, now_ms: i64) -> i64 {
        let window_ms = i64::try_from(self.window_ms.max(1)).unwrap_or(i64::MAX);
        now_ms.div_euclid(window_ms)
    }
}

/// Upper-cases a group label so `auth` and `AUTH` share one bucket.
pub fn normalize_group(group: &str) -> String {
    group.trim().to_ascii_uppercase()
}

/// Where environment overrides come from.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolves `(max, window_ms)` for a group.
///
/// Each field is resolved on its own: environment (`RATE_<GROUP>_MAX`,
/// `RATE_<GROUP>_WINDOW_MS`), then the config file, then [`DEFAULT_POLICIES`].
/// Missing, zero and unparsable values all count as "not configured".
#[derive(Clone)]
pub struct PolicyResolver {
    env: Arc<dyn EnvSource>,
    configured: BTreeMap<String, GroupLimitConfig>,
}

impl PolicyResolver {
    pub fn new(env: Arc<dyn EnvSource>, configured: &BTreeMap<String, GroupLimitConfig>) -> Self {
        let configured = configured
            .iter()
            .map(|(group, limit)| (normalize_group(group), *limit))
            .collect();
        Self { env, configured }
    }

    /// Resolver backed by the process environment and no config-file limits.
    pub fn from_env() -> Self {
        Self::new(Arc::new(ProcessEnv), &BTreeMap::new())
    }

    pub fn resolve(&self, group: &str) -> RatePolicy {
        let group = normalize_group(group);
        let builtin = DEFAULT_POLICIES
            .iter()
            .find(|(name, _, _)| *name == group)
            .map(|(_, max, window)| (*max, *window));
        let file = self.configured.get(&group);

        let max = self
            .env_value(&format!("RATE_{}_MAX", group))
            .or_else(|| file.map(|l| l.max).filter(|v| *v > 0))
            .or_else(|| builtin.map(|(max, _)| max))
            .unwrap_or(0);

        let window_ms = self
            .env_value(&format!("RATE_{}_WINDOW_MS", group))
            .or_else(|| file.map(|l| l.window_ms).filter(|v| *v > 0))
            .or_else(|| builtin.map(|(_, window)| window))
            .unwrap_or(0);

        RatePolicy {
            group,
            max,
            window_ms,
        }
    }

    fn env_value(&self, key: &str) -> Option<u64> {
        let raw = self.env.var(key)?;
        match raw.trim().parse::<u64>() {
            Ok(0) => None,
            Ok(value) => Some(value),
            Err(_) => {
                warn!(key = %key, value = %raw, "Ignoring non-numeric rate limit override");
                None
            }
        }
    }
}

impl Default for PolicyResolver {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(vars: &[(&str, &str)]) -> PolicyResolver {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PolicyResolver::new(Arc::new(env), &BTreeMap::new())
    }

    #[test]
    fn test_defaults_without_override() {
        let policy = resolver(&[]).resolve("AUTH");
        assert_eq!(policy, RatePolicy::new("AUTH", 60, 60_000));
    }

    #[test]
    fn test_oversized_window_clamps_instead_of_wrapping() {
        let policy = resolver(&[("RATE_AUTH_WINDOW_MS", "18446744073709551615")]).resolve("AUTH");
        assert_eq!(policy.window_ms, u64::MAX);
        assert_eq!(policy.window_index(0), 0);
        assert_eq!(policy.window_index(1), 0);
        assert_eq!(policy.window_index(1_700_000_000_000), 0);
    }

    #[test]
    fn test_group_name_is_case_insensitive() {
        let policy = resolver(&[("RATE_LISTINGS_MAX", "7")]).resolve("listings");
        assert_eq!(policy.group, "LISTINGS");
        assert_eq!(policy.max, 7);
        assert_eq!(policy.window_ms, 60_000);
    }

    #[test]
    fn test_zero_max_falls_back_but_window_override_applies() {
        let policy = resolver(&[("RATE_AUTH_MAX", "0"), ("RATE_AUTH_WINDOW_MS", "5000")])
            .resolve("AUTH");
        assert_eq!(policy.max, 60);
        assert_eq!(policy.window_ms, 5000);
    }

    #[test]
    fn test_non_numeric_override_ignored() {
        let policy = resolver(&[("RATE_GLOBAL_MAX", "lots")]).resolve("GLOBAL");
        assert_eq!(policy.max, 120);
    }

    #[test]
    fn test_unknown_group_is_unlimited() {
        let policy = resolver(&[]).resolve("UPLOADS");
        assert!(policy.is_unlimited());

        // Only half configured is still unlimited.
        let policy = resolver(&[("RATE_UPLOADS_MAX", "10")]).resolve("UPLOADS");
        assert_eq!(policy.max, 10);
        assert!(policy.is_unlimited());
    }

    #[test]
    fn test_config_file_sits_between_env_and_defaults() {
        let mut configured = BTreeMap::new();
        configured.insert("auth".to_string(), GroupLimitConfig { max: 5, window_ms: 0 });
        let env: HashMap<String, String> =
            [("RATE_AUTH_WINDOW_MS".to_string(), "2000".to_string())].into();
        let resolver = PolicyResolver::new(Arc::new(env), &configured);

        let policy = resolver.resolve("AUTH");
        assert_eq!(policy.max, 5);
        assert_eq!(policy.window_ms, 2000);
    }

    #[test]
    fn test_repeat_lookups_agree() {
        let resolver = resolver(&[]);
        assert_eq!(resolver.resolve("ADMIN"), resolver.resolve("ADMIN"));
    }

    #[test]
    fn test_window_index_is_epoch_aligned() {
        let policy = RatePolicy::new("AUTH", 2, 1000);
        assert_eq!(policy.window_index(0), 0);
        assert_eq!(policy.window_index(999), 0);
        assert_eq!(policy.window_index(1000), 1);
        assert_eq!(policy.window_index(12_345), 12);
    }
}
