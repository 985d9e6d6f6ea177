//! Runtime configuration for the inspector.
//!
//! Configuration can be constructed programmatically or loaded from environment variables.

use core::time::Duration;
use std::env;

/// Properties snapshotted for each simulated pseudo-class state.
pub const DEFAULT_PSEUDO_PROPERTIES: [&str; 4] =
    ["background-color", "color", "transform", "box-shadow"];

/// Tuning knobs for [`crate::CascadeInspector`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Upper bound on the wait for the selector to match, in milliseconds
    pub element_timeout_ms: u64,
    /// Delay between selector polls, in milliseconds
    pub poll_interval_ms: u64,
    /// Marker class prefix used to simulate pseudo-class states
    pub pseudo_prefix: String,
    /// Properties captured for each simulated state
    pub pseudo_properties: Vec<String>,
}

impl Default for InspectorConfig {
    #[inline]
    fn default() -> Self {
        Self::new(5_000, 100, "pseudo-")
    }
}

impl InspectorConfig {
    /// Construct a configuration with explicit values and the default tracked properties.
    ///
    /// The poll interval is clamped to at least 1ms.
    #[inline]
    #[must_use]
    pub fn new(element_timeout_ms: u64, poll_interval_ms: u64, pseudo_prefix: &str) -> Self {
        Self {
            element_timeout_ms,
            poll_interval_ms: poll_interval_ms.max(1),
            pseudo_prefix: pseudo_prefix.to_owned(),
            pseudo_properties: DEFAULT_PSEUDO_PROPERTIES
                .iter()
                .map(|&name| name.to_owned())
                .collect(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `CASCADE_ELEMENT_TIMEOUT_MS`: selector wait bound (default: 5000)
    /// - `CASCADE_POLL_INTERVAL_MS`: selector poll interval (default: 100)
    /// - `CASCADE_PSEUDO_PREFIX`: pseudo-state marker prefix (default: `pseudo-`)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let element_timeout_ms = env::var("CASCADE_ELEMENT_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(defaults.element_timeout_ms);
        let poll_interval_ms = env::var("CASCADE_POLL_INTERVAL_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(defaults.poll_interval_ms);
        let pseudo_prefix = env::var("CASCADE_PSEUDO_PREFIX")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or(defaults.pseudo_prefix);
        Self::new(element_timeout_ms, poll_interval_ms, &pseudo_prefix)
    }

    /// Selector wait bound.
    #[inline]
    #[must_use]
    pub const fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    /// Selector poll interval.
    #[inline]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Marker class for `state`, e.g. `pseudo-hover`.
    #[inline]
    #[must_use]
    pub fn marker_class(&self, state: &str) -> String {
        format!("{}{state}", self.pseudo_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = InspectorConfig::default();
        assert_eq!(config.element_timeout(), Duration::from_secs(5));
        assert_eq!(config.marker_class("hover"), "pseudo-hover");
        assert_eq!(config.pseudo_properties.len(), 4);
    }

    #[test]
    fn poll_interval_is_never_zero() {
        let config = InspectorConfig::new(10, 0, "sim-");
        assert_eq!(config.poll_interval_ms, 1);
        assert_eq!(config.marker_class("focus"), "sim-focus");
    }
}
