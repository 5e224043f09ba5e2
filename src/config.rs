//! Aggregate configuration for the bridging operations.

use crate::{Capabilities, ReplacePolicy, Replacer};

/// Settings shared by permission and replace operations.
///
/// With the `serde` feature the struct round-trips through JSON; missing
/// fields take their defaults.
///
/// ```rust
/// use fsbridge::BridgeConfig;
///
/// let config = BridgeConfig::default();
/// assert_eq!(config.replace.retries, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConfig {
    /// Host capabilities used by [`set_permission`](crate::set_permission).
    pub capabilities: Capabilities,
    /// Retry budget used by [`replacer`](Self::replacer).
    pub replace: ReplacePolicy,
}

impl BridgeConfig {
    /// A [`Replacer`] using this config's policy.
    pub fn replacer(&self) -> Replacer {
        Replacer::new(self.replace)
    }

    /// Parse a JSON document such as
    /// `{"capabilities": {"native_chmod": false}, "replace": {"retries": 3, "delay_ms": 250}}`.
    ///
    /// # Errors
    ///
    /// Malformed JSON or a field of the wrong type.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render as JSON.
    ///
    /// # Errors
    ///
    /// Only if serialization itself fails, which these plain fields do not.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_match_components() {
        let config = BridgeConfig::default();
        assert_eq!(config.capabilities, Capabilities::probe());
        assert_eq!(config.replace, ReplacePolicy::default());
        assert_eq!(config.replacer().policy().delay, Duration::from_secs(1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip_uses_milliseconds() {
        let config = BridgeConfig::from_json(
            r#"{"capabilities": {"native_chmod": false}, "replace": {"retries": 3, "delay_ms": 250}}"#,
        )
        .unwrap();
        assert!(!config.capabilities.native_chmod);
        assert_eq!(config.replace.retries, 3);
        assert_eq!(config.replace.delay, Duration::from_millis(250));

        let json = config.to_json().unwrap();
        assert!(json.contains("\"delay_ms\":250"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let config = BridgeConfig::from_json(r#"{"replace": {"retries": 1}}"#).unwrap();
        assert_eq!(config.replace.retries, 1);
        assert_eq!(config.replace.delay, Duration::from_secs(1));
        assert_eq!(config.capabilities, Capabilities::probe());
    }
}
