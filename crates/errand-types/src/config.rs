//! Configuration for the errand boundary layer.
//!
//! Everything is loaded from environment-style key/value pairs once at
//! startup. Invalid numeric values fall back to the documented defaults
//! rather than aborting, so a typo in one knob never takes the whole
//! boundary layer down.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ErrandError;

/// Tuning for one desktop watch invocation.
///
/// Created once per watch from environment defaults and immutable for that
/// invocation's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatcherConfig {
    /// Hard ceiling on how long a watch may run.
    pub max_duration: Duration,
    /// Interval between polls when everything is healthy.
    pub base_interval: Duration,
    /// Ceiling the backoff can grow the interval to.
    pub max_interval: Duration,
    /// Percent of pixels that must differ before the oracle is consulted.
    pub change_threshold: f64,
    /// Consecutive transient failures tolerated before the watch aborts.
    pub max_retries: u32,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_secs(30 * 60),
            base_interval: Duration::from_secs(30),
            max_interval: Duration::from_secs(5 * 60),
            change_threshold: 0.5,
            max_retries: 3,
        }
    }
}

impl WatcherConfig {
    /// Check the invariants: all values positive, `max_interval >= base_interval`.
    pub fn validate(&self) -> Result<(), ErrandError> {
        if self.max_duration.is_zero()
            || self.base_interval.is_zero()
            || self.max_interval.is_zero()
        {
            return Err(ErrandError::ConfigError(
                "watcher durations must be positive".into(),
            ));
        }
        if self.change_threshold <= 0.0 {
            return Err(ErrandError::ConfigError(
                "change threshold must be positive".into(),
            ));
        }
        if self.max_retries == 0 {
            return Err(ErrandError::ConfigError(
                "max retries must be positive".into(),
            ));
        }
        if self.max_interval < self.base_interval {
            return Err(ErrandError::ConfigError(
                "max interval must be >= base interval".into(),
            ));
        }
        Ok(())
    }
}

/// One AI classifier endpoint (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleEndpoint {
    pub url: String,
    pub model: String,
    /// Bearer token; `None` for endpoints that do not require auth.
    pub api_key: Option<String>,
}

/// Classifier provider selection: a primary endpoint, an optional fallback
/// tried when the primary fails, and a per-call deadline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleSettings {
    pub primary: OracleEndpoint,
    pub fallback: Option<OracleEndpoint>,
    /// Deadline for a single classifier call. Without this a hung provider
    /// would stall the entire polling loop.
    pub call_timeout: Duration,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            primary: OracleEndpoint {
                url: "https://api.openai.com/v1/chat/completions".into(),
                model: "gpt-4o-mini".into(),
                api_key: None,
            },
            fallback: None,
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// Telegram transport settings. Absent when no bot token is configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelegramSettings {
    pub bot_token: String,
    /// The single authorized chat.
    pub chat_id: i64,
    /// Long-poll timeout for `getUpdates`.
    pub poll_timeout_secs: u64,
}

/// Top-level settings for the boundary layer, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub execution_enabled: bool,
    pub watcher_enabled: bool,
    pub demo_mode: bool,
    pub watcher: WatcherConfig,
    pub oracle: OracleSettings,
    pub telegram: Option<TelegramSettings>,
    /// How long a blocking operator prompt waits for a reply.
    pub prompt_timeout: Duration,
    /// Screenshot command template; `{path}` is replaced with the output file.
    pub screenshot_cmd: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            execution_enabled: false,
            watcher_enabled: false,
            demo_mode: false,
            watcher: WatcherConfig::default(),
            oracle: OracleSettings::default(),
            telegram: None,
            prompt_timeout: Duration::from_secs(300),
            screenshot_cmd: "spectacle -m -b -n -o {path}".into(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup (injectable for tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        let wd = WatcherConfig::default();
        let od = OracleSettings::default();

        let telegram = lookup("ERRAND_TELEGRAM_TOKEN").and_then(|bot_token| {
            let chat_id = lookup("ERRAND_TELEGRAM_CHAT_ID")?.parse().ok()?;
            Some(TelegramSettings {
                bot_token,
                chat_id,
                poll_timeout_secs: parse_or(lookup("ERRAND_TELEGRAM_POLL_TIMEOUT_SECS"), 30),
            })
        });

        let primary = OracleEndpoint {
            url: lookup("ERRAND_ORACLE_URL").unwrap_or(od.primary.url),
            model: lookup("ERRAND_ORACLE_MODEL").unwrap_or(od.primary.model),
            api_key: lookup("ERRAND_ORACLE_API_KEY"),
        };
        let fallback = lookup("ERRAND_ORACLE_FALLBACK_URL").map(|url| OracleEndpoint {
            model: lookup("ERRAND_ORACLE_FALLBACK_MODEL").unwrap_or_else(|| primary.model.clone()),
            api_key: lookup("ERRAND_ORACLE_FALLBACK_API_KEY").or_else(|| primary.api_key.clone()),
            url,
        });

        Settings {
            execution_enabled: flag(&lookup, "ERRAND_ENABLE_EXECUTION"),
            watcher_enabled: flag(&lookup, "ERRAND_ENABLE_WATCHER"),
            demo_mode: flag(&lookup, "ERRAND_DEMO_MODE"),
            watcher: WatcherConfig {
                max_duration: secs_or(
                    lookup("ERRAND_WATCH_MAX_DURATION_SECS"),
                    wd.max_duration,
                ),
                base_interval: secs_or(
                    lookup("ERRAND_WATCH_BASE_INTERVAL_SECS"),
                    wd.base_interval,
                ),
                max_interval: secs_or(
                    lookup("ERRAND_WATCH_MAX_INTERVAL_SECS"),
                    wd.max_interval,
                ),
                change_threshold: parse_or(
                    lookup("ERRAND_WATCH_CHANGE_THRESHOLD"),
                    wd.change_threshold,
                ),
                max_retries: parse_or(lookup("ERRAND_WATCH_MAX_RETRIES"), wd.max_retries),
            },
            oracle: OracleSettings {
                primary,
                fallback,
                call_timeout: secs_or(lookup("ERRAND_ORACLE_TIMEOUT_SECS"), od.call_timeout),
            },
            telegram,
            prompt_timeout: secs_or(
                lookup("ERRAND_PROMPT_TIMEOUT_SECS"),
                defaults.prompt_timeout,
            ),
            screenshot_cmd: lookup("ERRAND_SCREENSHOT_CMD").unwrap_or(defaults.screenshot_cmd),
        }
    }

    /// The operating mode implied by the feature flags.
    pub fn mode(&self) -> crate::OperatingMode {
        crate::OperatingMode::from_flags(self.execution_enabled, self.demo_mode)
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> bool {
    lookup(key).as_deref() == Some("true")
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn secs_or(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&s| s > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn defaults_are_valid() {
        WatcherConfig::default().validate().expect("defaults should validate");
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert!(!settings.execution_enabled);
        assert!(!settings.watcher_enabled);
        assert!(!settings.demo_mode);
        assert_eq!(settings.watcher, WatcherConfig::default());
        assert!(settings.telegram.is_none());
    }

    #[test]
    fn flags_require_literal_true() {
        let map = HashMap::from([
            ("ERRAND_ENABLE_EXECUTION", "true"),
            ("ERRAND_ENABLE_WATCHER", "1"),
            ("ERRAND_DEMO_MODE", "TRUE"),
        ]);
        let settings = Settings::from_lookup(lookup_from(&map));
        assert!(settings.execution_enabled);
        assert!(!settings.watcher_enabled);
        assert!(!settings.demo_mode);
    }

    #[test]
    fn numeric_overrides_apply() {
        let map = HashMap::from([
            ("ERRAND_WATCH_MAX_DURATION_SECS", "600"),
            ("ERRAND_WATCH_BASE_INTERVAL_SECS", "5"),
            ("ERRAND_WATCH_CHANGE_THRESHOLD", "2.5"),
            ("ERRAND_WATCH_MAX_RETRIES", "7"),
        ]);
        let settings = Settings::from_lookup(lookup_from(&map));
        assert_eq!(settings.watcher.max_duration, Duration::from_secs(600));
        assert_eq!(settings.watcher.base_interval, Duration::from_secs(5));
        assert_eq!(settings.watcher.change_threshold, 2.5);
        assert_eq!(settings.watcher.max_retries, 7);
    }

    #[test]
    fn invalid_numerics_fall_back_to_defaults() {
        let map = HashMap::from([
            ("ERRAND_WATCH_MAX_DURATION_SECS", "soon"),
            ("ERRAND_WATCH_BASE_INTERVAL_SECS", "0"),
            ("ERRAND_WATCH_CHANGE_THRESHOLD", "lots"),
        ]);
        let settings = Settings::from_lookup(lookup_from(&map));
        assert_eq!(settings.watcher, WatcherConfig::default());
    }

    #[test]
    fn telegram_requires_token_and_chat_id() {
        let map = HashMap::from([("ERRAND_TELEGRAM_TOKEN", "123:abc")]);
        let settings = Settings::from_lookup(lookup_from(&map));
        assert!(settings.telegram.is_none(), "chat id missing");

        let map = HashMap::from([
            ("ERRAND_TELEGRAM_TOKEN", "123:abc"),
            ("ERRAND_TELEGRAM_CHAT_ID", "42"),
        ]);
        let settings = Settings::from_lookup(lookup_from(&map));
        let tg = settings.telegram.expect("telegram settings");
        assert_eq!(tg.chat_id, 42);
        assert_eq!(tg.poll_timeout_secs, 30);
    }

    #[test]
    fn fallback_oracle_inherits_primary_model_and_key() {
        let map = HashMap::from([
            ("ERRAND_ORACLE_MODEL", "gpt-4o"),
            ("ERRAND_ORACLE_API_KEY", "sk-primary"),
            ("ERRAND_ORACLE_FALLBACK_URL", "https://fallback.example/v1/chat/completions"),
        ]);
        let settings = Settings::from_lookup(lookup_from(&map));
        let fb = settings.oracle.fallback.expect("fallback endpoint");
        assert_eq!(fb.model, "gpt-4o");
        assert_eq!(fb.api_key.as_deref(), Some("sk-primary"));
    }

    #[test]
    fn validate_rejects_inverted_intervals() {
        let cfg = WatcherConfig {
            base_interval: Duration::from_secs(60),
            max_interval: Duration::from_secs(30),
            ..WatcherConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn mode_follows_flags() {
        let mut settings = Settings::default();
        assert_eq!(settings.mode(), crate::OperatingMode::Disabled);
        settings.execution_enabled = true;
        assert_eq!(settings.mode(), crate::OperatingMode::Normal);
        settings.demo_mode = true;
        assert_eq!(settings.mode(), crate::OperatingMode::Demo);
    }
}
