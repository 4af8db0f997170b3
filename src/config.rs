//! Runtime configuration for the `btree-trace` tool.
//!
//! Settings are read from environment variables and may then be
//! overridden by command-line flags.
//!
//! # Environment Variables
//!
//! - `BTREE_TRACE_ORDER`: Order of the tree at startup (default: `3`, range `3..=6`)
//! - `BTREE_TRACE_PLAY_DELAY_MS`: Pause between steps for `PLAY` (default: `0`, max `10000`)

use std::time::Duration;

use crate::btree::{DEFAULT_ORDER, MAX_ORDER, MIN_ORDER};

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Order of the tree the session starts with.
    pub order: usize,
    /// Pause between steps while auto-playing a trace.
    pub play_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            play_delay: Duration::ZERO,
        }
    }
}

impl Settings {
    pub const ORDER_VAR: &'static str = "BTREE_TRACE_ORDER";
    pub const PLAY_DELAY_VAR: &'static str = "BTREE_TRACE_PLAY_DELAY_MS";
    pub const MAX_PLAY_DELAY_MS: u64 = 10_000;

    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`, which returns the value of a variable
    /// or `None` when it is unset. Unset variables fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let order = match lookup(Self::ORDER_VAR) {
            Some(raw) => Self::parse_order(Self::ORDER_VAR, &raw)?,
            None => defaults.order,
        };
        let play_delay = match lookup(Self::PLAY_DELAY_VAR) {
            Some(raw) => Self::parse_delay(Self::PLAY_DELAY_VAR, &raw)?,
            None => defaults.play_delay,
        };

        Ok(Self { order, play_delay })
    }

    /// Apply command-line overrides on top of the loaded settings.
    pub fn with_overrides(
        mut self,
        order: Option<usize>,
        play_delay_ms: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(order) = order {
            self.order = Self::check_order("--order", order)?;
        }
        if let Some(ms) = play_delay_ms {
            self.play_delay = Self::check_delay("--play-delay-ms", ms)?;
        }
        Ok(self)
    }

    fn parse_order(name: &str, raw: &str) -> Result<usize, ConfigError> {
        let order = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid(name, format!("{raw:?} is not a whole number")))?;
        Self::check_order(name, order)
    }

    fn check_order(name: &str, order: usize) -> Result<usize, ConfigError> {
        if (MIN_ORDER..=MAX_ORDER).contains(&order) {
            Ok(order)
        } else {
            Err(invalid(
                name,
                format!("order {order} must be between {MIN_ORDER} and {MAX_ORDER}"),
            ))
        }
    }

    fn parse_delay(name: &str, raw: &str) -> Result<Duration, ConfigError> {
        let ms = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid(name, format!("{raw:?} is not a number of milliseconds")))?;
        Self::check_delay(name, ms)
    }

    fn check_delay(name: &str, ms: u64) -> Result<Duration, ConfigError> {
        if ms > Self::MAX_PLAY_DELAY_MS {
            return Err(invalid(
                name,
                format!("{ms}ms exceeds the {}ms maximum", Self::MAX_PLAY_DELAY_MS),
            ));
        }
        Ok(Duration::from_millis(ms))
    }
}

fn invalid(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message,
    }
}
