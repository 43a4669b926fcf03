//! # Dispatcher configuration.
//!
//! Provides [`Config`], the centralized settings consumed by
//! [`DispatcherBuilder`](crate::DispatcherBuilder).
//!
//! ## Sentinel values
//! - `max_stores = 0` → unlimited
//!
//! `Config` is `serde`-serializable so hosts can embed it in their own config
//! files; missing fields fall back to [`Config::default`].
//!
//! ## Example
//! ```rust
//! use storevisor::Config;
//!
//! let cfg: Config = serde_json::from_str(r#"{ "max_stores": 8 }"#).unwrap();
//! assert_eq!(cfg.store_limit(), Some(8));
//! assert!(cfg.round_events);
//! ```

use serde::{Deserialize, Serialize};

/// Global configuration for a dispatcher.
///
/// ## Field semantics
/// - `max_stores`: Maximum number of registered stores (`0` = unlimited)
/// - `round_events`: Emit a `RoundCompleted` event after every resolution round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of stores the registry accepts.
    ///
    /// - `0` = unlimited
    /// - `n > 0` = building with more than `n` stores fails with `InvalidSpec`
    pub max_stores: usize,

    /// Whether resolution rounds are reported to subscribers.
    ///
    /// Rounds only happen when stores wait on each other; disable to keep
    /// subscriber traffic to one event per store.
    pub round_events: bool,
}

impl Config {
    /// Returns the store limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` stores
    #[inline]
    pub fn store_limit(&self) -> Option<usize> {
        if self.max_stores == 0 {
            None
        } else {
            Some(self.max_stores)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_stores = 0` (unlimited)
    /// - `round_events = true`
    fn default() -> Self {
        Self {
            max_stores: 0,
            round_events: true,
        }
    }
}
