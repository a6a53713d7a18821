/*!
 * Conflator Configuration
 *
 * Runtime configuration for operating mode, throttling, and transport selection
 */

use crate::core::limits::{DEFAULT_PAUSE, MAX_PAUSE};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Who drives the indexing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Background worker indexes continuously
    Daemonized,
    /// Owner calls `conflate(n)` on its own thread
    Synchronous,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daemon" | "daemonized" => Ok(Mode::Daemonized),
            "sync" | "synchronous" => Ok(Mode::Synchronous),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// Ingestion transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressKind {
    /// Unbounded flume channel
    Channel,
    /// Lock-free linked queue with a doorbell for blocking receives
    LockFree,
}

impl FromStr for IngressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "channel" => Ok(IngressKind::Channel),
            "lockfree" | "lock-free" => Ok(IngressKind::LockFree),
            other => Err(format!("unknown ingress '{}'", other)),
        }
    }
}

/// Conflation engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflatorConfig {
    /// Operating mode, fixed for the engine's lifetime
    pub mode: Mode,
    /// Initial daemon pause between indexing iterations
    pub pause: Duration,
    /// Ingestion transport
    pub ingress: IngressKind,
}

impl Default for ConflatorConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Daemonized,
            pause: DEFAULT_PAUSE,
            ingress: IngressKind::Channel,
        }
    }
}

impl ConflatorConfig {
    /// Caller-driven indexing, no background worker
    pub const fn synchronous() -> Self {
        Self {
            mode: Mode::Synchronous,
            pause: DEFAULT_PAUSE,
            ingress: IngressKind::Channel,
        }
    }

    /// Daemonized with a pause that widens the grouping window
    pub fn throttled(pause: Duration) -> Self {
        Self::default().with_pause(pause)
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause.min(MAX_PAUSE);
        self
    }

    pub fn with_ingress(mut self, ingress: IngressKind) -> Self {
        self.ingress = ingress;
        self
    }

    /// Defaults overlaid with `CONFLUX_MODE`, `CONFLUX_PAUSE_MS`, `CONFLUX_INGRESS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an arbitrary variable source
    ///
    /// Unparsable values keep the default and log a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CONFLUX_MODE") {
            match raw.parse() {
                Ok(mode) => config.mode = mode,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring CONFLUX_MODE"),
            }
        }

        if let Some(raw) = lookup("CONFLUX_PAUSE_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config = config.with_pause(Duration::from_millis(ms)),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring CONFLUX_PAUSE_MS"),
            }
        }

        if let Some(raw) = lookup("CONFLUX_INGRESS") {
            match raw.parse() {
                Ok(ingress) => config.ingress = ingress,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring CONFLUX_INGRESS"),
            }
        }

        config
    }
}
