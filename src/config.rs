//! WolfSQL Configuration
//!
//! Options shared by both pools of a cluster handle.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cluster construction options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Milliseconds between health-check cycles over quarantined endpoints
    #[serde(default = "default_health_check_period_ms")]
    pub health_check_period_ms: u64,

    /// Concurrent health-probe workers per pool (<= 0 selects the default,
    /// values are clamped to the pool size and a hard cap)
    #[serde(default = "default_health_workers")]
    pub health_workers: i64,

    /// Require `wsrep_ready = ON` for an endpoint to count as healthy.
    /// Only consulted for MySQL-family drivers (Galera clusters).
    #[serde(default)]
    pub wsrep_aware: bool,

    /// Skip the initial ping on each endpoint during construction
    #[serde(default)]
    pub lazy: bool,

    /// Maximum open connections per endpoint pool
    #[serde(default = "default_max_open_conns")]
    pub max_open_conns: u32,

    /// Maximum idle connections per endpoint pool
    #[serde(default = "default_max_idle_conns")]
    pub max_idle_conns: u32,

    /// Maximum connection lifetime in milliseconds (None = unbounded)
    #[serde(default)]
    pub conn_max_lifetime_ms: Option<u64>,

    /// How long an acquire (and therefore a ping) may wait for a
    /// connection before the endpoint counts as unreachable
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            health_check_period_ms: default_health_check_period_ms(),
            health_workers: default_health_workers(),
            wsrep_aware: false,
            lazy: false,
            max_open_conns: default_max_open_conns(),
            max_idle_conns: default_max_idle_conns(),
            conn_max_lifetime_ms: None,
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

fn default_health_check_period_ms() -> u64 {
    500
}

fn default_health_workers() -> i64 {
    2
}

fn default_max_open_conns() -> u32 {
    10
}

fn default_max_idle_conns() -> u32 {
    2
}

fn default_acquire_timeout_ms() -> u64 {
    3000
}

impl ClusterOptions {
    /// Get the health-check period as a Duration
    pub fn health_check_period(&self) -> Duration {
        Duration::from_millis(self.health_check_period_ms)
    }

    /// Get the connection max lifetime as a Duration
    pub fn conn_max_lifetime(&self) -> Option<Duration> {
        self.conn_max_lifetime_ms.map(Duration::from_millis)
    }

    /// Get the acquire timeout as a Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Enable lazy construction (no initial ping)
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Enable the Galera wsrep_ready health predicate
    pub fn wsrep_aware(mut self) -> Self {
        self.wsrep_aware = true;
        self
    }

    /// Set the health-check period in milliseconds
    pub fn with_health_check_period_ms(mut self, ms: u64) -> Self {
        self.health_check_period_ms = ms;
        self
    }

    /// Set the number of health-probe workers
    pub fn with_health_workers(mut self, workers: i64) -> Self {
        self.health_workers = workers;
        self
    }

    /// Set the per-endpoint connection cap
    pub fn with_max_open_conns(mut self, n: u32) -> Self {
        self.max_open_conns = n;
        self
    }

    /// Set the acquire timeout in milliseconds
    pub fn with_acquire_timeout_ms(mut self, ms: u64) -> Self {
        self.acquire_timeout_ms = ms;
        self
    }
}

/// Recorded connection limits of one endpoint pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnLimits {
    pub max_open: u32,
    pub max_idle: u32,
    pub max_lifetime_ms: Option<u64>,
}

impl ConnLimits {
    pub(crate) fn from_options(options: &ClusterOptions) -> Self {
        Self {
            max_open: options.max_open_conns,
            max_idle: options.max_idle_conns,
            max_lifetime_ms: options.conn_max_lifetime_ms,
        }
    }
}
