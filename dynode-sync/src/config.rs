//! Configuration for the dynode sync controller.

use std::time::Duration;

use crate::types::Network;

/// Minimum protocol version a peer needs before it is asked for governance objects.
pub const MIN_GOVERNANCE_PEER_PROTO_VERSION: u32 = 70206;

/// Configuration for the dynode sync controller.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Network to sync on. Regtest switches on the deterministic shortcut.
    pub network: Network,

    /// The local node runs a dynode. Inbound peers are then most likely other
    /// dynodes checking on us and are not used as sync sources.
    pub local_dynode: bool,

    /// How often the run loop calls the tick driver.
    pub tick_interval: Duration,

    /// Only every Nth tick touches the state machine. Also the per-tick floor of
    /// the governance vote-rate heuristic.
    pub ticks_per_cycle: u64,

    /// Time without progress after which an asset times out.
    pub asset_timeout: Duration,

    /// Gap between processed ticks that is treated as a suspend and restarts sync.
    pub stale_threshold: Duration,

    /// Wait after a failure before sync is restarted.
    pub failure_cooldown: Duration,

    /// Expected number of peer requests per asset, used for progress estimation.
    pub attempts_per_asset: u32,

    /// Minimum protocol version for governance sync requests.
    pub min_governance_proto_version: u32,

    /// Expiry of fulfilled-request markers in the in-memory ledger.
    pub fulfilled_request_ttl: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            local_dynode: false,
            tick_interval: Duration::from_secs(1),
            ticks_per_cycle: 6,
            asset_timeout: Duration::from_secs(30),
            stale_threshold: Duration::from_secs(60 * 60),
            failure_cooldown: Duration::from_secs(60),
            attempts_per_asset: 8,
            min_governance_proto_version: MIN_GOVERNANCE_PEER_PROTO_VERSION,
            fulfilled_request_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl SyncConfig {
    /// Create a new configuration for the given network.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn mainnet() -> Self {
        Self::new(Network::Mainnet)
    }

    pub fn testnet() -> Self {
        Self::new(Network::Testnet)
    }

    pub fn regtest() -> Self {
        Self::new(Network::Regtest)
    }

    /// Mark the local node as a dynode.
    pub fn with_local_dynode(mut self, local_dynode: bool) -> Self {
        self.local_dynode = local_dynode;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_ticks_per_cycle(mut self, ticks: u64) -> Self {
        self.ticks_per_cycle = ticks;
        self
    }

    pub fn with_asset_timeout(mut self, timeout: Duration) -> Self {
        self.asset_timeout = timeout;
        self
    }

    pub fn with_stale_threshold(mut self, threshold: Duration) -> Self {
        self.stale_threshold = threshold;
        self
    }

    pub fn with_failure_cooldown(mut self, cooldown: Duration) -> Self {
        self.failure_cooldown = cooldown;
        self
    }

    pub fn with_attempts_per_asset(mut self, attempts: u32) -> Self {
        self.attempts_per_asset = attempts;
        self
    }

    pub fn with_min_governance_proto_version(mut self, version: u32) -> Self {
        self.min_governance_proto_version = version;
        self
    }

    pub fn with_fulfilled_request_ttl(mut self, ttl: Duration) -> Self {
        self.fulfilled_request_ttl = ttl;
        self
    }

    /// Whether the deterministic shortcut replaces per-peer pacing.
    pub fn is_deterministic(&self) -> bool {
        self.network.is_deterministic()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() {
            return Err("tick_interval must be > 0".to_string());
        }
        if self.ticks_per_cycle == 0 {
            return Err("ticks_per_cycle must be > 0".to_string());
        }
        if self.asset_timeout.is_zero() {
            return Err("asset_timeout must be > 0".to_string());
        }
        if self.stale_threshold <= self.tick_interval {
            return Err("stale_threshold must be longer than tick_interval".to_string());
        }
        if self.failure_cooldown.is_zero() {
            return Err("failure_cooldown must be > 0".to_string());
        }
        if self.attempts_per_asset == 0 {
            return Err("attempts_per_asset must be > 0".to_string());
        }
        if self.fulfilled_request_ttl.is_zero() {
            return Err("fulfilled_request_ttl must be > 0".to_string());
        }
        Ok(())
    }
}
