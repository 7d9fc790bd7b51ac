use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::info;

use crate::adapters::{StaticLivenessProbe, SystemTimeSource};
use crate::domain::{DhtConfig, NodeId, RoutingTable, RoutingTableStats, StartError};
use crate::ports::{ConfigProvider, LivenessProbe, TimeSource};

use super::maintenance::{spawn_refresh_thread, StopSignal};

/// DHT service implementing the driving port.
///
/// Construction starts the background sweep; `shutdown` (or dropping the
/// service) stops it and joins the thread.
///
/// # Example
///
/// ```rust
/// use kad_routing::{DhtApi, DhtConfig, DhtService, NodeId};
///
/// let service = DhtService::new(NodeId::random(), DhtConfig::default()).unwrap();
/// assert_eq!(service.get_peer_count(), 0);
/// service.shutdown();
/// ```
pub struct DhtService {
    pub(crate) table: Arc<RoutingTable>,
    pub(crate) config: DhtConfig,
    pub(crate) time_source: Arc<dyn TimeSource>,
    pub(crate) signal: Arc<StopSignal>,
    /// Sweep thread handle, taken exactly once by `shutdown`.
    pub(crate) worker: Mutex<Option<JoinHandle<()>>>,
}

impl DhtService {
    /// Start a service on the system clock with a probe that keeps incumbents.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate or the sweep thread cannot spawn.
    pub fn new(local_node_id: NodeId, config: DhtConfig) -> Result<Self, StartError> {
        Self::with_ports(
            local_node_id,
            config,
            Arc::new(StaticLivenessProbe::default()),
            Arc::new(SystemTimeSource::new()),
        )
    }

    /// Start a service with the configuration supplied by `provider`.
    pub fn from_provider(
        local_node_id: NodeId,
        provider: &dyn ConfigProvider,
    ) -> Result<Self, StartError> {
        Self::new(local_node_id, provider.get_dht_config())
    }

    /// Start a service with explicit probe and clock adapters.
    pub fn with_ports(
        local_node_id: NodeId,
        config: DhtConfig,
        probe: Arc<dyn LivenessProbe>,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, StartError> {
        config.validate()?;

        let table = Arc::new(RoutingTable::new(
            local_node_id,
            config.clone(),
            probe,
            Arc::clone(&time_source),
        ));
        let signal = Arc::new(StopSignal::new());
        let worker = spawn_refresh_thread(
            Arc::clone(&table),
            Arc::clone(&signal),
            config.refresh_interval,
            config.stale_threshold,
        )?;

        info!(
            local_node_id = %local_node_id,
            k = config.k,
            max_peers = config.max_peers,
            refresh_interval = ?config.refresh_interval,
            "DHT service started"
        );

        Ok(Self {
            table,
            config,
            time_source,
            signal,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn config(&self) -> &DhtConfig {
        &self.config
    }

    /// Get the underlying routing table (for advanced operations).
    pub fn routing_table(&self) -> &RoutingTable {
        &self.table
    }

    pub fn stats(&self) -> RoutingTableStats {
        self.table.stats()
    }
}

impl std::fmt::Debug for DhtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhtService")
            .field("table", &self.table)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
