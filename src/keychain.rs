use crate::config::SimConfig;
use crate::icd::IcdCatalog;
use crate::mission::{
    ChannelPorts, MissionEventReceiver, MissionRegistry, MissionScheduler, PortPool, Supervisor, TickBudget,
    mission_event_channel,
};
use crate::transport::{TelemetrySink, UdpTelemetrySink};
use std::sync::Arc;
use std::time::Duration;

/// Struct bundling the shared components of the simulator: the mission
/// registry, its scheduling and port collaborators, the ICD catalog and
/// the telemetry sink.
#[derive(Clone)]
pub struct Keychain {
    /// The registry holding every active flight session.
    registry: Arc<MissionRegistry>,
    /// The scheduler limiting how many missions are ticked at once.
    budget: Arc<TickBudget>,
    /// The pool handing out telemetry ports per UAV channel.
    ports: Arc<PortPool>,
    /// The loaded ICD layouts, by name.
    catalog: Arc<IcdCatalog>,
    /// The transport encoded telemetry is handed to.
    sink: Arc<dyn TelemetrySink>,
}

impl Keychain {
    /// Upper bound of concurrently scheduled missions.
    pub const MAX_ACTIVE_MISSIONS: usize = 64;

    /// Creates a new instance of `Keychain` asynchronously.
    ///
    /// # Arguments
    /// - `config`: The runtime configuration.
    /// - `catalog`: The validated ICD layouts telemetry is encoded against.
    ///
    /// # Returns
    /// The keychain and the receiving end of the mission event channel, or
    /// the error raised while binding the telemetry socket.
    pub async fn new(config: &SimConfig, catalog: IcdCatalog) -> Result<(Self, MissionEventReceiver), std::io::Error> {
        let sink: Arc<dyn TelemetrySink> = Arc::new(UdpTelemetrySink::bind(config.telemetry_host()).await?);
        let (tx, rx) = mission_event_channel();
        let budget = Arc::new(TickBudget::new(Self::MAX_ACTIVE_MISSIONS));
        let ports = Arc::new(PortPool::new(config.base_port()));
        let registry = Arc::new(MissionRegistry::new(
            Arc::clone(&budget) as Arc<dyn MissionScheduler>,
            Arc::clone(&ports) as Arc<dyn ChannelPorts>,
            tx,
            config.tick_secs(),
        ));
        let keychain = Self {
            registry,
            budget,
            ports,
            catalog: Arc::new(catalog),
            sink,
        };
        Ok((keychain, rx))
    }

    /// Provides a cloned reference to the mission registry.
    pub fn registry(&self) -> Arc<MissionRegistry> { Arc::clone(&self.registry) }

    /// Provides a cloned reference to the tick budget.
    pub fn budget(&self) -> Arc<TickBudget> { Arc::clone(&self.budget) }

    /// Provides a cloned reference to the port pool.
    pub fn ports(&self) -> Arc<PortPool> { Arc::clone(&self.ports) }

    /// Provides a cloned reference to the ICD catalog.
    pub fn catalog(&self) -> Arc<IcdCatalog> { Arc::clone(&self.catalog) }

    /// Builds the supervisor driving this keychain's registry.
    ///
    /// # Arguments
    /// - `events`: The receiver returned by [`Keychain::new`].
    /// - `tick_interval`: Real time between two ticks.
    pub fn supervisor(&self, events: MissionEventReceiver, tick_interval: Duration) -> Supervisor {
        Supervisor::new(
            self.registry(),
            Arc::clone(&self.ports) as Arc<dyn ChannelPorts>,
            self.catalog(),
            Arc::clone(&self.sink),
            events,
            tick_interval,
        )
    }
}
