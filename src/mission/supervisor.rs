use super::collaborators::ChannelPorts;
use super::events::{MissionEvent, MissionEventKind, MissionEventReceiver, MissionOutcome};
use super::registry::MissionRegistry;
use crate::icd::{IcdCatalog, compress};
use crate::transport::TelemetrySink;
use crate::uav::TailId;
use crate::{error, flight, info, warn};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodic driver of the registry.
///
/// Every interval all sessions are ticked, then the mission events produced
/// by those ticks are handled: location updates are encoded against each
/// channel's ICD and handed to the sink, terminal sessions are removed from
/// the registry. Event handling never runs while a tick is in progress.
pub struct Supervisor {
    registry: Arc<MissionRegistry>,
    ports: Arc<dyn ChannelPorts>,
    catalog: Arc<IcdCatalog>,
    sink: Arc<dyn TelemetrySink>,
    events: Mutex<MissionEventReceiver>,
    tick_interval: Duration,
}

impl Supervisor {
    pub fn new(
        registry: Arc<MissionRegistry>,
        ports: Arc<dyn ChannelPorts>,
        catalog: Arc<IcdCatalog>,
        sink: Arc<dyn TelemetrySink>,
        events: MissionEventReceiver,
        tick_interval: Duration,
    ) -> Self {
        Self {
            registry,
            ports,
            catalog,
            sink,
            events: Mutex::new(events),
            tick_interval,
        }
    }

    /// Runs until `c_tok` is cancelled, or, with `exit_when_idle`, until no
    /// session is left in the registry.
    pub async fn run(&self, c_tok: CancellationToken, exit_when_idle: bool) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Supervisor started with a {}ms tick.", self.tick_interval.as_millis());
        loop {
            tokio::select! {
                biased;
                () = c_tok.cancelled() => break,
                _ = interval.tick() => {}
            }
            let active = self.step().await;
            if exit_when_idle && active == 0 {
                info!("No missions left, supervisor exiting.");
                break;
            }
        }
    }

    /// One tick of every session followed by event handling. Returns the
    /// number of sessions still registered.
    pub async fn step(&self) -> usize {
        self.registry.tick_all();
        let pending: Vec<MissionEvent> = {
            let mut rx = self.events.lock().await;
            let mut pending = Vec::new();
            while let Ok(event) = rx.try_recv() {
                pending.push(event);
            }
            pending
        };
        for event in pending {
            match event.kind {
                MissionEventKind::LocationUpdated(_) => self.publish(event.tail_id).await,
                MissionEventKind::MissionCompleted(outcome) => self.finalize(event.tail_id, outcome),
            }
        }
        self.registry.len()
    }

    /// Encodes the current telemetry of `tail_id` against every bound
    /// channel ICD and sends all channels concurrently.
    async fn publish(&self, tail_id: TailId) {
        let Some(snapshot) = self.registry.telemetry(tail_id) else {
            return;
        };
        let mut datagrams = Vec::new();
        for channel in self.ports.channels(tail_id) {
            match self.catalog.get(&channel.icd) {
                Some(layout) => datagrams.push((channel.port, compress(&snapshot, layout).to_bytes())),
                None => warn!("{tail_id} bound to unknown ICD '{}'.", channel.icd),
            }
        }
        let sends = datagrams
            .iter()
            .map(|(port, payload)| async move { (*port, self.sink.send(*port, payload).await) });
        for (port, res) in join_all(sends).await {
            if let Err(e) = res {
                error!("{tail_id} telemetry to port {port} failed: {e}");
            }
        }
    }

    /// Removes the session behind a terminal event. Events outlived by a
    /// restart of the same tail id are ignored.
    fn finalize(&self, tail_id: TailId, outcome: MissionOutcome) {
        if self.registry.remove_if_terminal(tail_id) {
            flight!("{tail_id} finalized ({outcome}), {} missions active.", self.registry.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_control::{Location, SessionState};
    use crate::icd::{EncodedTelemetry, IcdLayoutBuilder, decompress};
    use crate::mission::{MissionScheduler, PortPool, TickBudget, mission_event_channel};
    use crate::uav::{Platform, TelemetryField, Uav};
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(u16, Vec<u8>)>>,
    }

    #[async_trait]
    impl TelemetrySink for RecordingSink {
        async fn send(&self, port: u16, payload: &[u8]) -> Result<(), std::io::Error> {
            self.sent.lock().await.push((port, payload.to_vec()));
            Ok(())
        }
    }

    const START: Location = Location::new(32.0, 34.8, 50.0);

    fn supervisor() -> (Supervisor, Arc<MissionRegistry>, Arc<PortPool>, Arc<RecordingSink>) {
        let (tx, rx) = mission_event_channel();
        let ports = Arc::new(PortPool::new(9000));
        let registry = Arc::new(MissionRegistry::new(
            Arc::new(TickBudget::new(16)) as Arc<dyn MissionScheduler>,
            Arc::clone(&ports) as Arc<dyn ChannelPorts>,
            tx,
            1.0,
        ));
        let mut catalog = IcdCatalog::new();
        catalog.insert(IcdLayoutBuilder::new(IcdLayoutBuilder::NORTH).build());
        catalog.insert(IcdLayoutBuilder::new(IcdLayoutBuilder::SOUTH).build());
        let sink = Arc::new(RecordingSink::default());
        let sv = Supervisor::new(
            Arc::clone(&registry),
            Arc::clone(&ports) as Arc<dyn ChannelPorts>,
            Arc::new(catalog),
            Arc::clone(&sink) as Arc<dyn TelemetrySink>,
            rx,
            Duration::from_millis(1),
        );
        (sv, registry, ports, sink)
    }

    #[tokio::test]
    async fn test_step_publishes_on_every_channel() {
        let (sv, registry, ports, sink) = supervisor();
        let tail = TailId::new(11);
        let bound = ports.bind(tail, &[IcdLayoutBuilder::NORTH, IcdLayoutBuilder::SOUTH]).unwrap();
        let uav = Uav::new(tail, Platform::Searcher, START);
        registry.start_mission(uav, Location::new(32.2, 34.9, 300.0), 500.0).unwrap();

        assert_eq!(sv.step().await, 1);
        let sent = sink.sent.lock().await.clone();
        let ports_sent: Vec<u16> = sent.iter().map(|(p, _)| *p).collect();
        assert_eq!(ports_sent, bound.iter().map(|c| c.port).collect::<Vec<_>>());

        let layout = IcdLayoutBuilder::new(IcdLayoutBuilder::NORTH).build();
        let decoded = decompress(&EncodedTelemetry::from_bytes(&sent[0].1).unwrap(), &layout).unwrap();
        let current = registry.telemetry(tail).unwrap();
        assert!((decoded.get(TelemetryField::Latitude) - current.get(TelemetryField::Latitude)).abs() < 1e-6);
        assert_eq!(decoded.get(TelemetryField::FlightTimeSec), 1.0);
    }

    #[tokio::test]
    async fn test_completed_missions_are_finalized() {
        let (sv, registry, ports, sink) = supervisor();
        let tail = TailId::new(12);
        ports.bind(tail, &[IcdLayoutBuilder::NORTH]).unwrap();
        registry.start_mission(Uav::new(tail, Platform::Hermes450, START), START, 500.0).unwrap();

        assert_eq!(sv.step().await, 0);
        assert!(registry.is_empty());
        assert!(ports.channels(tail).is_empty());
        assert!(sink.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_restart_after_abort_survives_queued_cancel() {
        let (sv, registry, _ports, _sink) = supervisor();
        let tail = TailId::new(15);
        let far = Location::new(33.0, 35.0, 400.0);
        registry.start_mission(Uav::new(tail, Platform::Searcher, START), far, 500.0).unwrap();
        registry.abort_mission(tail).unwrap();
        registry.start_mission(Uav::new(tail, Platform::Searcher, START), far, 500.0).unwrap();

        assert_eq!(sv.step().await, 1);
        assert_eq!(registry.session_state(tail), Some(SessionState::Running));
        assert_eq!(sv.step().await, 1);
    }

    #[tokio::test]
    async fn test_restart_after_completion_survives_queued_event() {
        let (sv, registry, _ports, _sink) = supervisor();
        let tail = TailId::new(16);
        registry.start_mission(Uav::new(tail, Platform::Searcher, START), START, 500.0).unwrap();
        assert_eq!(registry.tick(tail), Ok(SessionState::Completed));
        // completion event is still queued when the same tail id is sent on
        let far = Location::new(33.0, 35.0, 400.0);
        registry.start_mission(Uav::new(tail, Platform::Searcher, START), far, 500.0).unwrap();

        assert_eq!(sv.step().await, 1);
        assert_eq!(registry.session_state(tail), Some(SessionState::Running));
        assert_eq!(registry.destination(tail), Some(far));
    }

    #[tokio::test]
    async fn test_steps_never_remove_running_sessions_of_concurrent_restarts() {
        let (sv, registry, _ports, _sink) = supervisor();
        let far = Location::new(33.0, 35.0, 400.0);
        let mutator = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for round in 0..20u32 {
                    for id in 0..8 {
                        let tail = TailId::new(100 + id);
                        let _ = registry.start_mission(Uav::new(tail, Platform::Searcher, START), far, 500.0);
                        if round % 2 == 0 {
                            let _ = registry.abort_mission(tail);
                        }
                    }
                    std::thread::yield_now();
                }
                for id in 0..8 {
                    let tail = TailId::new(100 + id);
                    registry.start_mission(Uav::new(tail, Platform::Searcher, START), far, 500.0).unwrap();
                }
            })
        };
        while !mutator.is_finished() {
            sv.step().await;
            tokio::task::yield_now().await;
        }
        mutator.join().unwrap();

        assert_eq!(sv.step().await, 8);
        for id in 0..8 {
            assert_eq!(registry.session_state(TailId::new(100 + id)), Some(SessionState::Running));
        }
    }

    #[tokio::test]
    async fn test_run_exits_when_idle_or_cancelled() {
        let (sv, registry, _ports, _sink) = supervisor();
        registry.start_mission(Uav::new(TailId::new(13), Platform::Searcher, START), START, 500.0).unwrap();
        let done = tokio::time::timeout(Duration::from_secs(5), sv.run(CancellationToken::new(), true)).await;
        assert!(done.is_ok());
        assert!(registry.is_empty());

        let far = Location::new(33.0, 35.0, 400.0);
        registry.start_mission(Uav::new(TailId::new(14), Platform::Searcher, START), far, 500.0).unwrap();
        let c_tok = CancellationToken::new();
        c_tok.cancel();
        let done = tokio::time::timeout(Duration::from_secs(5), sv.run(c_tok, false)).await;
        assert!(done.is_ok());
        assert_eq!(registry.len(), 1);
    }
}
