use super::collaborators::{ChannelPorts, MissionScheduler};
use super::events::MissionEventSender;
use crate::flight_control::{FlightSession, Location, SessionState};
use crate::uav::{TailId, TelemetrySnapshot, Uav};
use crate::{flight, warn};
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use strum_macros::Display;

#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum RegistryError {
    UnknownTail(TailId),
    ScheduleFailed(TailId),
}

impl std::error::Error for RegistryError {}

type SessionHandle = Arc<Mutex<FlightSession>>;

/// Concurrent map of active flight sessions keyed by tail id.
///
/// Lock order is map, then session, then collaborators. Ticks only hold the session lock, so a
/// tick never blocks a registry mutation for longer than the tick itself.
/// Sessions are always made terminal before they leave the map, which means
/// a tick that raced with a removal finds a terminal session and does nothing.
pub struct MissionRegistry {
    sessions: RwLock<HashMap<TailId, SessionHandle>>,
    scheduler: Arc<dyn MissionScheduler>,
    ports: Arc<dyn ChannelPorts>,
    events: MissionEventSender,
    tick_secs: f64,
}

impl MissionRegistry {
    pub fn new(
        scheduler: Arc<dyn MissionScheduler>,
        ports: Arc<dyn ChannelPorts>,
        events: MissionEventSender,
        tick_secs: f64,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            scheduler,
            ports,
            events,
            tick_secs,
        }
    }

    fn read_sessions(&self) -> RwLockReadGuard<'_, HashMap<TailId, SessionHandle>> {
        self.sessions.read().expect("[FATAL] RwLock poisoned: Failed to read mission registry")
    }

    fn write_sessions(&self) -> RwLockWriteGuard<'_, HashMap<TailId, SessionHandle>> {
        self.sessions.write().expect("[FATAL] RwLock poisoned: Failed to write mission registry")
    }

    fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, FlightSession> {
        handle.lock().expect("[FATAL] Mutex poisoned: Failed to acquire flight session")
    }

    fn handle(&self, tail_id: TailId) -> Result<SessionHandle, RegistryError> {
        self.read_sessions().get(&tail_id).cloned().ok_or(RegistryError::UnknownTail(tail_id))
    }

    /// Registers `uav` with an idle session. Returns `false` if the tail id
    /// is already registered.
    pub fn add_uav(&self, uav: Uav, destination: Location, cruise_altitude: f64) -> bool {
        let mut sessions = self.write_sessions();
        if sessions.contains_key(&uav.tail_id()) {
            return false;
        }
        let tail_id = uav.tail_id();
        let session = FlightSession::new(uav, destination, cruise_altitude, self.tick_secs, self.events.clone());
        sessions.insert(tail_id, Arc::new(Mutex::new(session)));
        true
    }

    /// Starts a mission for `uav`.
    ///
    /// If the tail id already has a session it is reused: the destination is
    /// switched and the flight (re)started, and the passed `uav` is dropped.
    /// An idle or terminal session is scheduled again before it restarts.
    /// A new session is rolled back if the scheduler rejects it.
    pub fn start_mission(&self, uav: Uav, destination: Location, cruise_altitude: f64) -> Result<(), RegistryError> {
        let tail_id = uav.tail_id();
        let mut sessions = self.write_sessions();
        if let Some(existing) = sessions.get(&tail_id) {
            let mut session = Self::lock_session(existing);
            if !session.is_running() && !self.scheduler.schedule(tail_id) {
                warn!("{tail_id} could not be scheduled, mission not started.");
                return Err(RegistryError::ScheduleFailed(tail_id));
            }
            session.switch_destination(destination, cruise_altitude);
            session.start_flight_path();
            return Ok(());
        }

        let session = FlightSession::new(uav, destination, cruise_altitude, self.tick_secs, self.events.clone());
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(tail_id, Arc::clone(&handle));
        if !self.scheduler.schedule(tail_id) {
            sessions.remove(&tail_id);
            self.ports.release(tail_id);
            warn!("{tail_id} could not be scheduled, mission not started.");
            return Err(RegistryError::ScheduleFailed(tail_id));
        }
        Self::lock_session(&handle).start_flight_path();
        Ok(())
    }

    /// Starts the flight of a session added through [`MissionRegistry::add_uav`].
    pub fn start_registered(&self, tail_id: TailId) -> Result<(), RegistryError> {
        let handle = self.handle(tail_id)?;
        if !self.scheduler.schedule(tail_id) {
            return Err(RegistryError::ScheduleFailed(tail_id));
        }
        Self::lock_session(&handle).start_flight_path();
        Ok(())
    }

    pub fn switch_destination(&self, tail_id: TailId, destination: Location) -> Result<(), RegistryError> {
        let handle = self.handle(tail_id)?;
        let mut session = Self::lock_session(&handle);
        let cruise = session.cruise_altitude();
        session.switch_destination(destination, cruise);
        Ok(())
    }

    /// Cancels the mission of `tail_id`, removes it and releases its channels.
    pub fn abort_mission(&self, tail_id: TailId) -> Result<(), RegistryError> {
        if self.remove_uav(tail_id) {
            flight!("{tail_id} mission aborted on request.");
            Ok(())
        } else {
            Err(RegistryError::UnknownTail(tail_id))
        }
    }

    /// Removes `tail_id` from the registry. A still running session is
    /// cancelled first. Returns `false` if the tail id was not registered.
    pub fn remove_uav(&self, tail_id: TailId) -> bool {
        let mut sessions = self.write_sessions();
        let Some(handle) = sessions.get(&tail_id) else {
            return false;
        };
        Self::lock_session(handle).cancel();
        sessions.remove(&tail_id);
        self.release(tail_id);
        true
    }

    /// Removes `tail_id` only if its session is terminal. A session that was
    /// restarted after its terminal event was queued is left in place.
    pub fn remove_if_terminal(&self, tail_id: TailId) -> bool {
        let mut sessions = self.write_sessions();
        let Some(handle) = sessions.get(&tail_id) else {
            return false;
        };
        if !Self::lock_session(handle).state().is_terminal() {
            return false;
        }
        sessions.remove(&tail_id);
        self.release(tail_id);
        true
    }

    /// Cancels and removes every session. Blocks concurrent starts until the
    /// map is empty and all resources are released, so no mission started
    /// during the clear survives it.
    pub fn abort_all_missions(&self) -> usize {
        let mut sessions = self.write_sessions();
        for handle in sessions.values() {
            Self::lock_session(handle).cancel();
        }
        let removed: Vec<TailId> = sessions.drain().map(|(tail_id, _)| tail_id).collect();
        for tail_id in &removed {
            self.release(*tail_id);
        }
        drop(sessions);
        if !removed.is_empty() {
            flight!("Aborted {} missions.", removed.len());
        }
        removed.len()
    }

    fn release(&self, tail_id: TailId) {
        self.scheduler.unschedule(tail_id);
        self.ports.release(tail_id);
    }

    /// Advances the session of `tail_id` by one tick.
    pub fn tick(&self, tail_id: TailId) -> Result<SessionState, RegistryError> {
        let handle = self.handle(tail_id)?;
        let mut session = Self::lock_session(&handle);
        session.tick();
        Ok(session.state())
    }

    /// Ticks every registered session once.
    pub fn tick_all(&self) -> Vec<(TailId, SessionState)> {
        let handles: Vec<(TailId, SessionHandle)> =
            self.read_sessions().iter().map(|(id, h)| (*id, Arc::clone(h))).collect();
        handles
            .into_iter()
            .map(|(tail_id, handle)| {
                let mut session = Self::lock_session(&handle);
                session.tick();
                (tail_id, session.state())
            })
            .collect()
    }

    pub fn active_tail_ids(&self) -> Vec<TailId> { self.read_sessions().keys().copied().sorted_unstable().collect() }

    pub fn contains(&self, tail_id: TailId) -> bool { self.read_sessions().contains_key(&tail_id) }

    pub fn len(&self) -> usize { self.read_sessions().len() }

    pub fn is_empty(&self) -> bool { self.read_sessions().is_empty() }

    pub fn session_state(&self, tail_id: TailId) -> Option<SessionState> {
        let handle = self.handle(tail_id).ok()?;
        Some(Self::lock_session(&handle).state())
    }

    /// Copy of the current telemetry of `tail_id`.
    pub fn telemetry(&self, tail_id: TailId) -> Option<TelemetrySnapshot> {
        let handle = self.handle(tail_id).ok()?;
        Some(Self::lock_session(&handle).telemetry().clone())
    }

    pub fn destination(&self, tail_id: TailId) -> Option<Location> {
        let handle = self.handle(tail_id).ok()?;
        Some(Self::lock_session(&handle).destination())
    }
}
