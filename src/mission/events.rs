use crate::flight_control::{AbortReason, Location};
use crate::uav::TailId;
use std::fmt::{Display, Formatter};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// How a mission reached its terminal state.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum MissionOutcome {
    /// Destination reached within completion tolerances.
    Completed,
    /// An abort condition tripped during a tick.
    Aborted(AbortReason),
    /// Aborted on request through the registry.
    Cancelled,
}

impl Display for MissionOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MissionOutcome::Completed => write!(f, "completed"),
            MissionOutcome::Aborted(reason) => write!(f, "aborted ({reason})"),
            MissionOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MissionEventKind {
    LocationUpdated(Location),
    /// Sent exactly once per terminal transition of a session.
    MissionCompleted(MissionOutcome),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MissionEvent {
    pub tail_id: TailId,
    pub kind: MissionEventKind,
}

pub type MissionEventSender = UnboundedSender<MissionEvent>;
pub type MissionEventReceiver = UnboundedReceiver<MissionEvent>;

pub fn mission_event_channel() -> (MissionEventSender, MissionEventReceiver) { unbounded_channel() }
