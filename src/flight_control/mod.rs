mod abort;
pub(crate) mod common;
mod flight_phase;
mod flight_session;
pub(crate) mod motion_integrator;
mod orientation_controller;
mod speed_controller;

pub use abort::AbortReason;
pub use common::location::Location;
pub use flight_phase::{FlightPhase, PhaseDecision};
pub use flight_session::{FlightSession, SessionState};
pub use orientation_controller::{Orientation, OrientationController};
pub use speed_controller::SpeedController;
