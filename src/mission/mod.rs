mod collaborators;
mod events;
mod registry;
mod supervisor;
#[cfg(test)]
mod tests;

pub use collaborators::{ChannelBinding, ChannelPorts, MissionScheduler, PortPool, TickBudget};
pub use events::{
    MissionEvent, MissionEventKind, MissionEventReceiver, MissionEventSender, MissionOutcome, mission_event_channel,
};
pub use registry::{MissionRegistry, RegistryError};
pub use supervisor::Supervisor;
