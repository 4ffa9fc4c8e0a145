use crate::uav::TailId;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// External tick scheduling. `schedule` returning `false` means the mission
/// could not be started and must be rolled back.
pub trait MissionScheduler: Send + Sync {
    fn schedule(&self, tail_id: TailId) -> bool;
    fn unschedule(&self, tail_id: TailId);
}

/// One telemetry channel of a UAV: the ICD it speaks and the port it is sent to.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct ChannelBinding {
    pub icd: String,
    pub port: u16,
}

/// Owner of per-UAV channel resources.
pub trait ChannelPorts: Send + Sync {
    fn channels(&self, tail_id: TailId) -> Vec<ChannelBinding>;
    /// Frees every channel bound to `tail_id`.
    fn release(&self, tail_id: TailId);
}

/// Scheduler that accepts missions up to a fixed number of concurrently
/// ticked UAVs.
#[derive(Debug)]
pub struct TickBudget {
    capacity: usize,
    scheduled: Mutex<HashSet<TailId>>,
}

impl TickBudget {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            scheduled: Mutex::new(HashSet::new()),
        }
    }

    fn lock_scheduled(&self) -> std::sync::MutexGuard<'_, HashSet<TailId>> {
        self.scheduled.lock().expect("[FATAL] Mutex poisoned: Failed to acquire schedule lock")
    }

    pub fn is_scheduled(&self, tail_id: TailId) -> bool { self.lock_scheduled().contains(&tail_id) }

    pub fn len(&self) -> usize { self.lock_scheduled().len() }
}

impl MissionScheduler for TickBudget {
    fn schedule(&self, tail_id: TailId) -> bool {
        let mut scheduled = self.lock_scheduled();
        if scheduled.contains(&tail_id) {
            return true;
        }
        if scheduled.len() >= self.capacity {
            return false;
        }
        scheduled.insert(tail_id)
    }

    fn unschedule(&self, tail_id: TailId) { self.lock_scheduled().remove(&tail_id); }
}

#[derive(Debug, Default)]
struct PortPoolState {
    next: u16,
    free: Vec<u16>,
    bound: HashMap<TailId, Vec<ChannelBinding>>,
}

/// Hands out UDP ports from a contiguous range and takes them back when a
/// UAV is released.
#[derive(Debug)]
pub struct PortPool {
    state: Mutex<PortPoolState>,
}

impl PortPool {
    pub fn new(base_port: u16) -> Self {
        Self {
            state: Mutex::new(PortPoolState {
                next: base_port,
                ..PortPoolState::default()
            }),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PortPoolState> {
        self.state.lock().expect("[FATAL] Mutex poisoned: Failed to acquire port pool lock")
    }

    /// Binds one channel per ICD name to `tail_id`, replacing earlier bindings.
    /// Returns `None` when the port range is exhausted.
    pub fn bind(&self, tail_id: TailId, icds: &[&str]) -> Option<Vec<ChannelBinding>> {
        let mut state = self.lock_state();
        if let Some(old) = state.bound.remove(&tail_id) {
            state.free.extend(old.into_iter().map(|c| c.port));
        }
        let mut bindings = Vec::with_capacity(icds.len());
        for icd in icds {
            let port = match state.free.pop() {
                Some(port) => port,
                None => {
                    let port = state.next;
                    state.next = state.next.checked_add(1)?;
                    port
                }
            };
            bindings.push(ChannelBinding {
                icd: (*icd).to_string(),
                port,
            });
        }
        state.bound.insert(tail_id, bindings.clone());
        Some(bindings)
    }
}

impl ChannelPorts for PortPool {
    fn channels(&self, tail_id: TailId) -> Vec<ChannelBinding> {
        self.lock_state().bound.get(&tail_id).cloned().unwrap_or_default()
    }

    fn release(&self, tail_id: TailId) {
        let mut state = self.lock_state();
        if let Some(old) = state.bound.remove(&tail_id) {
            state.free.extend(old.into_iter().map(|c| c.port));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_budget_capacity() {
        let budget = TickBudget::new(2);
        assert!(budget.schedule(TailId::new(1)));
        assert!(budget.schedule(TailId::new(1)));
        assert!(budget.schedule(TailId::new(2)));
        assert!(!budget.schedule(TailId::new(3)));
        budget.unschedule(TailId::new(1));
        assert!(budget.schedule(TailId::new(3)));
        assert_eq!(budget.len(), 2);
    }

    #[test]
    fn test_port_pool_reuses_released_ports() {
        let pool = PortPool::new(6000);
        let a = pool.bind(TailId::new(1), &["north", "south"]).unwrap();
        assert_eq!(a.iter().map(|c| c.port).collect::<Vec<_>>(), vec![6000, 6001]);
        pool.release(TailId::new(1));
        assert!(pool.channels(TailId::new(1)).is_empty());
        let b = pool.bind(TailId::new(2), &["north"]).unwrap();
        assert!(b[0].port == 6000 || b[0].port == 6001);
        assert_eq!(pool.channels(TailId::new(2)), b);
    }
}
