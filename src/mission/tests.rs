use super::{
    ChannelPorts, MissionEventKind, MissionOutcome, MissionRegistry, MissionScheduler, PortPool, RegistryError,
    TickBudget, mission_event_channel,
};
use crate::flight_control::{Location, SessionState};
use crate::uav::{Platform, TailId, Uav};
use rand::Rng;
use std::sync::Arc;

const ORIGIN: Location = Location::new(40.6413, -73.7781, 10.0);
const DEST: Location = Location::new(40.70, -73.70, 120.0);

struct Fixture {
    registry: MissionRegistry,
    budget: Arc<TickBudget>,
    ports: Arc<PortPool>,
}

fn fixture(capacity: usize) -> (Fixture, super::MissionEventReceiver) {
    let (tx, rx) = mission_event_channel();
    let budget = Arc::new(TickBudget::new(capacity));
    let ports = Arc::new(PortPool::new(7000));
    let registry = MissionRegistry::new(
        Arc::clone(&budget) as Arc<dyn MissionScheduler>,
        Arc::clone(&ports) as Arc<dyn ChannelPorts>,
        tx,
        1.0,
    );
    (Fixture { registry, budget, ports }, rx)
}

fn uav(id: u32) -> Uav { Uav::new(TailId::new(id), Platform::Hermes450, ORIGIN) }

#[test]
fn test_duplicate_start_reuses_session() {
    let (f, _rx) = fixture(8);
    f.registry.start_mission(uav(1), DEST, 500.0).unwrap();
    f.registry.tick(TailId::new(1)).unwrap();
    let moved = f.registry.telemetry(TailId::new(1)).unwrap();

    let other_dest = Location::new(40.5, -73.9, 80.0);
    f.registry.start_mission(uav(1), other_dest, 300.0).unwrap();
    assert_eq!(f.registry.active_tail_ids(), vec![TailId::new(1)]);
    assert_eq!(f.registry.destination(TailId::new(1)), Some(other_dest));
    // the first UAV keeps flying, the duplicate was not installed
    assert_eq!(f.registry.telemetry(TailId::new(1)).unwrap(), moved);
    assert!(!f.registry.add_uav(uav(1), DEST, 500.0));
}

#[test]
fn test_schedule_failure_rolls_back() {
    let (f, _rx) = fixture(0);
    f.ports.bind(TailId::new(2), &["north"]).unwrap();
    let res = f.registry.start_mission(uav(2), DEST, 500.0);
    assert_eq!(res, Err(RegistryError::ScheduleFailed(TailId::new(2))));
    assert!(f.registry.is_empty());
    assert!(f.ports.channels(TailId::new(2)).is_empty());
}

#[test]
fn test_switch_destination_requires_session() {
    let (f, _rx) = fixture(4);
    let unknown = TailId::new(99);
    assert_eq!(
        f.registry.switch_destination(unknown, DEST),
        Err(RegistryError::UnknownTail(unknown))
    );
    f.registry.start_mission(uav(3), DEST, 500.0).unwrap();
    let new_dest = Location::new(41.0, -74.0, 200.0);
    f.registry.switch_destination(TailId::new(3), new_dest).unwrap();
    assert_eq!(f.registry.destination(TailId::new(3)), Some(new_dest));
}

#[test]
fn test_abort_releases_resources_and_reports_cancel() {
    let (f, mut rx) = fixture(4);
    let tail = TailId::new(4);
    f.ports.bind(tail, &["north", "south"]).unwrap();
    f.registry.start_mission(uav(4), DEST, 500.0).unwrap();
    assert!(f.budget.is_scheduled(tail));
    assert_eq!(f.registry.tick(tail), Ok(SessionState::Running));

    f.registry.abort_mission(tail).unwrap();
    assert!(!f.registry.contains(tail));
    assert!(!f.budget.is_scheduled(tail));
    assert!(f.ports.channels(tail).is_empty());
    assert_eq!(f.registry.tick(tail), Err(RegistryError::UnknownTail(tail)));
    assert_eq!(f.registry.abort_mission(tail), Err(RegistryError::UnknownTail(tail)));

    let mut outcomes = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let MissionEventKind::MissionCompleted(outcome) = event.kind {
            outcomes.push(outcome);
        }
    }
    assert_eq!(outcomes, vec![MissionOutcome::Cancelled]);
}

#[test]
fn test_add_then_start_registered() {
    let (f, _rx) = fixture(1);
    assert!(f.registry.add_uav(uav(5), DEST, 500.0));
    assert_eq!(f.registry.session_state(TailId::new(5)), Some(SessionState::Idle));
    f.registry.start_registered(TailId::new(5)).unwrap();
    assert_eq!(f.registry.session_state(TailId::new(5)), Some(SessionState::Running));

    assert!(f.registry.add_uav(uav(6), DEST, 500.0));
    assert_eq!(
        f.registry.start_registered(TailId::new(6)),
        Err(RegistryError::ScheduleFailed(TailId::new(6)))
    );
    assert!(f.registry.remove_uav(TailId::new(6)));
    assert!(!f.registry.remove_uav(TailId::new(6)));
}

#[test]
fn test_abort_all_against_concurrent_starts() {
    let (f, _rx) = fixture(usize::MAX);
    let mut rng = rand::rng();
    let batches: Vec<Vec<u32>> = (0..4u32)
        .map(|t| (0..50).map(|i| t * 1000 + i + rng.random_range(0..10) * 100).collect())
        .collect();

    std::thread::scope(|s| {
        for ids in &batches {
            let registry = &f.registry;
            s.spawn(move || {
                for id in ids {
                    let _ = registry.start_mission(uav(*id), DEST, 500.0);
                    let _ = registry.tick(TailId::new(*id));
                }
            });
        }
        s.spawn(|| {
            for _ in 0..20 {
                f.registry.abort_all_missions();
                std::thread::yield_now();
            }
        });
    });

    for tail in f.registry.active_tail_ids() {
        assert_eq!(f.registry.session_state(tail), Some(SessionState::Running));
        assert!(f.budget.is_scheduled(tail));
    }
    assert_eq!(f.budget.len(), f.registry.len());

    let remaining = f.registry.len();
    assert_eq!(f.registry.abort_all_missions(), remaining);
    assert!(f.registry.is_empty());
    assert_eq!(f.budget.len(), 0);
}

#[test]
fn test_tick_all_reports_every_session() {
    let (f, _rx) = fixture(4);
    f.registry.start_mission(uav(7), DEST, 500.0).unwrap();
    f.registry.start_mission(uav(8), ORIGIN, 500.0).unwrap();
    let mut states = f.registry.tick_all();
    states.sort_by_key(|(tail, _)| *tail);
    assert_eq!(
        states,
        vec![(TailId::new(7), SessionState::Running), (TailId::new(8), SessionState::Completed)]
    );
}

#[test]
fn test_start_of_added_uav_respects_schedule_budget() {
    let (f, _rx) = fixture(0);
    let tail = TailId::new(9);
    assert!(f.registry.add_uav(uav(9), DEST, 500.0));
    assert_eq!(f.registry.start_mission(uav(9), DEST, 500.0), Err(RegistryError::ScheduleFailed(tail)));
    assert_eq!(f.registry.session_state(tail), Some(SessionState::Idle));
    assert!(!f.budget.is_scheduled(tail));
}

#[test]
fn test_restart_of_completed_session_keeps_budget_in_step() {
    let (f, _rx) = fixture(1);
    f.registry.start_mission(uav(10), ORIGIN, 500.0).unwrap();
    assert_eq!(f.registry.tick(TailId::new(10)), Ok(SessionState::Completed));
    f.registry.start_mission(uav(10), DEST, 500.0).unwrap();
    assert_eq!(f.registry.session_state(TailId::new(10)), Some(SessionState::Running));
    assert_eq!(f.budget.len(), f.registry.len());

    assert!(f.registry.add_uav(uav(11), DEST, 500.0));
    assert_eq!(
        f.registry.start_mission(uav(11), DEST, 500.0),
        Err(RegistryError::ScheduleFailed(TailId::new(11)))
    );
}
