#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod flight_control;
mod icd;
mod keychain;
mod logger;
mod mission;
mod transport;
mod uav;

use crate::config::SimConfig;
use crate::flight_control::Location;
use crate::icd::{IcdCatalog, IcdLayoutBuilder};
use crate::keychain::Keychain;
use crate::uav::{Platform, TailId, Uav};
use tokio_util::sync::CancellationToken;

/// Channels every demo UAV streams telemetry on.
const CHANNEL_ICDS: [&str; 2] = [IcdLayoutBuilder::NORTH, IcdLayoutBuilder::SOUTH];

/// (tail id, platform, start, destination, cruise altitude)
const DEMO_MISSIONS: [(u32, Platform, Location, Location, f64); 3] = [
    (
        1,
        Platform::Searcher,
        Location::new(40.6413, -73.7781, 10.0),
        Location::new(40.6460, -73.7785, 100.0),
        400.0,
    ),
    (
        2,
        Platform::Hermes450,
        Location::new(32.0114, 34.8867, 50.0),
        Location::new(32.0650, 34.9400, 300.0),
        600.0,
    ),
    (
        3,
        Platform::Hermes900,
        Location::new(31.2518, 34.7913, 200.0),
        Location::new(31.3300, 34.9000, 200.0),
        1500.0,
    ),
];

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let config = SimConfig::from_env();
    let catalog = init_icds(&config);
    let (keychain, events) = match Keychain::new(&config, catalog).await {
        Ok(res) => res,
        Err(e) => fatal!("Failed to bind telemetry socket: {e}"),
    };
    launch_demo_missions(&keychain);

    let supervisor = keychain.supervisor(events, config.tick_interval());
    supervisor.run(CancellationToken::new(), true).await;
    info!("All missions finished.");
}

/// Generates the channel ICDs, persists them and loads them back, so the
/// catalog always holds exactly what downstream receivers can read.
fn init_icds(config: &SimConfig) -> IcdCatalog {
    for name in CHANNEL_ICDS {
        let layout = IcdLayoutBuilder::new(name).build();
        match layout.save(config.icd_dir()) {
            Ok(path) => log!("ICD '{name}' ({} bits) written to {}.", layout.total_bits(), path.display()),
            Err(e) => fatal!("Failed to persist ICD '{name}': {e:?}"),
        }
    }
    match IcdCatalog::load_dir(config.icd_dir(), &CHANNEL_ICDS) {
        Ok(catalog) => {
            info!("Loaded ICDs {:?}.", catalog.names());
            catalog
        }
        Err(e) => fatal!("Failed to load ICDs: {e:?}"),
    }
}

fn launch_demo_missions(keychain: &Keychain) {
    let registry = keychain.registry();
    let ports = keychain.ports();
    for (id, platform, start, destination, cruise) in DEMO_MISSIONS {
        let tail_id = TailId::new(id);
        let Some(channels) = ports.bind(tail_id, &CHANNEL_ICDS) else {
            warn!("No ports left for {tail_id}, skipping.");
            continue;
        };
        let uav = Uav::new(tail_id, platform, start);
        match registry.start_mission(uav, destination, cruise) {
            Ok(()) => info!(
                "{tail_id} ({platform}) launched, telemetry on ports {:?}.",
                channels.iter().map(|c| c.port).collect::<Vec<_>>()
            ),
            Err(e) => warn!("{tail_id} not launched: {e}"),
        }
    }
    info!("{} missions scheduled.", keychain.budget().len());
}
