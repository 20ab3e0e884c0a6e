//! Spin Clash headless runner
//!
//! Plays one seeded match to completion and logs the result.
//!
//! Usage: `spin-clash [seed] [launch_angle] [tuning.json]`

/// Two minutes of 60 Hz frames
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u64 = 60 * 120;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use spin_clash::Tuning;
    use spin_clash::sim::{FrameInput, SimEvent, Simulation};

    env_logger::init();
    log::info!("Spin Clash (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args.first().and_then(|s| s.parse::<u64>().ok()).unwrap_or(12345);
    let angle = args.get(1).and_then(|s| s.parse::<f32>().ok()).unwrap_or(0.0);
    let tuning = match args.get(2) {
        Some(path) => Tuning::load_or_default(Path::new(path)),
        None => Tuning::default(),
    };

    let mut sim = match Simulation::with_seed(tuning, seed) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let mut input = FrameInput {
        launch: Some(angle),
        ..Default::default()
    };
    let mut hits = 0usize;
    while sim.state().frame < MAX_FRAMES && sim.outcome().is_none() {
        sim.frame(&input);
        input = FrameInput::default();
        hits += sim
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::Collision { .. }))
            .count();
    }

    for snap in sim.snapshot() {
        log::info!(
            "entity {}: spin {:.1}/{:.0}, dead={}, at ({:.1}, {:.1})",
            snap.id.0,
            snap.current_spin,
            snap.max_spin,
            snap.is_dead,
            snap.position.x,
            snap.position.y
        );
    }
    log::info!(
        "Finished after {} frames, {} hit exchanges: {:?}",
        sim.state().frame,
        hits / 2,
        sim.outcome()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on wasm; the host drives `Simulation` directly
}
