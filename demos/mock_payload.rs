// Print one generated mock payload, plus the current values and alerts it produces.
//
// Usage: cargo run --example mock_payload -- [SEED]

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::env;
use weatherdash::models::PULL_CHANNELS;
use weatherdash::pipeline::{DashboardState, Event};
use weatherdash::source::{self, now_ms};

fn main() -> anyhow::Result<()> {
    let mut rng = match env::args().nth(1).and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let at = now_ms();
    let response = source::generate(at, &mut rng);
    let state = DashboardState::new(source::DATA_POINTS).apply_all(Event::from_response(response), at);

    for channel in PULL_CHANNELS {
        println!(
            "{:<12} current={:>8.2} alert={}",
            channel.native_name(),
            state.current(channel),
            state.alert(channel)
        );
    }
    println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
    Ok(())
}
