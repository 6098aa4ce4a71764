//! Thin example wrapper for the integral explorer demo.
//!
//! The actual state lives in `demos/explorer_state.rs` so it can also back
//! the default `cargo run` binary without duplicating the event-loop and
//! renderer boilerplate.
//!
//! Run:
//! - `cargo run --example explorer`

fn main() -> anyhow::Result<()> {
    env_logger::init();

    riemann::render::app::run_with_builder(
        riemann::render::app::AppConfig {
            title: "riemann: integral explorer".to_string(),
            ..Default::default()
        },
        |window| async move { explorer_state::State::new(window).await },
    )
}

// Include the shared state-only demo implementation.
// This file must not define `fn main()`.
#[path = "explorer_state.rs"]
mod explorer_state;
