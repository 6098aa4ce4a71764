//! Thin binary wrapper for local development.
//!
//! Project direction: `riemann` is primarily a **library**.
//! This binary exists only to preserve the convenience of `cargo run`.
//!
//! Default behavior:
//! - Run the integral explorer demo via the library runner (`run_with_builder`).
//! - The actual demo state lives in `demos/explorer_state.rs` and is included
//!   here to avoid duplicating event loop/renderer boilerplate in `main.rs`.
//!
//! Run:
//! - `cargo run`

fn main() -> anyhow::Result<()> {
    // Keep logging setup in the binary so the library remains unopinionated.
    env_logger::init();

    riemann::render::app::run_with_builder(
        riemann::render::app::AppConfig {
            title: "riemann: integral explorer (default)".to_string(),
            ..Default::default()
        },
        |window| async move { explorer_state::State::new(window).await },
    )
}

// Include the shared state-only demo implementation.
// This file must not define `fn main()`.
#[path = "../demos/explorer_state.rs"]
mod explorer_state;
