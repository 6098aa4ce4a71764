//! `riemann` library crate root.
//!
//! An educational visualizer for one- and two-variable functions: type an
//! expression, pick a domain and resolution, and get a color-mapped surface
//! (or the filled area under a curve) plus a left-Riemann-sum estimate of
//! the definite integral.
//!
//! This crate is intended to be used primarily as a **library**. The binary
//! target should stay thin and call into these exported entrypoints.
//!
//! Module layout (data flows top to bottom):
//! - [`expr`]: expression compilation/evaluation (the engine itself is an
//!   external capability; nothing else in the crate touches its types)
//! - [`plot`]: sampling, triangulation, color mapping, plot furniture
//! - [`integrate`]: Riemann-sum quadrature
//! - [`state`]: the shared, revision-counted explorer configuration
//! - [`scene`]: renderer-agnostic scene graph and orbit camera
//! - [`render`]: wgpu/winit integration consuming flattened scenes
//!
//! Public API philosophy (for now):
//! - Keep modules public so downstream apps can assemble their own pipelines.
//! - Provide a stable `run_app` entrypoint that mirrors the current demo and
//!   is useful for integration tests / bring-up.

pub mod expr;
pub mod integrate;
pub mod plot;
pub mod render;
pub mod scene;
pub mod state;

/// Run the winit/wgpu explorer application (default config).
///
/// This is the same entrypoint used by `main.rs`, but exposed from the
/// library so downstream binaries can stay minimal.
///
/// Note: This function does **not** initialize logging; callers can decide
/// their own logging setup.
pub fn run_app() -> anyhow::Result<()> {
    render::app::run()
}
