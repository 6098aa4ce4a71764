//! Rendering module root.
//!
//! The `render` module owns the window/event-loop integration and the GPU
//! renderer. The numeric core never touches these types; it hands plain
//! buffers to [`crate::scene`], and this layer uploads and draws them.
//!
//! Current entrypoint: `render::app::run()`.

pub mod app;

/// Common GPU types used across render submodules.
pub mod gpu;

/// Utility helpers for render-time math, conversions, etc.
pub mod util;

/// A depth-tested, per-vertex-color mesh renderer for scene draw items.
pub mod mesh_renderer;
