//! Reusable state-only implementation for the integral explorer demo.
//!
//! This file is intentionally **not** an example binary (no `fn main()`).
//! It is meant to be reused by:
//! - `demos/explorer.rs` (thin wrapper that calls the library runner)
//! - `src/main.rs` (default `cargo run` entrypoint)
//!
//! The state renders one of three views of the current expression:
//! - `Surface`: color-mapped sheet of `z = f(x, y)` with optional
//!   critical-point markers
//! - `Area`: filled ribbon under `y = f(x)` with its Riemann-sum estimate
//! - `Slice`: the curve `f(x, y0)` at an adjustable `y0`
//! plus the reference grid and axis lines.
//!
//! Controls (also logged at startup):
//! - drag = orbit, wheel = zoom, Space = auto-spin
//! - Tab = cycle view, 1/2/3 = function templates
//! - `+`/`-` = resolution, `[`/`]` = shrink/grow bounds, `,`/`.` = slice y0
//! - g/a/c = toggle grid/axes/markers, p = swap color normalization
//!
//! Debug toggles (environment variables):
//! - `RIEMANN_DEBUG_TRIANGLE=0|1` (default: 0) full-screen pipeline check
//! - `RIEMANN_HIGH_CONTRAST=0|1`  (default: 0) brighter reference grid

use std::sync::Arc;

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{Key, NamedKey},
    window::Window,
};

use riemann::{
    expr::templates::TEMPLATES,
    integrate,
    plot::{
        self, Palette,
        critical::{find_critical_points, marker_mesh},
        grid::{axis_lines, reference_grid},
    },
    render::{app::AppState, gpu::Gpu, mesh_renderer::MeshRenderer, util::FrameClock},
    scene::{Mobject3, Rgba, Scene3},
    state::{PlotState, ViewMode},
};

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => true,
            "0" | "false" | "no" | "n" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Explorer demo state.
///
/// This is designed to be driven by the library runner:
/// - `riemann::render::app::run_with_builder(..., |window| async move { State::new(window).await })`
pub struct State {
    pub window: Arc<Window>,
    pub gpu: Gpu,

    pub scene: Scene3,
    pub renderer: MeshRenderer,
    pub plot: PlotState,

    /// Revision of `plot` the scene was last built from.
    built_revision: Option<u64>,

    clock: FrameClock,
    spinning: bool,

    dragging: bool,
    pointer: Option<PhysicalPosition<f64>>,

    high_contrast: bool,
}

impl State {
    /// Construct the demo state.
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gpu = Gpu::new(window.clone()).await?;

        let mut scene = Scene3::new();
        scene
            .camera
            .set_viewport_px(gpu.size.width.max(1), gpu.size.height.max(1));

        let mut renderer = MeshRenderer::new(&gpu)?;
        if env_flag("RIEMANN_DEBUG_TRIANGLE", false) {
            renderer.set_debug_fullscreen_triangle(true);
        }

        log::info!(
            "controls: drag = orbit, wheel = zoom, Space = spin, Tab = view, \
             1/2/3 = templates, +/- = resolution, [/] = bounds, ,/. = slice y0, \
             g/a/c = grid/axes/markers, p = palette"
        );

        let mut state = Self {
            window,
            gpu,
            scene,
            renderer,
            plot: PlotState::new(),
            built_revision: None,
            clock: FrameClock::new(),
            spinning: false,
            dragging: false,
            pointer: None,
            high_contrast: env_flag("RIEMANN_HIGH_CONTRAST", false),
        };

        state.rebuild_scene();

        // Frame the camera on the first surface once, then leave it under
        // user control; re-framing on every keystroke would fight the mouse.
        if let Some(root) = state.scene.get("surface") {
            let bounds = root.compute_local_bounds();
            state.scene.camera.frame_bounds(bounds, 0.8);
        }

        Ok(state)
    }

    /// Rebuild all plot geometry from the current `PlotState`.
    ///
    /// Everything is recomputed from scratch: buffers are cheap at these
    /// resolutions and stale-cache bugs are not.
    fn rebuild_scene(&mut self) {
        let expression = self.plot.expression().to_string();
        let palette = self.plot.palette();
        let resolution = self.plot.resolution();

        self.scene.clear();

        if self.plot.show_grid() {
            // #444 normally, #888 in high-contrast mode.
            let level = if self.high_contrast { 0.53 } else { 0.27 };
            self.scene.add_root(
                Mobject3::new("grid")
                    .with_mesh(reference_grid(10.0, 20))
                    .with_fill(Rgba::new(level, level, level, 1.0))
                    .with_z(-10),
            );
        }

        if self.plot.show_axes() {
            self.scene.add_root(
                Mobject3::new("axes")
                    .with_mesh(axis_lines(5.0))
                    .with_z(-5),
            );
        }

        match self.plot.view() {
            ViewMode::Surface => {
                let grid =
                    plot::sample_surface(&expression, self.plot.surface_bounds(), resolution);
                let mesh = plot::surface_mesh(&grid, palette);
                log::info!(
                    "surface: {:?} over {:?}, {} vertices / {} triangles",
                    expression,
                    self.plot.surface_bounds(),
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
                self.scene
                    .add_root(Mobject3::new("surface").with_mesh(mesh));

                if self.plot.show_critical_points() {
                    let points = find_critical_points(&grid);
                    if !points.is_empty() {
                        log::info!("critical points: {}", points.len());
                        self.scene.add_root(
                            Mobject3::new("critical_points")
                                .with_mesh(marker_mesh(&points, 0.15))
                                .with_z(5),
                        );
                    }
                }
            }
            ViewMode::Area => {
                let bounds = self.plot.curve_bounds();
                let curve = plot::sample_curve(&expression, bounds, resolution);
                self.scene
                    .add_root(Mobject3::new("area").with_mesh(plot::area_mesh(&curve, palette)));

                match integrate::area_under_curve(&expression, bounds, resolution) {
                    Ok(area) => log::info!(
                        "area under {:?} over [{}, {}] ~= {:.6}",
                        expression,
                        bounds.min,
                        bounds.max,
                        area
                    ),
                    Err(err) => log::warn!("integral unavailable: {err}"),
                }
            }
            ViewMode::Slice => {
                let bounds = self.plot.curve_bounds();
                let y0 = self.plot.slice_y();
                let curve = plot::sample_slice(&expression, bounds, y0, resolution);
                self.scene
                    .add_root(Mobject3::new("slice").with_mesh(plot::area_mesh(&curve, palette)));

                match integrate::slice_area(&expression, bounds, y0, resolution) {
                    Ok(area) => log::info!(
                        "slice area at y = {} ~= {:.6}",
                        y0,
                        area
                    ),
                    Err(err) => log::warn!("integral unavailable: {err}"),
                }
            }
        }

        self.built_revision = Some(self.plot.revision());
    }

    fn handle_key(&mut self, key: &Key) -> bool {
        match key {
            Key::Named(NamedKey::Tab) => self.plot.cycle_view(),
            Key::Named(NamedKey::Space) => {
                self.spinning = !self.spinning;
                // Restart the clock so the first spin frame gets a sane dt.
                self.clock.reset();
            }
            Key::Character(c) => match c.as_str() {
                "1" | "2" | "3" => {
                    let idx = (c.as_bytes()[0] - b'1') as usize;
                    self.plot.set_expression(TEMPLATES[idx].expr);
                    log::info!("template: {}", TEMPLATES[idx].display);
                }
                "+" | "=" => {
                    let r = self.plot.resolution().saturating_add(5);
                    self.plot.set_resolution(r);
                }
                "-" => {
                    let r = self.plot.resolution().saturating_sub(5);
                    self.plot.set_resolution(r);
                }
                "[" => {
                    self.plot.scale_surface_bounds(0.8);
                    self.plot.scale_curve_bounds(0.8);
                }
                "]" => {
                    self.plot.scale_surface_bounds(1.25);
                    self.plot.scale_curve_bounds(1.25);
                }
                "," => self.plot.set_slice_y(self.plot.slice_y() - 0.5),
                "." => self.plot.set_slice_y(self.plot.slice_y() + 0.5),
                "g" => self.plot.toggle_grid(),
                "a" => self.plot.toggle_axes(),
                "c" => self.plot.toggle_critical_points(),
                "p" => {
                    let next = match self.plot.palette() {
                        Palette::DomainExtent => Palette::ValueExtent,
                        Palette::ValueExtent => Palette::DomainExtent,
                    };
                    log::info!("palette normalization: {:?}", next);
                    self.plot.set_palette(next);
                }
                _ => return false,
            },
            _ => return false,
        }
        true
    }

    /// Forward resize events to the GPU and camera.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.scene
            .camera
            .set_viewport_px(self.gpu.size.width.max(1), self.gpu.size.height.max(1));
    }

    /// Render one frame (rebuilding plot geometry first if the state changed).
    pub fn render(&mut self) -> anyhow::Result<()> {
        if self.built_revision != Some(self.plot.revision()) {
            self.rebuild_scene();
        }

        let dt = self.clock.tick();
        if self.spinning {
            self.scene.camera.orbit(dt * 0.4, 0.0);
        }

        // Acquire frame (handle recoverable surface errors).
        let (surface_texture, view) = match self.gpu.acquire_frame() {
            Ok(v) => v,
            Err(wgpu::SurfaceError::Outdated) | Err(wgpu::SurfaceError::Lost) => {
                self.gpu.resize(self.gpu.size);
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow::anyhow!("wgpu SurfaceError::OutOfMemory"));
            }
            Err(wgpu::SurfaceError::Other) => {
                self.gpu.resize(self.gpu.size);
                self.window.request_redraw();
                return Ok(());
            }
        };

        // Encode pass
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.05,
                            g: 0.06,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut items = self.scene.flatten();
            items.sort_by_key(|it| it.z);

            self.renderer
                .draw_items(&self.gpu, &mut pass, &self.scene.camera, &items)?;
        }

        // Submit and present
        self.gpu.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        // Keep animating without a tight loop by requesting the next frame here.
        if self.spinning {
            self.window.request_redraw();
        }

        Ok(())
    }
}

impl AppState for State {
    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        Self::resize(self, new_size)
    }

    fn render(&mut self) -> anyhow::Result<()> {
        Self::render(self)
    }

    fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.handle_key(&event.logical_key)
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let moved = if self.dragging {
                    if let Some(last) = self.pointer {
                        let dx = (position.x - last.x) as f32;
                        let dy = (position.y - last.y) as f32;
                        self.scene.camera.orbit(-dx * 0.005, -dy * 0.005);
                        true
                    } else {
                        false
                    }
                } else {
                    false
                };
                self.pointer = Some(*position);
                moved
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 60.0) as f32,
                };
                self.scene.camera.zoom_by(0.9f32.powf(lines));
                true
            }
            _ => false,
        }
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }
}
