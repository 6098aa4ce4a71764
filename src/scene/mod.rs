//! Scene graph abstractions.
//!
//! The plotting engine produces CPU meshes; this module owns everything
//! between those meshes and the renderer:
//! - You build a scene out of named objects carrying meshes and transforms.
//! - A camera maps world coordinates to clip space.
//! - Renderers consume a flattened list of draw items (mesh + style + z-order).
//!
//! Design goals:
//! - Keep the scene renderer-agnostic: no wgpu types in here, only plain
//!   buffers a renderer can upload.
//! - World coordinates match the plot convention: the function's dependent
//!   value sits on the **+Y (up)** axis, so a sample `(x, y, z)` lands at
//!   world position `(x, z, y)`.
//! - Transforms are explicit and composable
//!   (`world_from_local = parent * local`).
//!
//! Index width:
//! - Mesh indices are `u32`. A surface at resolution `n` has `(n+1)^2`
//!   vertices, which clears `u16::MAX` already at `n = 256`; a 16-bit
//!   buffer would silently wrap and corrupt the triangulation.

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Aabb3 {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb3 {
    #[inline]
    pub fn from_min_max(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1] || self.min[2] > self.max[2]
    }

    #[inline]
    pub fn include_point(&mut self, p: [f32; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    #[inline]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let mut out = self;
        out.include_point(other.min);
        out.include_point(other.max);
        out
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (Vec3::from(self.min) + Vec3::from(self.max)) * 0.5
    }

    /// Radius of the bounding sphere around [`Self::center`].
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        (Vec3::from(self.max) - Vec3::from(self.min)).length() * 0.5
    }

    /// The eight corner points.
    pub fn corners(&self) -> [[f32; 3]; 8] {
        let (mn, mx) = (self.min, self.max);
        [
            [mn[0], mn[1], mn[2]],
            [mx[0], mn[1], mn[2]],
            [mn[0], mx[1], mn[2]],
            [mx[0], mx[1], mn[2]],
            [mn[0], mn[1], mx[2]],
            [mx[0], mn[1], mx[2]],
            [mn[0], mx[1], mx[2]],
            [mx[0], mx[1], mx[2]],
        ]
    }
}

/// Simple RGBA color (linear space assumed; your renderer may treat as sRGB).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// A renderer-agnostic triangle mesh with per-vertex colors.
///
/// `positions` and `colors` are parallel (one entry per vertex); `indices`
/// is grouped in triples, each naming three vertices of one triangle.
/// Winding is counter-clockwise for the outward face.
#[derive(Debug, Clone, Default)]
pub struct Mesh3 {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh3 {
    /// Create an empty mesh with preallocated capacities.
    #[inline]
    pub fn with_capacity(v: usize, i: usize) -> Self {
        Self {
            positions: Vec::with_capacity(v),
            colors: Vec::with_capacity(v),
            indices: Vec::with_capacity(i),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a vertex, returning its index.
    #[inline]
    pub fn push_vertex(&mut self, position: [f32; 3], color: [f32; 3]) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push(position);
        self.colors.push(color);
        idx
    }

    /// Append a mesh into `self`, offsetting indices automatically.
    pub fn append(&mut self, other: &Mesh3) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.colors.extend_from_slice(&other.colors);
        self.indices
            .extend(other.indices.iter().copied().map(|idx| base + idx));
    }

    /// Append a quad given its four corners in CCW order (two triangles).
    pub fn push_quad(&mut self, corners: [[f32; 3]; 4], color: [f32; 3]) {
        let a = self.push_vertex(corners[0], color);
        let b = self.push_vertex(corners[1], color);
        let c = self.push_vertex(corners[2], color);
        let d = self.push_vertex(corners[3], color);
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
}

/// A draw item produced by flattening the scene graph.
///
/// - `world_from_local` must already be fully composed for this item.
/// - `z` is a coarse draw-order hint; depth testing resolves the rest.
#[derive(Debug, Clone)]
pub struct DrawItem3 {
    pub mesh: Mesh3,
    pub fill: Rgba,
    pub world_from_local: Mat4,
    pub z: i32,
}

/// A node in the scene graph.
///
/// Each node has a local transform, children, and an optional mesh payload.
/// The `fill` color multiplies per-vertex colors in the renderer, so a mesh
/// with white vertices draws in `fill` and a color-mapped surface keeps its
/// gradient under `fill = WHITE`.
#[derive(Debug, Clone)]
pub struct Mobject3 {
    pub name: String,
    pub local_from_parent: Mat4,
    pub z: i32,

    pub fill: Rgba,
    pub mesh: Option<Mesh3>,

    pub children: Vec<Mobject3>,

    /// Optional cached bounds in local space.
    ///
    /// If present, this should bound `mesh` and all children in this node's
    /// local space. Compute lazily and store here to support camera framing.
    pub local_bounds: Option<Aabb3>,
}

impl Default for Mobject3 {
    fn default() -> Self {
        Self {
            name: "mobject".to_string(),
            local_from_parent: Mat4::IDENTITY,
            z: 0,
            fill: Rgba::WHITE,
            mesh: None,
            children: Vec::new(),
            local_bounds: None,
        }
    }
}

impl Mobject3 {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn with_mesh(mut self, mesh: Mesh3) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[inline]
    pub fn with_fill(mut self, fill: Rgba) -> Self {
        self.fill = fill;
        self
    }

    #[inline]
    pub fn with_transform(mut self, local_from_parent: Mat4) -> Self {
        self.local_from_parent = local_from_parent;
        self
    }

    #[inline]
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    #[inline]
    pub fn add_child(&mut self, child: Mobject3) {
        self.children.push(child);
    }

    /// Compute a conservative local-space AABB from the mesh and children.
    ///
    /// Child bounds are transformed into this node's local space by
    /// transforming all eight corners (an AABB is not tight under an
    /// arbitrary transform otherwise).
    pub fn compute_local_bounds(&self) -> Aabb3 {
        let mut bounds = Aabb3::empty();

        if let Some(mesh) = &self.mesh {
            for &p in &mesh.positions {
                bounds.include_point(p);
            }
        }

        for child in &self.children {
            let child_bounds = child
                .local_bounds
                .unwrap_or_else(|| child.compute_local_bounds());
            if child_bounds.is_empty() {
                continue;
            }

            for c in child_bounds.corners() {
                let p = child.local_from_parent.transform_point3(Vec3::from(c));
                bounds.include_point(p.to_array());
            }
        }

        bounds
    }

    /// Flatten this subtree into draw items, composing transforms.
    pub fn flatten(&self, parent_from_world: Mat4, out: &mut Vec<DrawItem3>) {
        let world_from_local = parent_from_world * self.local_from_parent;

        if let Some(mesh) = &self.mesh {
            out.push(DrawItem3 {
                mesh: mesh.clone(),
                fill: self.fill,
                world_from_local,
                z: self.z,
            });
        }

        for child in &self.children {
            child.flatten(world_from_local, out);
        }
    }
}

/// An orbiting perspective camera.
///
/// The camera circles a target point at a fixed distance; `yaw` spins around
/// the world up axis and `pitch` tilts above/below the horizon. This matches
/// the interaction model of the explorer (drag to orbit, wheel to zoom).
///
/// The mapping is `clip_from_world = perspective * look_at(eye, target, up)`.
#[derive(Debug, Copy, Clone)]
pub struct Camera3D {
    pub target: Vec3,
    pub distance: f32,
    /// Radians around +Y, measured from +Z toward +X.
    pub yaw: f32,
    /// Radians above the horizontal plane; clamped shy of the poles.
    pub pitch: f32,
    pub fov_y_rad: f32,
    pub viewport_aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Camera3D {
    fn default() -> Self {
        // Start on the (+x, +y, +z) diagonal: the classic "looking down at
        // the origin from (5, 5, 5)" framing with a 60 degree field of view.
        Self {
            target: Vec3::ZERO,
            distance: 5.0f32 * 3.0f32.sqrt(),
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: (1.0f32 / 3.0f32.sqrt()).asin(),
            fov_y_rad: 60f32.to_radians(),
            viewport_aspect: 1.0,
            z_near: 0.1,
            z_far: 500.0,
        }
    }
}

impl Camera3D {
    const MIN_PITCH: f32 = -1.55;
    const MAX_PITCH: f32 = 1.55;
    const MIN_DISTANCE: f32 = 0.5;
    const MAX_DISTANCE: f32 = 200.0;

    /// Set the viewport size in pixels to update aspect ratio.
    #[inline]
    pub fn set_viewport_px(&mut self, width: u32, height: u32) {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        self.viewport_aspect = w / h;
    }

    /// The camera position in world space.
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(cp * sy, sp, cp * cy)
    }

    /// Spin/tilt the camera by the given deltas (radians).
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(Self::MIN_PITCH, Self::MAX_PITCH);
    }

    /// Scale the orbit distance (factor > 1 moves away).
    pub fn zoom_by(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    /// Compute the transform from world space to clip space.
    pub fn clip_from_world(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fov_y_rad,
            self.viewport_aspect.max(1e-3),
            self.z_near,
            self.z_far,
        );
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        proj * view
    }

    /// Frame the given world-space bounds with some margin.
    ///
    /// - `fill_ratio`: fraction of the narrower field-of-view angle the
    ///   bounding sphere should occupy (e.g. 0.8).
    ///
    /// This updates `target` and `distance`, keeping yaw/pitch.
    pub fn frame_bounds(&mut self, bounds: Aabb3, fill_ratio: f32) {
        if bounds.is_empty() {
            return;
        }

        let fill = fill_ratio.clamp(0.05, 0.98);
        let radius = bounds.bounding_radius().max(1e-3);

        // Fit the bounding sphere into the narrower of the two view angles.
        let half_v = self.fov_y_rad * 0.5;
        let half_h = (half_v.tan() * self.viewport_aspect.max(1e-3)).atan();
        let half = half_v.min(half_h);

        self.target = bounds.center();
        self.distance =
            (radius / (half.sin() * fill)).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }
}

/// A top-level scene that holds named objects.
#[derive(Debug, Default)]
pub struct Scene3 {
    pub camera: Camera3D,
    pub roots: Vec<Mobject3>,
    /// A simple name index for convenience.
    pub index: BTreeMap<String, usize>,
}

impl Scene3 {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, m: Mobject3) {
        let idx = self.roots.len();
        self.index.insert(m.name.clone(), idx);
        self.roots.push(m);
    }

    pub fn get(&self, name: &str) -> Option<&Mobject3> {
        self.index.get(name).and_then(|&i| self.roots.get(i))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Mobject3> {
        let i = *self.index.get(name)?;
        self.roots.get_mut(i)
    }

    /// Remove all roots (the explorer rebuilds the scene on every change).
    pub fn clear(&mut self) {
        self.roots.clear();
        self.index.clear();
    }

    /// Flatten the full scene into draw items.
    ///
    /// Caller typically sorts by `z` before rendering.
    pub fn flatten(&self) -> Vec<DrawItem3> {
        let mut items = Vec::new();
        for root in &self.roots {
            root.flatten(Mat4::IDENTITY, &mut items);
        }
        items
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mesh_append_offsets_indices() {
        let mut a = Mesh3::default();
        a.push_vertex([0.0; 3], [1.0; 3]);
        a.push_vertex([1.0, 0.0, 0.0], [1.0; 3]);
        a.push_vertex([0.0, 1.0, 0.0], [1.0; 3]);
        a.indices.extend_from_slice(&[0, 1, 2]);

        let mut b = Mesh3::default();
        b.append(&a);
        b.append(&a);

        assert_eq!(b.vertex_count(), 6);
        assert_eq!(b.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn quad_emits_two_ccw_triangles() {
        let mut m = Mesh3::default();
        m.push_quad(
            [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            [1.0; 3],
        );
        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn flatten_composes_transforms() {
        let mut leaf_mesh = Mesh3::default();
        leaf_mesh.push_vertex([0.0; 3], [1.0; 3]);

        let mut root =
            Mobject3::new("root").with_transform(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        root.add_child(
            Mobject3::new("leaf")
                .with_mesh(leaf_mesh)
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))),
        );

        let mut scene = Scene3::new();
        scene.add_root(root);

        let items = scene.flatten();
        assert_eq!(items.len(), 1);
        let p = items[0].world_from_local.transform_point3(Vec3::ZERO);
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 2.0);
    }

    #[test]
    fn bounds_include_transformed_children() {
        let mut mesh = Mesh3::default();
        mesh.push_vertex([1.0, 1.0, 1.0], [1.0; 3]);
        mesh.push_vertex([-1.0, 0.0, 0.0], [1.0; 3]);

        let mut root = Mobject3::new("root");
        root.add_child(
            Mobject3::new("leaf")
                .with_mesh(mesh)
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0))),
        );

        let b = root.compute_local_bounds();
        assert_relative_eq!(b.min[1], 3.0);
        assert_relative_eq!(b.max[1], 4.0);
    }

    #[test]
    fn union_with_empty_bounds_is_identity() {
        let a = Aabb3::from_min_max([0.0; 3], [1.0; 3]);
        assert_eq!(Aabb3::empty().union(a), a);
        assert_eq!(a.union(Aabb3::empty()), a);
    }

    #[test]
    fn camera_eye_sits_on_the_default_diagonal() {
        let cam = Camera3D::default();
        let eye = cam.eye();
        assert_relative_eq!(eye.x, 5.0, epsilon = 1e-4);
        assert_relative_eq!(eye.y, 5.0, epsilon = 1e-4);
        assert_relative_eq!(eye.z, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn orbit_clamps_pitch() {
        let mut cam = Camera3D::default();
        cam.orbit(0.0, 10.0);
        assert!(cam.pitch <= Camera3D::MAX_PITCH);
        cam.orbit(0.0, -20.0);
        assert!(cam.pitch >= Camera3D::MIN_PITCH);
    }
}
