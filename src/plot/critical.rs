//! Grid-local critical-point detection and markers.
//!
//! Works directly on the sampled grid rather than on derivatives: an
//! interior node strictly above all four axis neighbors is a peak, strictly
//! below is a valley, and a node that is a maximum along one axis while a
//! minimum along the other is a saddle candidate. Resolution-limited by
//! construction — a feature narrower than one grid cell is invisible — but
//! that matches the fidelity of the surface the user is looking at.
//!
//! Markers are small octahedra placed at the sample's world position
//! `(x, z, y)`, colored by kind: peak red, valley blue, saddle amber.

use crate::plot::sample::SurfaceGrid;
use crate::scene::Mesh3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CriticalKind {
    Peak,
    Valley,
    Saddle,
}

impl CriticalKind {
    /// Marker color for this kind.
    pub fn color(self) -> [f32; 3] {
        match self {
            CriticalKind::Peak => [1.0, 0.0, 0.0],
            CriticalKind::Valley => [0.0, 0.0, 1.0],
            CriticalKind::Saddle => [1.0, 0.8, 0.0],
        }
    }
}

/// A classified grid node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CriticalPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub kind: CriticalKind,
}

/// Classify the interior nodes of a sampled grid.
///
/// Boundary nodes are skipped (they lack a full neighborhood). Plateaus
/// produce nothing: all comparisons are strict, so a constant function has
/// no critical points at this granularity.
pub fn find_critical_points(grid: &SurfaceGrid) -> Vec<CriticalPoint> {
    let nodes = grid.nodes_per_axis();
    let mut out = Vec::new();

    if nodes < 3 {
        return out;
    }

    for i in 1..nodes - 1 {
        for j in 1..nodes - 1 {
            let z = grid.point(i, j)[2];
            let left = grid.point(i - 1, j)[2];
            let right = grid.point(i + 1, j)[2];
            let below = grid.point(i, j - 1)[2];
            let above = grid.point(i, j + 1)[2];

            let max_x = z > left && z > right;
            let min_x = z < left && z < right;
            let max_y = z > below && z > above;
            let min_y = z < below && z < above;

            let kind = if max_x && max_y {
                CriticalKind::Peak
            } else if min_x && min_y {
                CriticalKind::Valley
            } else if (max_x && min_y) || (min_x && max_y) {
                CriticalKind::Saddle
            } else {
                continue;
            };

            let [x, y, z] = grid.point(i, j);
            out.push(CriticalPoint { x, y, z, kind });
        }
    }

    out
}

/// Build one mesh holding an octahedron marker per critical point.
pub fn marker_mesh(points: &[CriticalPoint], radius: f32) -> Mesh3 {
    let mut mesh = Mesh3::with_capacity(points.len() * 6, points.len() * 24);

    for p in points {
        push_octahedron(
            &mut mesh,
            [p.x as f32, p.z as f32, p.y as f32],
            radius,
            p.kind.color(),
        );
    }

    mesh
}

/// Octahedron: one vertex out along each signed axis, eight CCW faces.
fn push_octahedron(mesh: &mut Mesh3, center: [f32; 3], r: f32, color: [f32; 3]) {
    let [cx, cy, cz] = center;
    let px = mesh.push_vertex([cx + r, cy, cz], color);
    let nx = mesh.push_vertex([cx - r, cy, cz], color);
    let py = mesh.push_vertex([cx, cy + r, cz], color);
    let ny = mesh.push_vertex([cx, cy - r, cz], color);
    let pz = mesh.push_vertex([cx, cy, cz + r], color);
    let nz = mesh.push_vertex([cx, cy, cz - r], color);

    mesh.indices.extend_from_slice(&[
        px, py, pz, //
        py, nx, pz, //
        nx, ny, pz, //
        ny, px, pz, //
        py, px, nz, //
        nx, py, nz, //
        ny, nx, nz, //
        px, ny, nz, //
    ]);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plot::{Bounds2, sample_surface};
    use approx::assert_relative_eq;

    #[test]
    fn bowl_has_a_single_valley_at_the_origin() {
        let grid = sample_surface("x^2 + y^2", Bounds2::square(-2.0, 2.0), 4);
        let found = find_critical_points(&grid);

        assert_eq!(found.len(), 1);
        let p = found[0];
        assert_eq!(p.kind, CriticalKind::Valley);
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 0.0);
    }

    #[test]
    fn dome_has_a_single_peak() {
        let grid = sample_surface("-(x^2 + y^2)", Bounds2::square(-2.0, 2.0), 4);
        let found = find_critical_points(&grid);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, CriticalKind::Peak);
    }

    #[test]
    fn hyperbolic_paraboloid_has_a_saddle() {
        let grid = sample_surface("x^2 - y^2", Bounds2::square(-2.0, 2.0), 4);
        let found = find_critical_points(&grid);

        let saddles: Vec<_> = found
            .iter()
            .filter(|p| p.kind == CriticalKind::Saddle)
            .collect();
        assert_eq!(saddles.len(), 1);
        assert_relative_eq!(saddles[0].x, 0.0);
        assert_relative_eq!(saddles[0].y, 0.0);
    }

    #[test]
    fn plateaus_produce_no_points() {
        let grid = sample_surface("3", Bounds2::square(-2.0, 2.0), 4);
        assert!(find_critical_points(&grid).is_empty());
    }

    #[test]
    fn markers_place_the_height_on_the_up_axis() {
        let points = [CriticalPoint {
            x: 1.0,
            y: 2.0,
            z: 5.0,
            kind: CriticalKind::Peak,
        }];
        let mesh = marker_mesh(&points, 0.15);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 8);
        // +X vertex of the octahedron around world (1, 5, 2).
        assert_relative_eq!(mesh.positions[0][0], 1.15);
        assert_relative_eq!(mesh.positions[0][1], 5.0);
        assert_relative_eq!(mesh.positions[0][2], 2.0);
        assert_eq!(mesh.colors[0], [1.0, 0.0, 0.0]);
    }
}
