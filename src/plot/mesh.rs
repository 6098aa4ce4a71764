//! Triangulation of sampled functions into renderable meshes.
//!
//! Two builders live here:
//! - [`surface_mesh`] turns a [`SurfaceGrid`] into a shaded sheet.
//! - [`area_mesh`] turns [`CurveSamples`] into a filled ribbon between the
//!   curve and the baseline.
//!
//! Axis convention: a sample `(x, y, z)` becomes vertex position
//! `(x, z, y)` — the dependent value rides the renderer's up axis. The
//! color mapper and the camera framing both assume this relabeling.
//!
//! Triangulation invariants (the renderer's face culling and any visual
//! diff against reference frames depend on these exactly):
//! - Surface vertex `k = i * (n+1) + j`; per cell the corners are
//!   `a=(i,j)`, `b=(i,j+1)`, `c=(i+1,j)`, `d=(i+1,j+1)` and the triangles
//!   are `(a, c, b)` then `(b, c, d)` — fixed diagonal `b–c`.
//! - Ribbon vertices alternate curve point (`2i`) and baseline foot
//!   (`2i+1`); per segment the triangles are
//!   `(top_left, bottom_left, bottom_right)` then
//!   `(top_left, bottom_right, top_right)`.

use crate::plot::color::{Palette, height_color};
use crate::plot::sample::{CurveSamples, SurfaceGrid};
use crate::scene::Mesh3;

/// Build the triangulated, color-mapped surface sheet for a sampled grid.
pub fn surface_mesh(grid: &SurfaceGrid, palette: Palette) -> Mesh3 {
    let n = grid.resolution as usize;
    let nodes = n + 1;
    let (lo, hi) = palette.surface_range(grid);

    let mut mesh = Mesh3::with_capacity(nodes * nodes, 6 * n * n);

    for i in 0..nodes {
        for j in 0..nodes {
            let [x, y, z] = grid.point(i, j);
            mesh.push_vertex(
                [x as f32, z as f32, y as f32],
                height_color(z, lo, hi),
            );
        }
    }

    for i in 0..n {
        for j in 0..n {
            let a = (i * nodes + j) as u32;
            let b = a + 1;
            let c = a + nodes as u32;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    mesh
}

/// Build the filled ribbon between a sampled curve and the x-axis.
pub fn area_mesh(curve: &CurveSamples, palette: Palette) -> Mesh3 {
    let (lo, hi) = palette.curve_range(curve);

    let mut mesh = Mesh3::with_capacity(
        curve.points.len() * 2,
        curve.points.len().saturating_sub(1) * 6,
    );

    for &[x, y] in &curve.points {
        // Curve point, then its foot on the baseline.
        mesh.push_vertex([x as f32, y as f32, 0.0], height_color(y, lo, hi));
        mesh.push_vertex([x as f32, 0.0, 0.0], height_color(0.0, lo, hi));
    }

    for i in 0..curve.points.len().saturating_sub(1) {
        let top_left = (2 * i) as u32;
        let bottom_left = top_left + 1;
        let top_right = top_left + 2;
        let bottom_right = top_left + 3;
        mesh.indices.extend_from_slice(&[
            top_left,
            bottom_left,
            bottom_right,
            top_left,
            bottom_right,
            top_right,
        ]);
    }

    mesh
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plot::{Bounds1, Bounds2, sample_curve, sample_surface};
    use approx::assert_relative_eq;

    #[test]
    fn surface_counts_follow_the_resolution() {
        for n in [1u32, 2, 5, 20] {
            let grid = sample_surface("x * y", Bounds2::square(-1.0, 1.0), n);
            let mesh = surface_mesh(&grid, Palette::DomainExtent);
            let nodes = (n + 1) as usize;
            assert_eq!(mesh.vertex_count(), nodes * nodes);
            assert_eq!(mesh.triangle_count(), 2 * (n as usize) * (n as usize));
            assert_eq!(mesh.indices.len(), 6 * (n as usize) * (n as usize));
        }
    }

    #[test]
    fn unit_cell_triangulation_is_exact() {
        let grid = sample_surface("0", Bounds2::square(0.0, 1.0), 1);
        let mesh = surface_mesh(&grid, Palette::DomainExtent);
        assert_eq!(mesh.indices, vec![0, 2, 1, 1, 2, 3]);
    }

    #[test]
    fn cell_triangles_share_the_fixed_diagonal() {
        let grid = sample_surface("x + y", Bounds2::square(0.0, 1.0), 3);
        let mesh = surface_mesh(&grid, Palette::DomainExtent);
        let nodes = 4u32;

        for (cell, tris) in mesh.indices.chunks_exact(6).enumerate() {
            let i = cell as u32 / 3;
            let j = cell as u32 % 3;
            let a = i * nodes + j;
            let (b, c, d) = (a + 1, a + nodes, a + nodes + 1);
            assert_eq!(tris, [a, c, b, b, c, d]);
        }
    }

    #[test]
    fn dependent_value_rides_the_up_axis() {
        let grid = sample_surface("x + 2 * y", Bounds2::square(0.0, 2.0), 2);
        let mesh = surface_mesh(&grid, Palette::DomainExtent);

        // Node (i=1, j=2): x = 1, y = 2, z = 5 → position (1, 5, 2).
        let v = mesh.positions[1 * 3 + 2];
        assert_relative_eq!(v[0], 1.0);
        assert_relative_eq!(v[1], 5.0);
        assert_relative_eq!(v[2], 2.0);
    }

    #[test]
    fn large_grids_need_wide_indices() {
        // 300 subdivisions → 90601 vertices, far past the u16 ceiling that
        // silently wrapped in one of the original variants.
        let grid = sample_surface("0", Bounds2::square(-1.0, 1.0), 300);
        let mesh = surface_mesh(&grid, Palette::DomainExtent);

        let max = *mesh.indices.iter().max().unwrap();
        assert_eq!(max as usize, mesh.vertex_count() - 1);
        assert!(max > u32::from(u16::MAX));
    }

    #[test]
    fn ribbon_connects_curve_to_baseline() {
        let curve = sample_curve("x", Bounds1::new(0.0, 1.0), 2);
        let mesh = area_mesh(&curve, Palette::DomainExtent);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(
            mesh.indices,
            vec![0, 1, 3, 0, 3, 2, 2, 3, 5, 2, 5, 4]
        );

        // Even vertices trace the curve, odd vertices sit on the axis.
        assert_relative_eq!(mesh.positions[2][1], 0.5);
        assert_relative_eq!(mesh.positions[3][1], 0.0);
    }

    #[test]
    fn surface_colors_span_the_gradient() {
        // z == x, normalized against the x extent: low edge blue, high red.
        let grid = sample_surface("x", Bounds2::square(-1.0, 1.0), 2);
        let mesh = surface_mesh(&grid, Palette::DomainExtent);

        let low = mesh.colors[0];
        let high = mesh.colors[mesh.colors.len() - 1];
        assert_relative_eq!(low[2], 1.0);
        assert_relative_eq!(high[0], 1.0);
    }
}
