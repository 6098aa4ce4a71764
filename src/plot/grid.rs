//! Reference grids and axis lines.
//!
//! The explorer draws coordinate grids in the three coordinate planes plus
//! color-coded axis lines (X red, Y green, Z blue), the same furniture the
//! original scene carried. The renderer has no native line primitive, so
//! every line is a thin camera-independent quad; with back-face culling off
//! it reads as a line from both sides.

use glam::Vec3;

use crate::scene::Mesh3;

/// One grid line / axis line as a thin quad in the plane with `normal`.
fn segment_quad(mesh: &mut Mesh3, a: Vec3, b: Vec3, normal: Vec3, half_width: f32, color: [f32; 3]) {
    let dir = b - a;
    let offset = dir.cross(normal).normalize_or_zero() * half_width;

    mesh.push_quad(
        [
            (a - offset).to_array(),
            (b - offset).to_array(),
            (b + offset).to_array(),
            (a + offset).to_array(),
        ],
        color,
    );
}

/// Build the three-plane reference grid.
///
/// `size` is the full edge length of each grid square; `divisions` the line
/// spacing count per axis (so `divisions + 1` lines per direction). Vertex
/// colors are white; tint the grid through the owning object's fill.
pub fn reference_grid(size: f32, divisions: u32) -> Mesh3 {
    let half = size * 0.5;
    let step = size / divisions.max(1) as f32;
    let hw = size * 0.0015;
    let white = [1.0, 1.0, 1.0];

    let lines = (divisions as usize + 1) * 2 * 3;
    let mut mesh = Mesh3::with_capacity(lines * 4, lines * 6);

    for k in 0..=divisions {
        let t = -half + k as f32 * step;

        // XZ plane (floor).
        segment_quad(
            &mut mesh,
            Vec3::new(-half, 0.0, t),
            Vec3::new(half, 0.0, t),
            Vec3::Y,
            hw,
            white,
        );
        segment_quad(
            &mut mesh,
            Vec3::new(t, 0.0, -half),
            Vec3::new(t, 0.0, half),
            Vec3::Y,
            hw,
            white,
        );

        // XY plane (back wall).
        segment_quad(
            &mut mesh,
            Vec3::new(-half, t, 0.0),
            Vec3::new(half, t, 0.0),
            Vec3::Z,
            hw,
            white,
        );
        segment_quad(
            &mut mesh,
            Vec3::new(t, -half, 0.0),
            Vec3::new(t, half, 0.0),
            Vec3::Z,
            hw,
            white,
        );

        // YZ plane (side wall).
        segment_quad(
            &mut mesh,
            Vec3::new(0.0, -half, t),
            Vec3::new(0.0, half, t),
            Vec3::X,
            hw,
            white,
        );
        segment_quad(
            &mut mesh,
            Vec3::new(0.0, t, -half),
            Vec3::new(0.0, t, half),
            Vec3::X,
            hw,
            white,
        );
    }

    mesh
}

/// Build the color-coded axis lines (X red, Y green, Z blue).
///
/// Each axis runs from `-size` to `+size` through the origin, slightly
/// thicker than the reference grid so it stands out.
pub fn axis_lines(size: f32) -> Mesh3 {
    let hw = size * 0.004;
    let mut mesh = Mesh3::with_capacity(3 * 4, 3 * 6);

    segment_quad(
        &mut mesh,
        Vec3::new(-size, 0.0, 0.0),
        Vec3::new(size, 0.0, 0.0),
        Vec3::Y,
        hw,
        [1.0, 0.0, 0.0],
    );
    segment_quad(
        &mut mesh,
        Vec3::new(0.0, -size, 0.0),
        Vec3::new(0.0, size, 0.0),
        Vec3::Z,
        hw,
        [0.0, 1.0, 0.0],
    );
    segment_quad(
        &mut mesh,
        Vec3::new(0.0, 0.0, -size),
        Vec3::new(0.0, 0.0, size),
        Vec3::X,
        hw,
        [0.0, 0.0, 1.0],
    );

    mesh
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn grid_line_counts_match_divisions() {
        let mesh = reference_grid(10.0, 20);
        // 21 positions × 2 directions × 3 planes, one quad each.
        let quads = 21 * 2 * 3;
        assert_eq!(mesh.vertex_count(), quads * 4);
        assert_eq!(mesh.triangle_count(), quads * 2);
    }

    #[test]
    fn axes_are_three_colored_quads() {
        let mesh = axis_lines(10.0);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.colors[0], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.colors[4], [0.0, 1.0, 0.0]);
        assert_eq!(mesh.colors[8], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn grid_spans_the_requested_size() {
        let mesh = reference_grid(8.0, 4);
        let max_x = mesh
            .positions
            .iter()
            .map(|p| p[0])
            .fold(f32::NEG_INFINITY, f32::max);
        assert!((max_x - 4.0).abs() < 0.1);
    }
}
