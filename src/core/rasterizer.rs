use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::{Interpolatable, Shader};
use crate::scene::material::Material;
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum BlendMode {
    /// Fragments replace the destination.
    Opaque,
    /// `src * src.a + dst * (1 - src.a)` on every channel.
    Alpha,
}

/// Fixed-function state applied to every triangle of a draw call.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct RasterState {
    pub cull_mode: CullMode,
    /// Depth test with `LESS`. Depth is written only while the test is enabled.
    pub depth_test: bool,
    pub blend: BlendMode,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            depth_test: true,
            blend: BlendMode::Alpha,
        }
    }
}

/// Draws triangles into a [`FrameBuffer`].
#[derive(Default)]
pub struct Rasterizer {
    pub state: RasterState,
}

/// Homogeneous clip planes as `(axis, sign)`: a point is inside when `sign * p[axis] <= p.w`.
const CLIP_PLANES: [(usize, f32); 6] = [
    (0, 1.0),
    (0, -1.0),
    (1, 1.0),
    (1, -1.0),
    (2, 1.0),
    (2, -1.0),
];

impl Rasterizer {
    pub fn new(state: RasterState) -> Self {
        Self { state }
    }

    /// Clips a triangle against the view frustum (Sutherland-Hodgman in clip
    /// space) and rasterizes the resulting convex polygon as a fan.
    pub fn rasterize_triangle<V, S: Shader<V>>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&Material>,
    ) {
        // A triangle clipped by six planes has at most nine vertices.
        let mut polygon: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(16);
        let mut scratch: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(16);
        polygon.extend(clip_coords.iter().copied().zip(varyings.iter().copied()));

        for &(axis, sign) in &CLIP_PLANES {
            if polygon.is_empty() {
                return;
            }
            clip_polygon_against_plane(&polygon, &mut scratch, axis, sign);
            std::mem::swap(&mut polygon, &mut scratch);
        }

        if polygon.len() < 3 {
            return;
        }

        let v0 = polygon[0];
        for pair in polygon[1..].windows(2) {
            let (v1, v2) = (pair[0], pair[1]);
            self.rasterize_clipped(
                framebuffer,
                shader,
                &[v0.0, v1.0, v2.0],
                &[v0.1, v1.1, v2.1],
                material,
            );
        }
    }

    /// Rasterizes a triangle already inside the frustum. Rows of the bounding
    /// box are shaded in parallel; each row is owned by one worker.
    fn rasterize_clipped<V, S: Shader<V>>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&Material>,
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen = [Point2::origin(); 3];
        let mut w_values = [0.0; 3];
        let mut z_ndc = [0.0; 3];
        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            w_values[i] = clip_coords[i].w;
            z_ndc[i] = ndc.z;
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        // Screen Y points down, so counter-clockwise (front-facing) triangles
        // have a negative signed area here.
        let edge1 = screen[1] - screen[0];
        let edge2 = screen[2] - screen[1];
        let signed_area = edge1.x * edge2.y - edge1.y * edge2.x;
        match self.state.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        let Some((start_x, start_y, end_x, end_y)) =
            bounding_box(&screen, framebuffer.buffer_width, framebuffer.buffer_height)
        else {
            return;
        };

        let state = self.state;
        let row_width = framebuffer.buffer_width;
        let (colors, depths) = framebuffer.rows_mut(start_y, end_y);

        colors
            .par_chunks_mut(row_width)
            .zip(depths.par_chunks_mut(row_width))
            .enumerate()
            .for_each(|(row, (color_row, depth_row))| {
                let y = start_y + row;
                for x in start_x..=end_x {
                    let center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let Some(bary) = barycentric_coordinates(center, screen[0], screen[1], screen[2])
                    else {
                        return;
                    };
                    if !is_inside_triangle(bary) {
                        continue;
                    }

                    // NDC depth is affine in screen space.
                    let depth = (bary.x * z_ndc[0] + bary.y * z_ndc[1] + bary.z * z_ndc[2]) * 0.5
                        + 0.5;
                    if state.depth_test && depth >= depth_row[x] {
                        continue;
                    }

                    let Some(corrected) =
                        perspective_correct_barycentric(bary, w_values[0], w_values[1], w_values[2])
                    else {
                        continue;
                    };
                    let varying = varyings[0] * corrected.x
                        + varyings[1] * corrected.y
                        + varyings[2] * corrected.z;

                    let Some(src) = shader.fragment(varying, material) else {
                        continue;
                    };

                    color_row[x] = match state.blend {
                        BlendMode::Opaque => src,
                        BlendMode::Alpha => {
                            let a = src.w.clamp(0.0, 1.0);
                            src * a + color_row[x] * (1.0 - a)
                        }
                    };
                    if state.depth_test {
                        depth_row[x] = depth;
                    }
                }
            });
    }
}

/// Clips `input` against one plane, writing the surviving polygon to `output`.
fn clip_polygon_against_plane<T: Interpolatable>(
    input: &[(Vector4<f32>, T)],
    output: &mut Vec<(Vector4<f32>, T)>,
    axis: usize,
    sign: f32,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let is_inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;

    let mut prev = last;
    let mut prev_inside = is_inside(&prev.0);
    for &curr in input {
        let curr_inside = is_inside(&curr.0);
        if curr_inside != prev_inside {
            if let Some(hit) = intersect_edge_plane(prev, curr, axis, sign) {
                output.push(hit);
            }
        }
        if curr_inside {
            output.push(curr);
        }
        prev = curr;
        prev_inside = curr_inside;
    }
}

/// Intersection of segment `a -> b` with the plane `sign * p[axis] = p.w`,
/// interpolating position and varyings alike.
#[inline(always)]
fn intersect_edge_plane<T: Interpolatable>(
    a: (Vector4<f32>, T),
    b: (Vector4<f32>, T),
    axis: usize,
    sign: f32,
) -> Option<(Vector4<f32>, T)> {
    let denom = sign * (b.0[axis] - a.0[axis]) - (b.0.w - a.0.w);
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = (a.0.w - sign * a.0[axis]) / denom;
    if !t.is_finite() {
        return None;
    }
    Some((a.0 + (b.0 - a.0) * t, a.1 * (1.0 - t) + b.1 * t))
}

/// Integer pixel bounds of a screen triangle, clamped to the target.
fn bounding_box(
    points: &[Point2<f32>; 3],
    width: usize,
    height: usize,
) -> Option<(usize, usize, usize, usize)> {
    let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor() as i64;
    let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor() as i64;
    let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil() as i64;
    let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil() as i64;

    if max_x < 0 || max_y < 0 || min_x >= width as i64 || min_y >= height as i64 {
        return None;
    }
    Some((
        min_x.max(0) as usize,
        min_y.max(0) as usize,
        max_x.min(width as i64 - 1) as usize,
        max_y.min(height as i64 - 1) as usize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Passes clip-space positions straight through and paints a flat color.
    struct Flat(Vector4<f32>);

    impl Shader<Vector4<f32>> for Flat {
        type Varying = f32;

        fn vertex(&self, vertex: &Vector4<f32>) -> (Vector4<f32>, f32) {
            (*vertex, 0.0)
        }

        fn fragment(&self, _: f32, _: Option<&Material>) -> Option<Vector4<f32>> {
            Some(self.0)
        }
    }

    fn draw(fb: &mut FrameBuffer, state: RasterState, tri: [Vector4<f32>; 3], color: Vector4<f32>) {
        let shader = Flat(color);
        Rasterizer::new(state).rasterize_triangle(fb, &shader, &tri, &[0.0; 3], None);
    }

    fn full_screen_ccw(z: f32) -> [Vector4<f32>; 3] {
        [
            Vector4::new(-1.0, -1.0, z, 1.0),
            Vector4::new(3.0, -1.0, z, 1.0),
            Vector4::new(-1.0, 3.0, z, 1.0),
        ]
    }

    fn target() -> FrameBuffer {
        let mut fb = FrameBuffer::new(4, 4, 1).unwrap();
        fb.clear(Vector4::new(0.0, 0.0, 0.0, 1.0), f32::INFINITY, 0);
        fb
    }

    #[test]
    fn front_facing_triangle_covers_target() {
        let mut fb = target();
        let red = Vector4::new(1.0, 0.0, 0.0, 1.0);
        draw(&mut fb, RasterState::default(), full_screen_ccw(0.0), red);
        assert!(fb.color.iter().all(|c| *c == red));
    }

    #[test]
    fn clockwise_triangle_is_back_face_culled() {
        let mut fb = target();
        let mut tri = full_screen_ccw(0.0);
        tri.swap(1, 2);
        draw(&mut fb, RasterState::default(), tri, Vector4::new(1.0, 0.0, 0.0, 1.0));
        assert!(fb.color.iter().all(|c| c.x == 0.0));

        let no_cull = RasterState {
            cull_mode: CullMode::None,
            ..RasterState::default()
        };
        draw(&mut fb, no_cull, tri, Vector4::new(1.0, 0.0, 0.0, 1.0));
        assert!(fb.color.iter().all(|c| c.x == 1.0));
    }

    #[test]
    fn depth_test_keeps_nearest_fragment() {
        let mut fb = target();
        let near = Vector4::new(0.0, 1.0, 0.0, 1.0);
        draw(&mut fb, RasterState::default(), full_screen_ccw(-0.5), near);
        draw(&mut fb, RasterState::default(), full_screen_ccw(0.5), Vector4::new(0.0, 0.0, 1.0, 1.0));
        assert!(fb.color.iter().all(|c| *c == near));
        assert_relative_eq!(fb.depth[0], 0.25, epsilon = 1e-5);
    }

    #[test]
    fn disabled_depth_test_neither_rejects_nor_writes() {
        let mut fb = target();
        let state = RasterState {
            depth_test: false,
            ..RasterState::default()
        };
        draw(&mut fb, state, full_screen_ccw(0.0), Vector4::new(1.0, 1.0, 1.0, 1.0));
        assert!(fb.depth.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn alpha_blend_mixes_with_destination() {
        let mut fb = target();
        let opaque = RasterState {
            blend: BlendMode::Opaque,
            ..RasterState::default()
        };
        draw(&mut fb, opaque, full_screen_ccw(0.2), Vector4::new(1.0, 0.0, 0.0, 1.0));
        let lower_left = [
            Vector4::new(-1.0, -1.0, 0.0, 1.0),
            Vector4::new(1.0, -1.0, 0.0, 1.0),
            Vector4::new(-1.0, 1.0, 0.0, 1.0),
        ];
        draw(&mut fb, RasterState::default(), lower_left, Vector4::new(0.0, 0.0, 1.0, 0.25));
        // Bottom-left pixel
        let c = fb.color[12];
        assert_relative_eq!(c.x, 0.75, epsilon = 1e-6);
        assert_relative_eq!(c.z, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn triangle_behind_camera_is_clipped_away() {
        let mut fb = target();
        let tri = [
            Vector4::new(-1.0, -1.0, 0.0, -1.0),
            Vector4::new(1.0, -1.0, 0.0, -1.0),
            Vector4::new(0.0, 1.0, 0.0, -1.0),
        ];
        draw(&mut fb, RasterState::default(), tri, Vector4::new(1.0, 1.0, 1.0, 1.0));
        assert!(fb.color.iter().all(|c| c.x == 0.0));
    }
}
