//! Drawable meshes: each owns a static vertex buffer and a fixed palette
//! picked at construction time.

use std::f32::consts::PI;

use crate::error::RenderError;

use super::context::GlContext;
use super::shader::{ShaderProgram, UniformValue};

/// Segments around a ring's circumference.
pub const RING_SEGMENTS: usize = 64;

const BOX_POSITIONS: [f32; 96] = [
    -1.0, -1.0, -1.0, 1.0, //
    1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, -1.0, 1.0, //
    1.0, 1.0, -1.0, 1.0, //
    //
    -1.0, -1.0, 1.0, 1.0, //
    1.0, -1.0, 1.0, 1.0, //
    -1.0, 1.0, 1.0, 1.0, //
    1.0, 1.0, 1.0, 1.0, //
    //
    -1.0, -1.0, -1.0, 1.0, //
    1.0, -1.0, -1.0, 1.0, //
    -1.0, -1.0, 1.0, 1.0, //
    1.0, -1.0, 1.0, 1.0, //
    //
    -1.0, 1.0, -1.0, 1.0, //
    1.0, 1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, 1.0, //
    1.0, 1.0, 1.0, 1.0, //
    //
    -1.0, -1.0, -1.0, 1.0, //
    -1.0, -1.0, 1.0, 1.0, //
    -1.0, 1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, 1.0, //
    //
    1.0, -1.0, -1.0, 1.0, //
    1.0, -1.0, 1.0, 1.0, //
    1.0, 1.0, -1.0, 1.0, //
    1.0, 1.0, 1.0, 1.0, //
];

/// Small xorshift generator for the decorative palettes.
///
/// The colors only need to differ from run to run; the host supplies the
/// seed, tests pass a constant one.
pub struct PaletteRng(u32);

impl PaletteRng {
    pub fn new(seed: u32) -> Self {
        // xorshift has a fixed point at zero
        Self(seed | 1)
    }

    fn next_f32(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform sample in `[lo, hi)`.
    fn channel(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    fn palette<const N: usize>(&mut self, lo: f32, hi: f32) -> [[f32; 4]; N] {
        let mut colors = [[0.0, 0.0, 0.0, 1.0]; N];
        for color in &mut colors {
            for channel in &mut color[..3] {
                *channel = self.channel(lo, hi);
            }
        }
        colors
    }
}

fn upload_static<G: GlContext>(gl: &G, data: &[f32]) -> Result<G::Buffer, RenderError> {
    let buffer = gl
        .create_buffer()
        .ok_or(RenderError::ResourceAllocation("buffer"))?;
    gl.bind_array_buffer(Some(&buffer));
    gl.array_buffer_data(data);
    Ok(buffer)
}

/// A flat ring between two radii, extruded to 10% of its outer radius.
///
/// Four closed triangle strips: front cap, back cap, inner wall, outer wall.
/// Each strip gets its own color from the palette.
pub struct Ring<G: GlContext> {
    position_buffer: G::Buffer,
    colors: [[f32; 4]; 4],
}

impl<G: GlContext> Ring<G> {
    pub fn new(gl: &G, rng: &mut PaletteRng, inner: f32, outer: f32) -> Result<Self, RenderError> {
        let position_buffer = upload_static(gl, &ring_positions(inner, outer))?;
        Ok(Self {
            position_buffer,
            colors: rng.palette(0.2, 1.0),
        })
    }

    pub fn draw(&self, gl: &G, shader: &ShaderProgram<G>) {
        shader.set_attribute(gl, "position", &self.position_buffer);
        let strip = (RING_SEGMENTS * 2) as i32;
        for (face, color) in self.colors.iter().enumerate() {
            shader.set_uniform(gl, "color", UniformValue::Vec4(*color));
            gl.draw_triangle_strip(face as i32 * strip, strip);
        }
    }
}

fn ring_positions(inner: f32, outer: f32) -> Vec<f32> {
    let mut positions = Vec::with_capacity(4 * RING_SEGMENTS * 2 * 4);

    for part in 0..4 {
        let r1 = if part == 3 { outer } else { inner };
        let r2 = if part == 2 { inner } else { outer };
        let z1 = if part == 1 { -1.0f32 } else { 1.0 } * 0.05 * outer;
        let z2 = if part == 0 { 1.0f32 } else { -1.0 } * 0.05 * outer;

        // Each strip alternates between its two rims; the angle hits 2π on
        // the last segment so the strip closes on its first pair.
        for i in 0..RING_SEGMENTS {
            let angle = i as f32 / (RING_SEGMENTS as f32 - 1.0) * 2.0 * PI;
            positions.extend_from_slice(&[angle.cos() * r1, angle.sin() * r1, z1, 1.0]);
            positions.extend_from_slice(&[angle.cos() * r2, angle.sin() * r2, z2, 1.0]);
        }
    }
    positions
}

/// An axis-aligned unit cube drawn as six 4-vertex strips, one color each.
pub struct BoxMesh<G: GlContext> {
    position_buffer: G::Buffer,
    colors: [[f32; 4]; 6],
}

impl<G: GlContext> BoxMesh<G> {
    pub fn new(gl: &G, rng: &mut PaletteRng) -> Result<Self, RenderError> {
        let position_buffer = upload_static(gl, &BOX_POSITIONS)?;
        Ok(Self {
            position_buffer,
            // kept dark so the rings stand out against it
            colors: rng.palette(0.0, 0.3),
        })
    }

    pub fn draw(&self, gl: &G, shader: &ShaderProgram<G>) {
        shader.set_attribute(gl, "position", &self.position_buffer);
        for (face, color) in self.colors.iter().enumerate() {
            shader.set_uniform(gl, "color", UniformValue::Vec4(*color));
            gl.draw_triangle_strip(face as i32 * 4, 4);
        }
    }
}

/// Canvas-filling quad for the composite pass, with [0, 1]² texture
/// coordinates.
pub struct FullscreenQuad<G: GlContext> {
    position_buffer: G::Buffer,
    texcoord_buffer: G::Buffer,
}

impl<G: GlContext> FullscreenQuad<G> {
    pub fn new(gl: &G) -> Result<Self, RenderError> {
        let positions = [
            -1.0, -1.0, 1.0, 1.0, //
            1.0, -1.0, 1.0, 1.0, //
            -1.0, 1.0, 1.0, 1.0, //
            1.0, 1.0, 1.0, 1.0, //
        ];
        let texcoords = [
            0.0, 0.0, //
            1.0, 0.0, //
            0.0, 1.0, //
            1.0, 1.0, //
        ];
        Ok(Self {
            position_buffer: upload_static(gl, &positions)?,
            texcoord_buffer: upload_static(gl, &texcoords)?,
        })
    }

    pub fn draw(&self, gl: &G, shader: &ShaderProgram<G>) {
        shader.set_attribute(gl, "position", &self.position_buffer);
        shader.set_attribute(gl, "texcoord", &self.texcoord_buffer);
        gl.draw_triangle_strip(0, 4);
    }
}

#[cfg(test)]
mod tests {
    use super::super::recording::{Call, RecordingGl};
    use super::super::shader::{
        ShaderProgram, UniformKind, COMPOSITE_FRAGMENT_SHADER, COMPOSITE_VERTEX_SHADER,
        SCENE_FRAGMENT_SHADER, SCENE_VERTEX_SHADER,
    };
    use super::*;

    fn scene_shader(gl: &RecordingGl) -> ShaderProgram<RecordingGl> {
        let mut shader =
            ShaderProgram::compile(gl, SCENE_VERTEX_SHADER, SCENE_FRAGMENT_SHADER).unwrap();
        shader.add_attribute(gl, "position", 4).unwrap();
        shader.add_uniform(gl, "color", UniformKind::Vec4).unwrap();
        shader
    }

    #[test]
    fn ring_has_four_closed_strips_of_vec4_vertices() {
        let positions = ring_positions(0.2, 0.4);
        assert_eq!(positions.len(), 4 * RING_SEGMENTS * 2 * 4);

        // First pair of the front cap: angle 0 on the inner and outer rims,
        // both extruded toward +z.
        assert!((positions[0] - 0.2).abs() < 1e-6);
        assert!(positions[1].abs() < 1e-6);
        assert!((positions[2] - 0.05 * 0.4).abs() < 1e-6);
        assert_eq!(positions[3], 1.0);
        assert!((positions[4] - 0.4).abs() < 1e-6);
        assert!((positions[6] - 0.05 * 0.4).abs() < 1e-6);

        // Every strip ends where it began.
        let stride = RING_SEGMENTS * 2 * 4;
        for part in 0..4 {
            let strip = &positions[part * stride..(part + 1) * stride];
            for offset in 0..8 {
                let first = strip[offset];
                let last = strip[stride - 8 + offset];
                assert!((first - last).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn ring_walls_swap_the_radii() {
        let positions = ring_positions(0.2, 0.4);
        let stride = RING_SEGMENTS * 2 * 4;

        // Inner wall (part 2): both rims at the inner radius, differing
        // only in z.
        let inner_wall = &positions[2 * stride..3 * stride];
        assert!((inner_wall[0] - 0.2).abs() < 1e-6);
        assert!((inner_wall[4] - 0.2).abs() < 1e-6);
        // its two rims differ only in z
        assert!((inner_wall[2] - inner_wall[6]).abs() > 1e-6);

        // Outer wall (part 3): both rims at the outer radius.
        let outer_wall = &positions[3 * stride..4 * stride];
        assert!((outer_wall[0] - 0.4).abs() < 1e-6);
        assert!((outer_wall[4] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn ring_draws_four_strips_at_consecutive_offsets() {
        let gl = RecordingGl::new(100, 100);
        let shader = scene_shader(&gl);
        let mut rng = PaletteRng::new(7);
        let ring = Ring::new(&gl, &mut rng, 0.2, 0.4).unwrap();

        gl.clear_log();
        ring.draw(&gl, &shader);

        let draws = gl.draws();
        assert_eq!(
            draws,
            vec![
                (None, 0, 128),
                (None, 128, 128),
                (None, 256, 128),
                (None, 384, 128),
            ]
        );

        let colors = gl.filtered(|c| match c {
            Call::Uniform4f { name, value } if name == "color" => Some(*value),
            _ => None,
        });
        assert_eq!(colors.len(), 4);
        for color in colors {
            for channel in &color[..3] {
                assert!((0.2..1.0).contains(channel));
            }
            assert_eq!(color[3], 1.0);
        }
    }

    #[test]
    fn box_draws_six_faces_with_dark_palette() {
        let gl = RecordingGl::new(100, 100);
        let shader = scene_shader(&gl);
        let mut rng = PaletteRng::new(42);
        let cube = BoxMesh::new(&gl, &mut rng).unwrap();

        assert_eq!(gl.last_buffer_data().len(), 96);

        gl.clear_log();
        cube.draw(&gl, &shader);

        let draws = gl.draws();
        assert_eq!(draws.len(), 6);
        for (face, draw) in draws.iter().enumerate() {
            assert_eq!(*draw, (None, face as i32 * 4, 4));
        }

        let colors = gl.filtered(|c| match c {
            Call::Uniform4f { name, value } if name == "color" => Some(*value),
            _ => None,
        });
        assert_eq!(colors.len(), 6);
        for color in colors {
            for channel in &color[..3] {
                assert!((0.0..0.3).contains(channel));
            }
            assert_eq!(color[3], 1.0);
        }
    }

    #[test]
    fn quad_binds_both_attributes_and_draws_one_strip() {
        let gl = RecordingGl::new(100, 100);
        let mut shader =
            ShaderProgram::compile(&gl, COMPOSITE_VERTEX_SHADER, COMPOSITE_FRAGMENT_SHADER)
                .unwrap();
        shader.add_attribute(&gl, "position", 4).unwrap();
        shader.add_attribute(&gl, "texcoord", 2).unwrap();

        let quad = FullscreenQuad::new(&gl).unwrap();
        assert_eq!(gl.last_buffer_data().len(), 8); // texcoords uploaded last

        gl.clear_log();
        quad.draw(&gl, &shader);

        let pointers = gl.filtered(|c| match c {
            Call::AttribPointer { slot, size } => Some((*slot, *size)),
            _ => None,
        });
        assert_eq!(pointers, vec![(0, 4), (1, 2)]);
        assert_eq!(gl.draws(), vec![(None, 0, 4)]);
    }

    #[test]
    fn palette_rng_is_deterministic_per_seed() {
        let mut a = PaletteRng::new(123);
        let mut b = PaletteRng::new(123);
        let pa: [[f32; 4]; 4] = a.palette(0.2, 1.0);
        let pb: [[f32; 4]; 4] = b.palette(0.2, 1.0);
        assert_eq!(pa, pb);

        let mut c = PaletteRng::new(124);
        let pc: [[f32; 4]; 4] = c.palette(0.2, 1.0);
        assert_ne!(pa, pc);
    }
}
