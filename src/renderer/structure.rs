use crate::error::RenderError;
use crate::matrix::{mat4_mult, rotation_x, rotation_y, scale, translate, Mat4};

use super::context::GlContext;
use super::mesh::{BoxMesh, PaletteRng, Ring};
use super::shader::{ShaderProgram, UniformValue};

/// The scene content: a stack of concentric rings inside an enclosing box.
///
/// Rings are built outermost first; ring `i` spans radii
/// `((count - i) * 0.2, (count - i + 1) * 0.2)`.
pub struct Structure<G: GlContext> {
    rings: Vec<Ring<G>>,
    cube: BoxMesh<G>,
}

impl<G: GlContext> Structure<G> {
    pub fn new(gl: &G, rng: &mut PaletteRng, count: usize) -> Result<Self, RenderError> {
        let mut rings = Vec::with_capacity(count);
        for i in (1..=count).rev() {
            rings.push(Ring::new(gl, rng, i as f32 * 0.2, (i as f32 + 1.0) * 0.2)?);
        }
        Ok(Self {
            rings,
            cube: BoxMesh::new(gl, rng)?,
        })
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Draws the box and the rings with the given view and projection.
    ///
    /// Every drawable shares the scene shader; the caller has already made it
    /// active and selected the draw destination.
    pub fn draw(
        &self,
        gl: &G,
        shader: &ShaderProgram<G>,
        rot: f32,
        camera: &Mat4,
        perspective: &Mat4,
    ) {
        shader.set_uniform(gl, "camera", UniformValue::Mat4(*camera));
        shader.set_uniform(gl, "perspective", UniformValue::Mat4(*perspective));

        // The box is scaled up to enclose the whole scene.
        let cube_transform = translate(&scale(10.0), 0.0, 0.0, -4.0);
        shader.set_uniform(gl, "transform", UniformValue::Mat4(cube_transform));
        self.cube.draw(gl, shader);

        // Each ring spins on top of the accumulated rotation of every ring
        // before it, alternating between the X and the Y axis. The chained
        // gimbal motion is the point of the demo; the multiplication order
        // must stay exactly like this.
        let mut mat = rotation_y(rot * 0.5);
        for (i, ring) in self.rings.iter().enumerate() {
            let spin = rot * (i as f32 * 0.75 + 1.0);
            let step = if i % 2 == 0 {
                rotation_x(spin)
            } else {
                rotation_y(spin)
            };
            mat = mat4_mult(&step, &mat);
            shader.set_uniform(gl, "transform", UniformValue::Mat4(translate(&mat, 0.0, 0.0, -4.0)));
            ring.draw(gl, shader);
        }
    }
}
