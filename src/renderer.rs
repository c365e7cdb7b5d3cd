//! Two-pass WebGL2 pipeline.
//!
//! Pass 1 draws the 3D scene into an offscreen render target with depth
//! testing. Pass 2 stretches that target's color texture over the canvas
//! through the chromatic-fringe shader.

use std::f32::consts::FRAC_PI_4;

use crate::error::RenderError;
use crate::matrix::{look_at, perspective, Mat4};

pub mod context;
pub mod mesh;
#[cfg(test)]
pub(crate) mod recording;
pub mod shader;
pub mod structure;
pub mod target;

pub use context::{GlContext, WebGl};

use mesh::{FullscreenQuad, PaletteRng};
use shader::{
    RenderContext, ShaderProgram, UniformKind, UniformValue, COMPOSITE_FRAGMENT_SHADER,
    COMPOSITE_VERTEX_SHADER, SCENE_FRAGMENT_SHADER, SCENE_VERTEX_SHADER,
};
use structure::Structure;
use target::RenderTarget;

const CAMERA_EYE: [f32; 3] = [0.0, 0.0, 5.0];
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// Owns everything the two passes need: the GL context, both shader
/// programs, the offscreen target and the scene content.
pub struct Renderer<G: GlContext> {
    gl: G,
    ctx: RenderContext,
    scene_shader: ShaderProgram<G>,
    composite_shader: ShaderProgram<G>,
    target: RenderTarget<G>,
    structure: Structure<G>,
    quad: FullscreenQuad<G>,
}

impl<G: GlContext> Renderer<G> {
    /// Compiles both programs, allocates the render target at the current
    /// canvas size and uploads the scene geometry.
    pub fn new(gl: G, ring_count: usize, palette_seed: u32) -> Result<Self, RenderError> {
        let mut scene_shader =
            ShaderProgram::compile(&gl, SCENE_VERTEX_SHADER, SCENE_FRAGMENT_SHADER)?;
        scene_shader.add_attribute(&gl, "position", 4)?;
        scene_shader.add_uniform(&gl, "perspective", UniformKind::Mat4)?;
        scene_shader.add_uniform(&gl, "camera", UniformKind::Mat4)?;
        scene_shader.add_uniform(&gl, "transform", UniformKind::Mat4)?;
        scene_shader.add_uniform(&gl, "color", UniformKind::Vec4)?;

        let mut composite_shader =
            ShaderProgram::compile(&gl, COMPOSITE_VERTEX_SHADER, COMPOSITE_FRAGMENT_SHADER)?;
        composite_shader.add_attribute(&gl, "position", 4)?;
        composite_shader.add_attribute(&gl, "texcoord", 2)?;
        composite_shader.add_uniform(&gl, "u_texture", UniformKind::Int)?;

        let mut target = RenderTarget::new();
        target.update(&gl)?;

        let mut rng = PaletteRng::new(palette_seed);
        let structure = Structure::new(&gl, &mut rng, ring_count)?;
        let quad = FullscreenQuad::new(&gl)?;

        Ok(Self {
            gl,
            ctx: RenderContext::new(),
            scene_shader,
            composite_shader,
            target,
            structure,
            quad,
        })
    }

    /// Renders one frame with the default camera, deriving the projection's
    /// aspect ratio from the canvas.
    pub fn render(&mut self, rotation: f32) -> Result<(), RenderError> {
        let (width, height) = self.gl.canvas_size();
        let camera = look_at(CAMERA_EYE, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0])?;
        let projection = perspective(
            FRAC_PI_4,
            width as f32 / height as f32,
            NEAR_PLANE,
            FAR_PLANE,
        )?;
        self.draw_frame(rotation, &camera, &projection);
        Ok(())
    }

    /// Runs both passes with explicit view and projection matrices.
    pub fn draw_frame(&mut self, rotation: f32, camera: &Mat4, projection: &Mat4) {
        // Pass 1: scene into the offscreen target.
        self.target.bind(&self.gl);
        self.scene_shader.use_program(&self.gl, &mut self.ctx);
        self.gl.set_depth_test(true);
        self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
        self.gl.clear_color_and_depth();
        self.structure
            .draw(&self.gl, &self.scene_shader, rotation, camera, projection);

        // Pass 2: composite the target's texture onto the canvas.
        self.target.draw_to_canvas(&self.gl);
        self.composite_shader.use_program(&self.gl, &mut self.ctx);
        self.gl.set_depth_test(false);
        self.gl.clear_color_and_depth();
        self.target.use_texture(&self.gl, 0);
        self.composite_shader
            .set_uniform(&self.gl, "u_texture", UniformValue::Int(0));
        self.quad.draw(&self.gl, &self.composite_shader);
    }

    /// Reallocates the render target after the canvas changed size.
    pub fn resize(&mut self) -> Result<(), RenderError> {
        self.target.update(&self.gl)
    }

    pub fn ring_count(&self) -> usize {
        self.structure.ring_count()
    }
}
