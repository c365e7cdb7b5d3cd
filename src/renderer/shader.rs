use std::collections::HashMap;

use crate::error::RenderError;

use super::context::{GlContext, ShaderKind};

// Shader sources

/// Pass 1: model/view/projection transform of the scene geometry.
pub const SCENE_VERTEX_SHADER: &str = r#"#version 300 es
in vec4 position;
uniform mat4 perspective;
uniform mat4 camera;
uniform mat4 transform;
void main() {
    gl_Position = perspective * camera * transform * position;
}
"#;

/// Pass 1: flat per-strip color.
pub const SCENE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
uniform vec4 color;
out vec4 fragColor;
void main() {
    fragColor = color;
}
"#;

/// Pass 2: clip-space passthrough for the fullscreen quad.
pub const COMPOSITE_VERTEX_SHADER: &str = r#"#version 300 es
in vec4 position;
in vec2 texcoord;
out vec2 v_uv;
void main() {
    v_uv = texcoord;
    gl_Position = position;
}
"#;

/// Pass 2: samples the scene texture with the red and blue channels shifted
/// horizontally by ±0.002 texture widths for the fringe effect.
pub const COMPOSITE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec2 v_uv;
uniform sampler2D u_texture;
out vec4 fragColor;
void main() {
    fragColor = vec4(
        texture(u_texture, v_uv + vec2(-0.002, 0.0)).r,
        texture(u_texture, v_uv).g,
        texture(u_texture, v_uv + vec2(0.002, 0.0)).b,
        1.0);
}
"#;

/// Type a uniform was registered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Int,
    Vec4,
    Mat4,
}

/// Value for [`ShaderProgram::set_uniform`]; must match the registered kind.
#[derive(Clone, Copy, Debug)]
pub enum UniformValue {
    Int(i32),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

/// Tracks which program currently owns the enabled vertex attribute arrays.
///
/// Exactly one program is active at a time; switching disables the previous
/// program's attribute slots before enabling the next one's, so no slot stays
/// enabled while pointing at a stale buffer.
#[derive(Default)]
pub struct RenderContext {
    active_slots: Option<Vec<u32>>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A linked program with its registered attributes and uniforms.
///
/// Attributes and uniforms are looked up once at registration; drawing code
/// then refers to them by name. Registering a name the linker stripped is an
/// error, setting an unregistered name afterwards is a bug in the caller.
pub struct ShaderProgram<G: GlContext> {
    program: G::Program,
    attributes: HashMap<String, (u32, i32)>,
    uniforms: HashMap<String, (G::UniformLocation, UniformKind)>,
}

impl<G: GlContext> ShaderProgram<G> {
    pub fn compile(gl: &G, vertex_src: &str, fragment_src: &str) -> Result<Self, RenderError> {
        let vertex = compile_stage(gl, ShaderKind::Vertex, vertex_src)?;
        let fragment = match compile_stage(gl, ShaderKind::Fragment, fragment_src) {
            Ok(shader) => shader,
            Err(err) => {
                gl.delete_shader(&vertex);
                return Err(err);
            }
        };

        let program = match gl.create_program() {
            Some(program) => program,
            None => {
                gl.delete_shader(&vertex);
                gl.delete_shader(&fragment);
                return Err(RenderError::ResourceAllocation("program"));
            }
        };
        gl.attach_shader(&program, &vertex);
        gl.attach_shader(&program, &fragment);
        gl.link_program(&program);

        if !gl.program_linked(&program) {
            let log = gl.program_info_log(&program);
            gl.delete_program(&program);
            gl.delete_shader(&vertex);
            gl.delete_shader(&fragment);
            return Err(RenderError::ShaderLink { log });
        }

        // The stages are owned by the program once linked.
        gl.delete_shader(&vertex);
        gl.delete_shader(&fragment);

        Ok(Self {
            program,
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
        })
    }

    /// Registers a vertex attribute taking `size` floats per vertex.
    pub fn add_attribute(&mut self, gl: &G, name: &str, size: i32) -> Result<(), RenderError> {
        let slot = gl
            .attrib_location(&self.program, name)
            .ok_or_else(|| RenderError::MissingShaderBinding {
                kind: "attribute",
                name: name.to_string(),
            })?;
        self.attributes.insert(name.to_string(), (slot, size));
        Ok(())
    }

    pub fn add_uniform(&mut self, gl: &G, name: &str, kind: UniformKind) -> Result<(), RenderError> {
        let location = gl
            .uniform_location(&self.program, name)
            .ok_or_else(|| RenderError::MissingShaderBinding {
                kind: "uniform",
                name: name.to_string(),
            })?;
        self.uniforms.insert(name.to_string(), (location, kind));
        Ok(())
    }

    /// Makes this program the active one.
    ///
    /// The previous program's attribute slots are disabled first, then the
    /// program is bound and its own slots enabled.
    pub fn use_program(&self, gl: &G, ctx: &mut RenderContext) {
        if let Some(previous) = ctx.active_slots.take() {
            for slot in previous {
                gl.disable_vertex_attrib_array(slot);
            }
        }

        gl.use_program(Some(&self.program));

        let mut slots: Vec<u32> = self.attributes.values().map(|(slot, _)| *slot).collect();
        slots.sort_unstable();
        for slot in &slots {
            gl.enable_vertex_attrib_array(*slot);
        }
        ctx.active_slots = Some(slots);
    }

    /// Disables this program's attribute arrays without unbinding the
    /// program object; the releasing half of the `use_program` hand-off.
    pub fn disable(&self, gl: &G, ctx: &mut RenderContext) {
        let mut slots: Vec<u32> = self.attributes.values().map(|(slot, _)| *slot).collect();
        slots.sort_unstable();
        for slot in slots {
            gl.disable_vertex_attrib_array(slot);
        }
        ctx.active_slots = None;
    }

    /// Points a registered attribute at `buffer`.
    ///
    /// Panics if `name` was never registered; that is a wiring bug, not a
    /// runtime condition.
    pub fn set_attribute(&self, gl: &G, name: &str, buffer: &G::Buffer) {
        let (slot, size) = self.attributes[name];
        gl.bind_array_buffer(Some(buffer));
        gl.vertex_attrib_pointer(slot, size);
    }

    /// Uploads a uniform value.
    ///
    /// Panics if `name` was never registered or `value` does not match the
    /// registered kind.
    pub fn set_uniform(&self, gl: &G, name: &str, value: UniformValue) {
        let (location, kind) = &self.uniforms[name];
        match (kind, value) {
            (UniformKind::Int, UniformValue::Int(v)) => gl.uniform1i(location, v),
            (UniformKind::Vec4, UniformValue::Vec4(v)) => gl.uniform4fv(location, &v),
            (UniformKind::Mat4, UniformValue::Mat4(v)) => gl.uniform_matrix4fv(location, &v),
            (kind, value) => panic!("uniform `{name}` registered as {kind:?}, set with {value:?}"),
        }
    }
}

fn compile_stage<G: GlContext>(
    gl: &G,
    kind: ShaderKind,
    source: &str,
) -> Result<G::Shader, RenderError> {
    let shader = gl
        .create_shader(kind)
        .ok_or(RenderError::ResourceAllocation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if !gl.shader_compiled(&shader) {
        let log = gl.shader_info_log(&shader);
        gl.delete_shader(&shader);
        return Err(RenderError::ShaderCompile { log });
    }
    Ok(shader)
}
