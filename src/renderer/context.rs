use wasm_bindgen::JsCast;
use web_sys::WebGl2RenderingContext;

use crate::error::RenderError;

/// Shader stage selector for [`GlContext::create_shader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

/// Status value reported by a complete framebuffer (same numeric value as GL).
pub const FRAMEBUFFER_COMPLETE: u32 = WebGl2RenderingContext::FRAMEBUFFER_COMPLETE;

/// The slice of the graphics API the pipeline actually uses.
///
/// The renderer is written against this trait instead of
/// `WebGl2RenderingContext` directly so that every draw, bind and release can
/// be observed by the test double. Attribute data is always 32-bit float and
/// tightly packed; the only draw primitive is the triangle strip.
pub trait GlContext {
    type Buffer;
    type Shader;
    type Program;
    type Texture;
    type Renderbuffer;
    type Framebuffer;
    type UniformLocation;

    /// Current pixel size of the backing canvas.
    fn canvas_size(&self) -> (u32, u32);

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_array_buffer(&self, buffer: Option<&Self::Buffer>);
    /// Uploads `data` into the bound array buffer as STATIC_DRAW.
    fn array_buffer_data(&self, data: &[f32]);

    fn create_shader(&self, kind: ShaderKind) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn shader_compiled(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> String;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn program_linked(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> String;
    fn delete_program(&self, program: &Self::Program);
    fn use_program(&self, program: Option<&Self::Program>);

    /// Location of an active vertex attribute, if the linker kept it.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn enable_vertex_attrib_array(&self, slot: u32);
    fn disable_vertex_attrib_array(&self, slot: u32);
    /// Points `slot` at the bound array buffer: `size` floats per vertex.
    fn vertex_attrib_pointer(&self, slot: u32, size: i32);

    fn uniform1i(&self, location: &Self::UniformLocation, value: i32);
    fn uniform4fv(&self, location: &Self::UniformLocation, value: &[f32; 4]);
    fn uniform_matrix4fv(&self, location: &Self::UniformLocation, value: &[f32; 16]);

    fn create_texture(&self) -> Option<Self::Texture>;
    fn bind_texture(&self, texture: Option<&Self::Texture>);
    /// Selects texture unit `unit` for subsequent binds.
    fn active_texture(&self, unit: u32);
    /// Allocates RGBA/u8 storage for the bound texture.
    fn texture_storage_rgba(&self, width: u32, height: u32);
    /// Linear min/mag filtering, edge-clamped wrapping, no mipmaps.
    fn texture_filter_linear_clamp(&self);
    fn delete_texture(&self, texture: &Self::Texture);

    fn create_renderbuffer(&self) -> Option<Self::Renderbuffer>;
    fn bind_renderbuffer(&self, renderbuffer: Option<&Self::Renderbuffer>);
    /// Allocates 16-bit depth storage for the bound renderbuffer.
    fn renderbuffer_depth16(&self, width: u32, height: u32);
    fn delete_renderbuffer(&self, renderbuffer: &Self::Renderbuffer);

    fn create_framebuffer(&self) -> Option<Self::Framebuffer>;
    /// `None` selects the visible canvas as the draw destination.
    fn bind_framebuffer(&self, framebuffer: Option<&Self::Framebuffer>);
    fn framebuffer_color_texture(&self, texture: &Self::Texture);
    fn framebuffer_depth_renderbuffer(&self, renderbuffer: &Self::Renderbuffer);
    fn framebuffer_status(&self) -> u32;
    fn delete_framebuffer(&self, framebuffer: &Self::Framebuffer);

    fn viewport(&self, width: u32, height: u32);
    fn set_depth_test(&self, enabled: bool);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_and_depth(&self);

    fn draw_triangle_strip(&self, first: i32, count: i32);
}

/// Production context backed by a live WebGL2 canvas.
pub struct WebGl {
    gl: WebGl2RenderingContext,
    canvas: web_sys::HtmlCanvasElement,
}

impl WebGl {
    pub fn new(gl: WebGl2RenderingContext) -> Result<Self, RenderError> {
        let canvas = gl
            .canvas()
            .and_then(|c| c.dyn_into::<web_sys::HtmlCanvasElement>().ok())
            .ok_or(RenderError::MissingCanvas)?;
        Ok(Self { gl, canvas })
    }
}

impl GlContext for WebGl {
    type Buffer = web_sys::WebGlBuffer;
    type Shader = web_sys::WebGlShader;
    type Program = web_sys::WebGlProgram;
    type Texture = web_sys::WebGlTexture;
    type Renderbuffer = web_sys::WebGlRenderbuffer;
    type Framebuffer = web_sys::WebGlFramebuffer;
    type UniformLocation = web_sys::WebGlUniformLocation;

    fn canvas_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn create_buffer(&self) -> Option<Self::Buffer> {
        self.gl.create_buffer()
    }

    fn bind_array_buffer(&self, buffer: Option<&Self::Buffer>) {
        self.gl
            .bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, buffer);
    }

    fn array_buffer_data(&self, data: &[f32]) {
        // The view aliases wasm memory and is only valid until the next
        // allocation; buffer_data copies it out immediately.
        unsafe {
            let array = js_sys::Float32Array::view(data);
            self.gl.buffer_data_with_array_buffer_view(
                WebGl2RenderingContext::ARRAY_BUFFER,
                &array,
                WebGl2RenderingContext::STATIC_DRAW,
            );
        }
    }

    fn create_shader(&self, kind: ShaderKind) -> Option<Self::Shader> {
        let kind = match kind {
            ShaderKind::Vertex => WebGl2RenderingContext::VERTEX_SHADER,
            ShaderKind::Fragment => WebGl2RenderingContext::FRAGMENT_SHADER,
        };
        self.gl.create_shader(kind)
    }

    fn shader_source(&self, shader: &Self::Shader, source: &str) {
        self.gl.shader_source(shader, source);
    }

    fn compile_shader(&self, shader: &Self::Shader) {
        self.gl.compile_shader(shader);
    }

    fn shader_compiled(&self, shader: &Self::Shader) -> bool {
        self.gl
            .get_shader_parameter(shader, WebGl2RenderingContext::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> String {
        self.gl
            .get_shader_info_log(shader)
            .unwrap_or_else(|| "unknown error".to_string())
    }

    fn delete_shader(&self, shader: &Self::Shader) {
        self.gl.delete_shader(Some(shader));
    }

    fn create_program(&self) -> Option<Self::Program> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        self.gl.attach_shader(program, shader);
    }

    fn link_program(&self, program: &Self::Program) {
        self.gl.link_program(program);
    }

    fn program_linked(&self, program: &Self::Program) -> bool {
        self.gl
            .get_program_parameter(program, WebGl2RenderingContext::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &Self::Program) -> String {
        self.gl
            .get_program_info_log(program)
            .unwrap_or_else(|| "unknown error".to_string())
    }

    fn delete_program(&self, program: &Self::Program) {
        self.gl.delete_program(Some(program));
    }

    fn use_program(&self, program: Option<&Self::Program>) {
        self.gl.use_program(program);
    }

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        let location = self.gl.get_attrib_location(program, name);
        if location < 0 {
            None
        } else {
            Some(location as u32)
        }
    }

    fn uniform_location(
        &self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        self.gl.enable_vertex_attrib_array(slot);
    }

    fn disable_vertex_attrib_array(&self, slot: u32) {
        self.gl.disable_vertex_attrib_array(slot);
    }

    fn vertex_attrib_pointer(&self, slot: u32, size: i32) {
        self.gl.vertex_attrib_pointer_with_i32(
            slot,
            size,
            WebGl2RenderingContext::FLOAT,
            false,
            0,
            0,
        );
    }

    fn uniform1i(&self, location: &Self::UniformLocation, value: i32) {
        self.gl.uniform1i(Some(location), value);
    }

    fn uniform4fv(&self, location: &Self::UniformLocation, value: &[f32; 4]) {
        self.gl.uniform4fv_with_f32_array(Some(location), value);
    }

    fn uniform_matrix4fv(&self, location: &Self::UniformLocation, value: &[f32; 16]) {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(location), false, value);
    }

    fn create_texture(&self) -> Option<Self::Texture> {
        self.gl.create_texture()
    }

    fn bind_texture(&self, texture: Option<&Self::Texture>) {
        self.gl
            .bind_texture(WebGl2RenderingContext::TEXTURE_2D, texture);
    }

    fn active_texture(&self, unit: u32) {
        self.gl
            .active_texture(WebGl2RenderingContext::TEXTURE0 + unit);
    }

    fn texture_storage_rgba(&self, width: u32, height: u32) {
        // The allocation itself cannot usefully fail here; an invalid size
        // surfaces as an incomplete framebuffer at the completeness check.
        let _ = self
            .gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                WebGl2RenderingContext::TEXTURE_2D,
                0,
                WebGl2RenderingContext::RGBA as i32,
                width as i32,
                height as i32,
                0,
                WebGl2RenderingContext::RGBA,
                WebGl2RenderingContext::UNSIGNED_BYTE,
                None,
            );
    }

    fn texture_filter_linear_clamp(&self) {
        let target = WebGl2RenderingContext::TEXTURE_2D;
        self.gl.tex_parameteri(
            target,
            WebGl2RenderingContext::TEXTURE_MAG_FILTER,
            WebGl2RenderingContext::LINEAR as i32,
        );
        self.gl.tex_parameteri(
            target,
            WebGl2RenderingContext::TEXTURE_MIN_FILTER,
            WebGl2RenderingContext::LINEAR as i32,
        );
        self.gl.tex_parameteri(
            target,
            WebGl2RenderingContext::TEXTURE_WRAP_S,
            WebGl2RenderingContext::CLAMP_TO_EDGE as i32,
        );
        self.gl.tex_parameteri(
            target,
            WebGl2RenderingContext::TEXTURE_WRAP_T,
            WebGl2RenderingContext::CLAMP_TO_EDGE as i32,
        );
    }

    fn delete_texture(&self, texture: &Self::Texture) {
        self.gl.delete_texture(Some(texture));
    }

    fn create_renderbuffer(&self) -> Option<Self::Renderbuffer> {
        self.gl.create_renderbuffer()
    }

    fn bind_renderbuffer(&self, renderbuffer: Option<&Self::Renderbuffer>) {
        self.gl
            .bind_renderbuffer(WebGl2RenderingContext::RENDERBUFFER, renderbuffer);
    }

    fn renderbuffer_depth16(&self, width: u32, height: u32) {
        self.gl.renderbuffer_storage(
            WebGl2RenderingContext::RENDERBUFFER,
            WebGl2RenderingContext::DEPTH_COMPONENT16,
            width as i32,
            height as i32,
        );
    }

    fn delete_renderbuffer(&self, renderbuffer: &Self::Renderbuffer) {
        self.gl.delete_renderbuffer(Some(renderbuffer));
    }

    fn create_framebuffer(&self) -> Option<Self::Framebuffer> {
        self.gl.create_framebuffer()
    }

    fn bind_framebuffer(&self, framebuffer: Option<&Self::Framebuffer>) {
        self.gl
            .bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, framebuffer);
    }

    fn framebuffer_color_texture(&self, texture: &Self::Texture) {
        self.gl.framebuffer_texture_2d(
            WebGl2RenderingContext::FRAMEBUFFER,
            WebGl2RenderingContext::COLOR_ATTACHMENT0,
            WebGl2RenderingContext::TEXTURE_2D,
            Some(texture),
            0,
        );
    }

    fn framebuffer_depth_renderbuffer(&self, renderbuffer: &Self::Renderbuffer) {
        self.gl.framebuffer_renderbuffer(
            WebGl2RenderingContext::FRAMEBUFFER,
            WebGl2RenderingContext::DEPTH_ATTACHMENT,
            WebGl2RenderingContext::RENDERBUFFER,
            Some(renderbuffer),
        );
    }

    fn framebuffer_status(&self) -> u32 {
        self.gl
            .check_framebuffer_status(WebGl2RenderingContext::FRAMEBUFFER)
    }

    fn delete_framebuffer(&self, framebuffer: &Self::Framebuffer) {
        self.gl.delete_framebuffer(Some(framebuffer));
    }

    fn viewport(&self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn set_depth_test(&self, enabled: bool) {
        if enabled {
            self.gl.enable(WebGl2RenderingContext::DEPTH_TEST);
        } else {
            self.gl.disable(WebGl2RenderingContext::DEPTH_TEST);
        }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    fn clear_color_and_depth(&self) {
        self.gl.clear(
            WebGl2RenderingContext::COLOR_BUFFER_BIT | WebGl2RenderingContext::DEPTH_BUFFER_BIT,
        );
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        self.gl
            .draw_arrays(WebGl2RenderingContext::TRIANGLE_STRIP, first, count);
    }
}
