//! In-memory GL double for the pipeline tests.
//!
//! Every handle is a plain integer and every call lands in an ordered log, so
//! tests can assert on draw order, bound targets and resource releases
//! without a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::context::{GlContext, ShaderKind, FRAMEBUFFER_COMPLETE};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateBuffer(u32),
    BindArrayBuffer(Option<u32>),
    BufferData(Vec<f32>),
    UseProgram(Option<u32>),
    EnableAttrib(u32),
    DisableAttrib(u32),
    AttribPointer { slot: u32, size: i32 },
    Uniform1i { name: String, value: i32 },
    Uniform4f { name: String, value: [f32; 4] },
    UniformMat4 { name: String, value: [f32; 16] },
    ActiveTexture(u32),
    BindTexture(Option<u32>),
    TexStorage { width: u32, height: u32 },
    TexFilter,
    BindRenderbuffer(Option<u32>),
    RenderbufferStorage { width: u32, height: u32 },
    BindFramebuffer(Option<u32>),
    AttachColorTexture(u32),
    AttachDepthRenderbuffer(u32),
    DeleteShader(u32),
    DeleteProgram(u32),
    DeleteTexture(u32),
    DeleteRenderbuffer(u32),
    DeleteFramebuffer(u32),
    Viewport { width: u32, height: u32 },
    DepthTest(bool),
    ClearColor,
    Clear,
    Draw { target: Option<u32>, first: i32, count: i32 },
}

pub struct RecordingGl {
    pub calls: RefCell<Vec<Call>>,
    pub canvas: Cell<(u32, u32)>,
    pub compile_ok: Cell<bool>,
    pub link_ok: Cell<bool>,
    pub framebuffer_status: Cell<u32>,
    next_handle: Cell<u32>,
    bound_framebuffer: Cell<Option<u32>>,
    attrib_slots: RefCell<HashMap<(u32, String), u32>>,
    next_attrib_slot: RefCell<HashMap<u32, u32>>,
}

impl RecordingGl {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            canvas: Cell::new((width, height)),
            compile_ok: Cell::new(true),
            link_ok: Cell::new(true),
            framebuffer_status: Cell::new(FRAMEBUFFER_COMPLETE),
            next_handle: Cell::new(1),
            bound_framebuffer: Cell::new(None),
            attrib_slots: RefCell::new(HashMap::new()),
            next_attrib_slot: RefCell::new(HashMap::new()),
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn handle(&self) -> u32 {
        let h = self.next_handle.get();
        self.next_handle.set(h + 1);
        h
    }

    /// The recorded calls matching `pick`, in order.
    pub fn filtered<T>(&self, pick: impl Fn(&Call) -> Option<T>) -> Vec<T> {
        self.calls.borrow().iter().filter_map(pick).collect()
    }

    pub fn draws(&self) -> Vec<(Option<u32>, i32, i32)> {
        self.filtered(|c| match c {
            Call::Draw { target, first, count } => Some((*target, *first, *count)),
            _ => None,
        })
    }

    /// Most recent upload into an array buffer.
    pub fn last_buffer_data(&self) -> Vec<f32> {
        self.filtered(|c| match c {
            Call::BufferData(data) => Some(data.clone()),
            _ => None,
        })
        .pop()
        .unwrap_or_default()
    }

    pub fn clear_log(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl GlContext for RecordingGl {
    type Buffer = u32;
    type Shader = u32;
    type Program = u32;
    type Texture = u32;
    type Renderbuffer = u32;
    type Framebuffer = u32;
    type UniformLocation = String;

    fn canvas_size(&self) -> (u32, u32) {
        self.canvas.get()
    }

    fn create_buffer(&self) -> Option<u32> {
        let h = self.handle();
        self.record(Call::CreateBuffer(h));
        Some(h)
    }

    fn bind_array_buffer(&self, buffer: Option<&u32>) {
        self.record(Call::BindArrayBuffer(buffer.copied()));
    }

    fn array_buffer_data(&self, data: &[f32]) {
        self.record(Call::BufferData(data.to_vec()));
    }

    fn create_shader(&self, _kind: ShaderKind) -> Option<u32> {
        Some(self.handle())
    }

    fn shader_source(&self, _shader: &u32, _source: &str) {}

    fn compile_shader(&self, _shader: &u32) {}

    fn shader_compiled(&self, _shader: &u32) -> bool {
        self.compile_ok.get()
    }

    fn shader_info_log(&self, _shader: &u32) -> String {
        "synthetic compile failure".to_string()
    }

    fn delete_shader(&self, shader: &u32) {
        self.record(Call::DeleteShader(*shader));
    }

    fn create_program(&self) -> Option<u32> {
        Some(self.handle())
    }

    fn attach_shader(&self, _program: &u32, _shader: &u32) {}

    fn link_program(&self, _program: &u32) {}

    fn program_linked(&self, _program: &u32) -> bool {
        self.link_ok.get()
    }

    fn program_info_log(&self, _program: &u32) -> String {
        "synthetic link failure".to_string()
    }

    fn delete_program(&self, program: &u32) {
        self.record(Call::DeleteProgram(*program));
    }

    fn use_program(&self, program: Option<&u32>) {
        self.record(Call::UseProgram(program.copied()));
    }

    fn attrib_location(&self, program: &u32, name: &str) -> Option<u32> {
        let key = (*program, name.to_string());
        if let Some(slot) = self.attrib_slots.borrow().get(&key) {
            return Some(*slot);
        }
        let mut next = self.next_attrib_slot.borrow_mut();
        let slot = next.entry(*program).or_insert(0);
        let assigned = *slot;
        *slot += 1;
        self.attrib_slots.borrow_mut().insert(key, assigned);
        Some(assigned)
    }

    fn uniform_location(&self, _program: &u32, name: &str) -> Option<String> {
        Some(name.to_string())
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        self.record(Call::EnableAttrib(slot));
    }

    fn disable_vertex_attrib_array(&self, slot: u32) {
        self.record(Call::DisableAttrib(slot));
    }

    fn vertex_attrib_pointer(&self, slot: u32, size: i32) {
        self.record(Call::AttribPointer { slot, size });
    }

    fn uniform1i(&self, location: &String, value: i32) {
        self.record(Call::Uniform1i { name: location.clone(), value });
    }

    fn uniform4fv(&self, location: &String, value: &[f32; 4]) {
        self.record(Call::Uniform4f { name: location.clone(), value: *value });
    }

    fn uniform_matrix4fv(&self, location: &String, value: &[f32; 16]) {
        self.record(Call::UniformMat4 { name: location.clone(), value: *value });
    }

    fn create_texture(&self) -> Option<u32> {
        Some(self.handle())
    }

    fn bind_texture(&self, texture: Option<&u32>) {
        self.record(Call::BindTexture(texture.copied()));
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn texture_storage_rgba(&self, width: u32, height: u32) {
        self.record(Call::TexStorage { width, height });
    }

    fn texture_filter_linear_clamp(&self) {
        self.record(Call::TexFilter);
    }

    fn delete_texture(&self, texture: &u32) {
        self.record(Call::DeleteTexture(*texture));
    }

    fn create_renderbuffer(&self) -> Option<u32> {
        Some(self.handle())
    }

    fn bind_renderbuffer(&self, renderbuffer: Option<&u32>) {
        self.record(Call::BindRenderbuffer(renderbuffer.copied()));
    }

    fn renderbuffer_depth16(&self, width: u32, height: u32) {
        self.record(Call::RenderbufferStorage { width, height });
    }

    fn delete_renderbuffer(&self, renderbuffer: &u32) {
        self.record(Call::DeleteRenderbuffer(*renderbuffer));
    }

    fn create_framebuffer(&self) -> Option<u32> {
        Some(self.handle())
    }

    fn bind_framebuffer(&self, framebuffer: Option<&u32>) {
        self.bound_framebuffer.set(framebuffer.copied());
        self.record(Call::BindFramebuffer(framebuffer.copied()));
    }

    fn framebuffer_color_texture(&self, texture: &u32) {
        self.record(Call::AttachColorTexture(*texture));
    }

    fn framebuffer_depth_renderbuffer(&self, renderbuffer: &u32) {
        self.record(Call::AttachDepthRenderbuffer(*renderbuffer));
    }

    fn framebuffer_status(&self) -> u32 {
        self.framebuffer_status.get()
    }

    fn delete_framebuffer(&self, framebuffer: &u32) {
        self.record(Call::DeleteFramebuffer(*framebuffer));
    }

    fn viewport(&self, width: u32, height: u32) {
        self.record(Call::Viewport { width, height });
    }

    fn set_depth_test(&self, enabled: bool) {
        self.record(Call::DepthTest(enabled));
    }

    fn clear_color(&self, _r: f32, _g: f32, _b: f32, _a: f32) {
        self.record(Call::ClearColor);
    }

    fn clear_color_and_depth(&self) {
        self.record(Call::Clear);
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        self.record(Call::Draw {
            target: self.bound_framebuffer.get(),
            first,
            count,
        });
    }
}
