use crate::error::RenderError;

use super::context::{GlContext, FRAMEBUFFER_COMPLETE};

/// Offscreen color + depth render target sized to the canvas.
///
/// The GL resources live only between `update()` calls: every update releases
/// the previous framebuffer, texture and renderbuffer before allocating the
/// new set, so repeated resizes never leak.
pub struct RenderTarget<G: GlContext> {
    framebuffer: Option<G::Framebuffer>,
    color: Option<G::Texture>,
    depth: Option<G::Renderbuffer>,
    width: u32,
    height: u32,
}

impl<G: GlContext> RenderTarget<G> {
    pub fn new() -> Self {
        Self {
            framebuffer: None,
            color: None,
            depth: None,
            width: 0,
            height: 0,
        }
    }

    /// (Re)allocates the attachments at the current canvas size.
    pub fn update(&mut self, gl: &G) -> Result<(), RenderError> {
        if let Some(framebuffer) = self.framebuffer.take() {
            gl.delete_framebuffer(&framebuffer);
        }
        if let Some(color) = self.color.take() {
            gl.delete_texture(&color);
        }
        if let Some(depth) = self.depth.take() {
            gl.delete_renderbuffer(&depth);
        }

        let (width, height) = gl.canvas_size();

        let framebuffer = gl
            .create_framebuffer()
            .ok_or(RenderError::ResourceAllocation("framebuffer"))?;
        gl.bind_framebuffer(Some(&framebuffer));

        let color = gl
            .create_texture()
            .ok_or(RenderError::ResourceAllocation("texture"))?;
        gl.bind_texture(Some(&color));
        gl.texture_filter_linear_clamp();
        gl.texture_storage_rgba(width, height);
        gl.framebuffer_color_texture(&color);

        let depth = gl
            .create_renderbuffer()
            .ok_or(RenderError::ResourceAllocation("renderbuffer"))?;
        gl.bind_renderbuffer(Some(&depth));
        gl.renderbuffer_depth16(width, height);
        gl.framebuffer_depth_renderbuffer(&depth);

        let status = gl.framebuffer_status();

        gl.bind_texture(None);
        gl.bind_renderbuffer(None);
        gl.bind_framebuffer(None);

        // Stored even on failure so the next update releases them.
        self.framebuffer = Some(framebuffer);
        self.color = Some(color);
        self.depth = Some(depth);
        self.width = width;
        self.height = height;

        if status != FRAMEBUFFER_COMPLETE {
            return Err(RenderError::RenderTargetIncomplete { status });
        }

        log::info!("render target allocated at {width}x{height}");
        Ok(())
    }

    /// Makes this target the draw destination, viewport at its pixel size.
    ///
    /// Panics if `update()` has never succeeded.
    pub fn bind(&self, gl: &G) {
        let framebuffer = self
            .framebuffer
            .as_ref()
            .expect("render target used before update()");
        gl.bind_framebuffer(Some(framebuffer));
        gl.viewport(self.width, self.height);
    }

    /// Redirects drawing back to the canvas, viewport at its current size.
    pub fn draw_to_canvas(&self, gl: &G) {
        gl.bind_framebuffer(None);
        let (width, height) = gl.canvas_size();
        gl.viewport(width, height);
    }

    /// Binds the color texture on texture unit `unit`.
    ///
    /// Panics if `update()` has never succeeded.
    pub fn use_texture(&self, gl: &G, unit: u32) {
        let color = self
            .color
            .as_ref()
            .expect("render target used before update()");
        gl.active_texture(unit);
        gl.bind_texture(Some(color));
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
