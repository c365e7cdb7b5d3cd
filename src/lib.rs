pub mod error;
pub mod matrix;
pub mod renderer;

use crate::renderer::{Renderer, WebGl};
use wasm_bindgen::prelude::*;
use web_sys::WebGl2RenderingContext;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Stateful WebGL ring demo driven from JavaScript
#[wasm_bindgen]
#[derive(Default)]
pub struct RingDemo {
    renderer: Option<Renderer<WebGl>>,
}

#[wasm_bindgen]
impl RingDemo {
    /// Create a new RingDemo instance
    #[wasm_bindgen(constructor)]
    pub fn new() -> RingDemo {
        RingDemo::default()
    }

    /// Initialize with WebGL 2.0 context
    ///
    /// # Arguments
    /// * `gl` - WebGL 2.0 rendering context from canvas
    /// * `ring_count` - Number of nested rings to build
    ///
    /// # Returns
    /// * `"init_done"` signal on success
    pub fn init(&mut self, gl: WebGl2RenderingContext, ring_count: u32) -> Result<String, JsValue> {
        let gl = WebGl::new(gl)?;
        // The palettes are decorative; wall-clock time is plenty of seed.
        let seed = js_sys::Date::now() as u32;
        self.renderer = Some(Renderer::new(gl, ring_count as usize, seed)?);
        Ok("init_done".to_string())
    }

    /// Render one frame at the given rotation angle (radians)
    ///
    /// # Returns
    /// * `"render_done"` signal on success
    ///
    /// # Errors
    /// * Returns error if renderer is not initialized
    pub fn render(&mut self, rotation: f32) -> Result<String, JsValue> {
        if let Some(renderer) = &mut self.renderer {
            renderer.render(rotation)?;
            Ok("render_done".to_string())
        } else {
            Err(JsValue::from_str(
                "Renderer not initialized. Call init() first.",
            ))
        }
    }

    /// Reallocate the offscreen target when canvas dimensions change
    /// (e.g., fullscreen)
    ///
    /// # Returns
    /// * `"resize_done"` signal on success
    ///
    /// # Errors
    /// * Returns error if renderer is not initialized
    pub fn resize(&mut self) -> Result<String, JsValue> {
        if let Some(renderer) = &mut self.renderer {
            renderer.resize()?;
            Ok("resize_done".to_string())
        } else {
            Err(JsValue::from_str(
                "Renderer not initialized. Call init() first.",
            ))
        }
    }
}
