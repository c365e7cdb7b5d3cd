use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures of the rendering pipeline.
///
/// Shader and render-target failures have no transient cause and are fatal
/// for the affected resource; the caller decides whether to abort startup or
/// the frame. Degenerate math inputs are rejected up front instead of letting
/// NaNs propagate into the transform chain.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("shader failed to compile: {log}")]
    ShaderCompile { log: String },

    #[error("shader program failed to link: {log}")]
    ShaderLink { log: String },

    #[error("render target is incomplete (status {status:#06x})")]
    RenderTargetIncomplete { status: u32 },

    #[error("degenerate look-at: eye, center and up do not span a view basis")]
    DegenerateLookAt,

    #[error("degenerate perspective projection (fov {fov}, aspect {aspect}, near {near}, far {far})")]
    DegenerateProjection {
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },

    #[error("failed to allocate GL {0}")]
    ResourceAllocation(&'static str),

    #[error("the WebGL context has no backing canvas")]
    MissingCanvas,

    #[error("shader has no active {kind} named `{name}`")]
    MissingShaderBinding { kind: &'static str, name: String },
}

impl From<RenderError> for JsValue {
    fn from(err: RenderError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}
