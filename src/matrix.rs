//! 4×4 matrix and 3-vector math for the demo's transform chain.
//!
//! Matrices are flat `[f32; 16]` in column-major order, ready to upload as
//! `mat4` uniforms without transposition. All builders return new values;
//! nothing mutates its input.

use crate::error::RenderError;

/// Column-major 4×4 matrix.
pub type Mat4 = [f32; 16];

/// 3-component vector.
pub type Vec3 = [f32; 3];

const EPSILON: f32 = 1e-6;

/// The 4×4 identity matrix.
pub fn identity() -> Mat4 {
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, //
    ]
}

/// Symmetric perspective projection.
///
/// `fov` is the vertical field of view in radians. Rejects the inputs that
/// would collapse the frustum (`fov` outside (0, π), non-positive or
/// non-finite `aspect`, `near == far`) instead of producing a degenerate
/// matrix.
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Result<Mat4, RenderError> {
    if !(fov > 0.0 && fov < std::f32::consts::PI)
        || !(aspect > 0.0 && aspect.is_finite())
        || near == far
    {
        return Err(RenderError::DegenerateProjection {
            fov,
            aspect,
            near,
            far,
        });
    }

    let f = 1.0 / (0.5 * fov).tan();
    let range_inv = 1.0 / (near - far);

    Ok([
        f / aspect,
        0.0,
        0.0,
        0.0,
        0.0,
        f,
        0.0,
        0.0,
        0.0,
        0.0,
        (near + far) * range_inv,
        -1.0,
        0.0,
        0.0,
        near * far * range_inv * 2.0,
        0.0,
    ])
}

/// Camera matrix looking from `eye` toward `center` with `up` as the
/// vertical reference.
///
/// Rejects `eye == center` and `up` parallel to the view direction up front;
/// either would divide by zero while building the orthonormal basis.
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Result<Mat4, RenderError> {
    let forward = [center[0] - eye[0], center[1] - eye[1], center[2] - eye[2]];
    if vec3_length(forward) < EPSILON || vec3_length(up) < EPSILON {
        return Err(RenderError::DegenerateLookAt);
    }

    let f = vec3_normalized(forward);
    let u = vec3_normalized(up);

    let side = vec3_cross(f, u);
    if vec3_length(side) < EPSILON {
        // up is parallel to the view direction
        return Err(RenderError::DegenerateLookAt);
    }

    let s = vec3_normalized(side);
    let u = vec3_cross(s, f);

    Ok([
        s[0],
        u[0],
        -f[0],
        0.0,
        s[1],
        u[1],
        -f[1],
        0.0,
        s[2],
        u[2],
        -f[2],
        0.0,
        -center[0] * s[0] - center[1] * s[1] - center[2] * s[2],
        -center[0] * u[0] - center[1] * u[1] - center[2] * u[2],
        center[0] * f[0] + center[1] * f[1] + center[2] * f[2],
        1.0,
    ])
}

/// Rotation about the X axis.
pub fn rotation_x(angle: f32) -> Mat4 {
    let c = angle.cos();
    let s = angle.sin();
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, c, s, 0.0, //
        0.0, -s, c, 0.0, //
        0.0, 0.0, 0.0, 1.0, //
    ]
}

/// Rotation about the Y axis.
pub fn rotation_y(angle: f32) -> Mat4 {
    let c = angle.cos();
    let s = angle.sin();
    [
        c, 0.0, -s, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        s, 0.0, c, 0.0, //
        0.0, 0.0, 0.0, 1.0, //
    ]
}

/// Rotation about the Z axis.
pub fn rotation_z(angle: f32) -> Mat4 {
    let c = angle.cos();
    let s = angle.sin();
    [
        c, s, 0.0, 0.0, //
        -s, c, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, //
    ]
}

/// Uniform scale.
pub fn scale(s: f32) -> Mat4 {
    [
        s, 0.0, 0.0, 0.0, //
        0.0, s, 0.0, 0.0, //
        0.0, 0.0, s, 0.0, //
        0.0, 0.0, 0.0, 1.0, //
    ]
}

/// Returns `mat` with (x, y, z) added to its translation column.
pub fn translate(mat: &Mat4, x: f32, y: f32, z: f32) -> Mat4 {
    let mut out = *mat;
    out[12] += x;
    out[13] += y;
    out[14] += z;
    out
}

/// Matrix product with the contraction `out[4i+j] = Σ_k a[4i+k] · b[4k+j]`.
///
/// Under the column-major convention the uniforms use, the combined transform
/// applies `a` before `b`. The ring accumulation in the scene depends on this
/// exact ordering; do not swap the operands.
pub fn mat4_mult(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0f32; 16];
    for i in 0..4 {
        for j in 0..4 {
            let mut sum = 0.0;
            for k in 0..4 {
                sum += a[i * 4 + k] * b[k * 4 + j];
            }
            out[i * 4 + j] = sum;
        }
    }
    out
}

/// Unit-length copy of `v`. `v` must be non-zero.
pub fn vec3_normalized(v: Vec3) -> Vec3 {
    let l = vec3_length(v);
    [v[0] / l, v[1] / l, v[2] / l]
}

/// Cross product `a × b`.
pub fn vec3_cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn vec3_length(v: Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
