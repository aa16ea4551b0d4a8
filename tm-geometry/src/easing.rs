//! Easing and blending functions, written to match their GLSL counterparts.

/// Cubic ease-in-out. Used by the foliage particles.
pub fn ease_in_out_cubic(x: f32) -> f32 {
    if x < 0.5 {
        4. * x * x * x
    } else {
        1. - (-2. * x + 2.).powi(3) / 2.
    }
}

/// Quadratic ease-in-out. Used by the instanced ornaments, which deliberately move with a softer
/// curve than the foliage.
pub fn ease_in_out_quad(x: f32) -> f32 {
    if x < 0.5 {
        2. * x * x
    } else {
        -1. + (4. - 2. * x) * x
    }
}

/// Linear interpolation, like GLSL's `mix()`.
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothing between two edges, like GLSL's `smoothstep()`.
///
/// The edges may be given in either order; `smoothstep(0.5, 0.2, x)` falls from 1 to 0 as `x`
/// rises from 0.2 to 0.5.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0., 1.);
    t * t * (3. - 2. * t)
}
