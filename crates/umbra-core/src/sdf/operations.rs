//! Distance blending for scene combinators
//!
//! Every combinator in [`Combine`](crate::scene::Combine) reduces to one of
//! these two functions. Hard variants pass `k = 0`; subtraction negates the
//! cutter's distance before taking the maximum.

/// Polynomial smooth minimum.
///
/// Returns the blended distance and the weight `h` of `a` in the blend
/// (`h >= 0.5` means `a` dominates). `k <= 0` is a hard `min`.
pub fn smooth_min_weighted(a: f32, b: f32, k: f32) -> (f32, f32) {
    if k <= 0.0 {
        return if a <= b { (a, 1.0) } else { (b, 0.0) };
    }
    let h = (0.5 + 0.5 * (b - a) / k).clamp(0.0, 1.0);
    (lerp(b, a, h) - k * h * (1.0 - h), h)
}

/// Polynomial smooth maximum, the mirror of [`smooth_min_weighted`].
pub fn smooth_max_weighted(a: f32, b: f32, k: f32) -> (f32, f32) {
    if k <= 0.0 {
        return if a >= b { (a, 1.0) } else { (b, 0.0) };
    }
    let h = (0.5 - 0.5 * (b - a) / k).clamp(0.0, 1.0);
    (lerp(b, a, h) + k * h * (1.0 - h), h)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
