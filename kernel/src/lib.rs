//! Compute kernel colouring the Mandelbrot set.
//!
//! The same colouring function runs on the CPU runner and, compiled to
//! SPIR-V, as the compute shader entry point.

#![cfg_attr(target_arch = "spirv", no_std)]

use shared::{ImageParams, MAX_ITERATIONS};

#[cfg(not(target_arch = "spirv"))]
use glam::{vec2, vec3, Vec2, Vec3, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::{
    glam::{vec2, vec3, UVec3, Vec2, Vec3, Vec4},
    num_traits::Float,
    spirv,
};

/// Squared magnitude past which an orbit counts as escaped
const ESCAPE_RADIUS_SQ: f32 = 2.0;

/// Centre of the view in the complex plane
const VIEW_CENTRE: Vec2 = Vec2::new(-0.445, 0.0);

/// Width of the view in the complex plane
const VIEW_SCALE: f32 = 2.0 + 1.7 * 0.2;

/// Cosine palette: `PALETTE_BIAS + PALETTE_AMPLITUDE * cos(TAU * (PALETTE_FREQUENCY * t + PALETTE_PHASE))`
const PALETTE_BIAS: Vec3 = Vec3::new(0.3, 0.3, 0.5);
const PALETTE_AMPLITUDE: Vec3 = Vec3::new(-0.2, -0.3, -0.5);
const PALETTE_FREQUENCY: Vec3 = Vec3::new(2.1, 2.0, 3.0);
const PALETTE_PHASE: Vec3 = Vec3::new(0.0, 0.1, 0.0);

/// Number of iterations before the orbit of `c` escapes, capped at
/// [`MAX_ITERATIONS`].
#[inline]
pub fn escape_iterations(c: Vec2) -> u32 {
    let mut z = Vec2::ZERO;
    let mut n = 0;
    while n < MAX_ITERATIONS {
        z = vec2(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y) + c;
        if z.dot(z) > ESCAPE_RADIUS_SQ {
            break;
        }
        n += 1;
    }
    n
}

/// Point of the complex plane sampled by pixel `(x, y)`
#[inline]
pub fn sample_point(x: u32, y: u32, params: &ImageParams) -> Vec2 {
    let uv = vec2(
        x as f32 / params.width as f32,
        y as f32 / params.height as f32,
    );
    VIEW_CENTRE + (uv - Vec2::splat(0.5)) * VIEW_SCALE
}

/// Map a normalised escape time in `[0, 1]` to an opaque colour
#[inline]
pub fn palette(t: f32) -> Vec4 {
    let phase = (PALETTE_FREQUENCY * t + PALETTE_PHASE) * core::f32::consts::TAU;
    let wave = vec3(phase.x.cos(), phase.y.cos(), phase.z.cos());
    (PALETTE_BIAS + PALETTE_AMPLITUDE * wave).extend(1.0)
}

/// Colour of pixel `(x, y)`
#[inline]
pub fn mandelbrot_texel(x: u32, y: u32, params: &ImageParams) -> Vec4 {
    let n = escape_iterations(sample_point(x, y, params));
    palette(n as f32 / MAX_ITERATIONS as f32)
}

/// GPU entry point for Vulkan/SPIR-V
///
/// Local size must match `shared::SHADER_LOCAL_SIZE`.
#[cfg(target_arch = "spirv")]
#[spirv(compute(threads(32, 32)))]
pub fn mandelbrot(
    #[spirv(global_invocation_id)] gid: UVec3,
    #[spirv(storage_buffer, descriptor_set = 0, binding = 0)] image: &mut [Vec4],
    #[spirv(push_constant)] params: &ImageParams,
) {
    if !params.contains(gid.x, gid.y) {
        return;
    }
    image[params.texel_index(gid.x, gid.y)] = mandelbrot_texel(gid.x, gid.y, params);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_iterations(Vec2::ZERO), MAX_ITERATIONS);
        assert_eq!(escape_iterations(vec2(-1.0, 0.0)), MAX_ITERATIONS);
    }

    #[test]
    fn far_points_escape_immediately() {
        assert_eq!(escape_iterations(vec2(2.0, 2.0)), 0);
        assert_eq!(escape_iterations(vec2(-3.0, 0.0)), 0);
    }

    #[test]
    fn sample_point_spans_the_view() {
        let params = ImageParams::new(100, 100);
        let centre = sample_point(50, 50, &params);
        assert!((centre - VIEW_CENTRE).length() < 1e-6);

        let corner = sample_point(0, 0, &params);
        assert!((corner.x - (VIEW_CENTRE.x - VIEW_SCALE * 0.5)).abs() < 1e-6);
        assert!((corner.y + VIEW_SCALE * 0.5).abs() < 1e-6);
    }

    #[test]
    fn palette_is_opaque_and_in_range() {
        for i in 0..=MAX_ITERATIONS {
            let colour = palette(i as f32 / MAX_ITERATIONS as f32);
            assert_eq!(colour.w, 1.0);
            for c in [colour.x, colour.y, colour.z] {
                assert!((0.0..=1.0).contains(&c), "channel {c} out of range at {i}");
            }
        }
    }

    #[test]
    fn palette_endpoints() {
        // cos(0) = 1 for the red and blue channels at t = 0
        let start = palette(0.0);
        assert!((start.x - 0.1).abs() < 1e-6);
        assert!(start.z.abs() < 1e-6);
    }

    #[test]
    fn texels_are_deterministic() {
        let params = ImageParams::new(64, 48);
        for (x, y) in [(0, 0), (63, 47), (31, 17)] {
            assert_eq!(
                mandelbrot_texel(x, y, &params),
                mandelbrot_texel(x, y, &params)
            );
        }
    }
}
