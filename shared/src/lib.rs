//! Types shared between the host and the compute kernel
#![cfg_attr(not(test), no_std)]

use bytemuck::{Pod, Zeroable};

/// Default output width in pixels
pub const DEFAULT_WIDTH: u32 = 1024;
/// Default output height in pixels
pub const DEFAULT_HEIGHT: u32 = 1024;

/// Default number of tiles per workgroup edge used to size the dispatch
pub const DEFAULT_WORKGROUP_SIZE: u32 = 32;

/// Local size (per axis) the compute kernel is compiled with.
/// IMPORTANT: This must be kept in sync with the literal in kernel/src/lib.rs
pub const SHADER_LOCAL_SIZE: u32 = 32;

/// Iteration cap of the escape-time loop
pub const MAX_ITERATIONS: u32 = 128;

/// Bytes per texel in the storage buffer (one tightly packed `vec4`)
pub const TEXEL_SIZE: u32 = 16;

/// Push constants shared between CPU and GPU.
///
/// Carries the image size so host and device agree on the buffer extent
/// instead of relying on a constant baked into the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ImageParams {
    pub width: u32,
    pub height: u32,
}

impl ImageParams {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn num_texels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether `(x, y)` lies inside the image
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Row-major index of `(x, y)` in the storage buffer
    #[inline]
    pub fn texel_index(&self, x: u32, y: u32) -> usize {
        self.width as usize * y as usize + x as usize
    }

    /// Whether every texel index fits the shader's 32-bit indexing
    #[inline]
    pub fn fits_u32_indexing(&self) -> bool {
        self.width.checked_mul(self.height).is_some()
    }
}

#[cfg(not(target_arch = "spirv"))]
impl core::fmt::Display for ImageParams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Default for ImageParams {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

#[inline]
pub const fn div_ceil_u32(n: u32, d: u32) -> u32 {
    // Precondition: d > 0
    n / d + ((n % d) != 0) as u32
}

/// Workgroup counts covering a `width x height` grid in tiles of
/// `workgroup_size x workgroup_size`.
pub fn num_workgroups_2d(width: u32, height: u32, workgroup_size: u32) -> [u32; 3] {
    [
        div_ceil_u32(width, workgroup_size),
        div_ceil_u32(height, workgroup_size),
        1,
    ]
}
