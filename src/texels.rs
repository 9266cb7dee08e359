//! Host-side image buffers and the float to 8-bit texel conversion

use glam::Vec4;
use image::{Rgba32FImage, RgbaImage};
use rayon::prelude::*;
use shared::ImageParams;

use crate::error::{ComputeError, CrateResult};

/// Narrow a colour channel to 8 bits.
///
/// The channel is scaled by 255 and truncated toward zero. Out-of-range
/// values are clamped: negatives and NaN map to 0, anything above 1.0 maps
/// to 255.
#[inline]
pub fn unorm8(channel: f32) -> u8 {
    if channel.is_nan() {
        return 0;
    }
    (channel * 255.0).clamp(0.0, 255.0) as u8
}

/// Convert one float RGBA texel to 8-bit RGBA
#[inline]
pub fn texel_to_rgba8(texel: Vec4) -> [u8; 4] {
    [
        unorm8(texel.x),
        unorm8(texel.y),
        unorm8(texel.z),
        unorm8(texel.w),
    ]
}

/// A row-major grid of float RGBA texels, laid out exactly like the
/// shader's storage buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatImage {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
}

impl FloatImage {
    pub fn from_texels(params: ImageParams, texels: Vec<Vec4>) -> CrateResult<Self> {
        if texels.len() != params.num_texels() {
            return Err(ComputeError::TexelCountMismatch {
                expected: params.num_texels(),
                actual: texels.len(),
            });
        }
        Ok(Self {
            width: params.width,
            height: params.height,
            texels,
        })
    }

    /// Image with every texel set to `texel`
    pub fn filled(params: ImageParams, texel: Vec4) -> Self {
        Self {
            width: params.width,
            height: params.height,
            texels: vec![texel; params.num_texels()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn params(&self) -> ImageParams {
        ImageParams::new(self.width, self.height)
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Vec4> {
        let params = self.params();
        params
            .contains(x, y)
            .then(|| self.texels[params.texel_index(x, y)])
    }

    /// Texel data as raw `f32` channels in RGBA order
    pub fn as_channels(&self) -> &[f32] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Convert to 8-bit RGBA with [`unorm8`] applied per channel
    pub fn to_rgba8(&self) -> CrateResult<RgbaImage> {
        let mut bytes = vec![0u8; self.texels.len() * 4];
        bytes
            .par_chunks_exact_mut(4)
            .zip(self.texels.par_iter())
            .for_each(|(dst, &texel)| dst.copy_from_slice(&texel_to_rgba8(texel)));
        RgbaImage::from_raw(self.width, self.height, bytes).ok_or_else(|| self.size_mismatch())
    }

    /// Float image in the form the encoders take
    pub fn to_rgba32f(&self) -> CrateResult<Rgba32FImage> {
        Rgba32FImage::from_raw(self.width, self.height, self.as_channels().to_vec())
            .ok_or_else(|| self.size_mismatch())
    }

    fn size_mismatch(&self) -> ComputeError {
        ComputeError::TexelCountMismatch {
            expected: self.params().num_texels(),
            actual: self.texels.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_range_truncates() {
        for i in 0..=1000 {
            let c = i as f32 / 1000.0;
            assert_eq!(unorm8(c) as f32, (c * 255.0).floor(), "channel {c}");
        }
        assert_eq!(unorm8(0.5), 127);
        assert_eq!(unorm8(0.999), 254);
    }

    #[test]
    fn black_and_white_endpoints() {
        assert_eq!(texel_to_rgba8(Vec4::ZERO), [0, 0, 0, 0]);
        assert_eq!(texel_to_rgba8(Vec4::ONE), [255, 255, 255, 255]);
    }

    #[test]
    fn out_of_range_channels_clamp() {
        assert_eq!(unorm8(-0.5), 0);
        assert_eq!(unorm8(-1e9), 0);
        assert_eq!(unorm8(1.5), 255);
        assert_eq!(unorm8(1e9), 255);
        assert_eq!(unorm8(f32::NAN), 0);
        assert_eq!(unorm8(f32::INFINITY), 255);
        assert_eq!(unorm8(f32::NEG_INFINITY), 0);
        assert_eq!(
            texel_to_rgba8(Vec4::new(-0.1, 2.0, 0.5, f32::NAN)),
            [0, 255, 127, 0]
        );
    }

    #[test]
    fn white_two_by_two() {
        let image = FloatImage::filled(ImageParams::new(2, 2), Vec4::ONE);
        let bytes = image.to_rgba8().unwrap();
        assert_eq!(bytes.dimensions(), (2, 2));
        assert!(bytes.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn conversion_keeps_row_major_order() {
        let params = ImageParams::new(3, 2);
        let texels: Vec<Vec4> = (0..6)
            .map(|i| Vec4::new(i as f32 / 5.0, 0.0, 1.0 - i as f32 / 5.0, 1.0))
            .collect();
        let image = FloatImage::from_texels(params, texels.clone()).unwrap();
        let bytes = image.to_rgba8().unwrap();

        assert_eq!(bytes.len(), 6 * 4);
        for y in 0..2 {
            for x in 0..3 {
                let src = texels[(y * 3 + x) as usize];
                assert_eq!(bytes.get_pixel(x, y).0, texel_to_rgba8(src), "({x}, {y})");
                assert_eq!(image.get(x, y), Some(src));
            }
        }
        assert_eq!(image.get(3, 0), None);
    }

    #[test]
    fn float_form_keeps_every_channel() {
        let params = ImageParams::new(2, 1);
        let texels = vec![Vec4::new(0.1, 0.2, 0.3, 0.4), Vec4::new(-1.0, 2.0, 3.0, 4.0)];
        let image = FloatImage::from_texels(params, texels).unwrap();
        assert_eq!(
            image.as_channels(),
            &[0.1, 0.2, 0.3, 0.4, -1.0, 2.0, 3.0, 4.0]
        );
        let float = image.to_rgba32f().unwrap();
        assert_eq!(float.get_pixel(1, 0).0, [-1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn texel_count_must_match_the_size() {
        let err = FloatImage::from_texels(ImageParams::new(2, 2), vec![Vec4::ZERO; 3]).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::TexelCountMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }
}
