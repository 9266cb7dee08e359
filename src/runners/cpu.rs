//! CPU execution for compute kernels

use crate::{
    error::{ComputeError, CrateResult},
    runners::{BackendInfo, ComputeRunner},
    texels::FloatImage,
};
use glam::Vec4;
use kernel::mandelbrot_texel;
use rayon::prelude::*;
use shared::{num_workgroups_2d, ImageParams, SHADER_LOCAL_SIZE};

/// CPU-based runner evaluating the kernel with native Rust code
pub struct CpuRunner;

/// Extent actually written by a `workgroup_size` dispatch of the
/// `SHADER_LOCAL_SIZE`-wide kernel, clipped to the image.
pub fn dispatch_coverage(params: ImageParams, workgroup_size: u32) -> (u32, u32) {
    let [groups_x, groups_y, _] = num_workgroups_2d(params.width, params.height, workgroup_size);
    (
        groups_x
            .saturating_mul(SHADER_LOCAL_SIZE)
            .min(params.width),
        groups_y
            .saturating_mul(SHADER_LOCAL_SIZE)
            .min(params.height),
    )
}

impl ComputeRunner for CpuRunner {
    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            runner: "cpu",
            api: Some("Native"),
            device_name: None,
        }
    }

    fn render(&self, params: ImageParams, workgroup_size: u32) -> CrateResult<FloatImage> {
        if workgroup_size == 0 {
            return Err(ComputeError::InvalidConfig(
                "workgroup size must be greater than zero".into(),
            ));
        }
        if params.width == 0 || params.height == 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "image size must be non-empty, got {}x{}",
                params.width, params.height
            )));
        }
        // Texels the dispatch never reaches keep the buffer's zero fill
        let (covered_x, covered_y) = dispatch_coverage(params, workgroup_size);
        let mut texels = vec![Vec4::ZERO; params.num_texels()];

        // One row per task, like invocations along y
        texels
            .par_chunks_mut(params.width as usize)
            .take(covered_y as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, texel) in row.iter_mut().take(covered_x as usize).enumerate() {
                    *texel = mandelbrot_texel(x as u32, y as u32, &params);
                }
            });

        FloatImage::from_texels(params, texels)
    }
}

#[cfg(test)]
mod tests {
    use super::{dispatch_coverage, CpuRunner};
    use crate::runners::ComputeRunner;
    use glam::Vec4;
    use shared::ImageParams;

    #[test]
    fn fills_every_texel() {
        let params = ImageParams::new(13, 7);
        let image = CpuRunner.render(params, 32).unwrap();
        assert_eq!(image.texels().len(), 13 * 7);
        assert!(image.texels().iter().all(|t| t.w == 1.0));
        assert!(image
            .texels()
            .iter()
            .flat_map(|t| t.to_array())
            .all(|c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn matches_the_kernel_per_texel() {
        let params = ImageParams::new(8, 8);
        let image = CpuRunner.render(params, 4).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(
                    image.get(x, y),
                    Some(kernel::mandelbrot_texel(x, y, &params))
                );
            }
        }
    }

    #[test]
    fn workgroup_sizes_up_to_local_size_cover_the_image() {
        let params = ImageParams::new(33, 17);
        let a = CpuRunner.render(params, 32).unwrap();
        let b = CpuRunner.render(params, 5).unwrap();
        assert_eq!(a, b);
        assert_eq!(dispatch_coverage(params, 5), (33, 17));
    }

    #[test]
    fn large_workgroup_size_leaves_the_rest_zeroed() {
        let params = ImageParams::new(128, 96);
        // 2 x 2 groups of 32 x 32 invocations
        assert_eq!(dispatch_coverage(params, 64), (64, 64));

        let image = CpuRunner.render(params, 64).unwrap();
        let full = CpuRunner.render(params, 32).unwrap();
        for y in 0..96 {
            for x in 0..128 {
                let texel = image.get(x, y).unwrap();
                if x < 64 && y < 64 {
                    assert_eq!(texel, full.get(x, y).unwrap());
                } else {
                    assert_eq!(texel, Vec4::ZERO, "texel ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn zero_workgroup_size_is_rejected() {
        assert!(CpuRunner.render(ImageParams::new(4, 4), 0).is_err());
    }

    #[test]
    fn empty_images_are_rejected() {
        assert!(matches!(
            CpuRunner.render(ImageParams::new(0, 4), 32),
            Err(crate::error::ComputeError::InvalidConfig(_))
        ));
        assert!(CpuRunner.render(ImageParams::new(4, 0), 32).is_err());
    }

    #[test]
    fn backend_info() {
        let info = CpuRunner.backend_info();
        assert_eq!(info.runner, "cpu");
        assert_eq!(info.device_name, None);
    }
}
