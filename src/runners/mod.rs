pub mod cpu;
pub mod vulkano;

pub use self::cpu::CpuRunner;
pub use self::vulkano::VulkanoRunner;

use crate::{error::CrateResult, texels::FloatImage};
use shared::ImageParams;

/// Which runner produced an image, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub runner: &'static str,
    pub api: Option<&'static str>,
    pub device_name: Option<String>,
}

/// A backend that fills an image by running the compute kernel once
pub trait ComputeRunner {
    fn backend_info(&self) -> BackendInfo;

    /// Run one dispatch over `params` and return the float RGBA result
    fn render(&self, params: ImageParams, workgroup_size: u32) -> CrateResult<FloatImage>;
}
