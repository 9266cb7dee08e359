use crate::{
    error::{ComputeError, CrateResult},
    shader::ShaderBlob,
};

use std::sync::Arc;

use vulkano::{
    device::Device,
    shader::{EntryPoint, ShaderModule, ShaderModuleCreateInfo},
};

/// Create a shader module from a validated SPIR-V blob
pub fn shader_module(device: Arc<Device>, blob: &ShaderBlob) -> CrateResult<Arc<ShaderModule>> {
    let shader_module =
        unsafe { ShaderModule::new(device, ShaderModuleCreateInfo::new(&blob.words)) }.map_err(
            |e| ComputeError::InvalidSpirv {
                origin: blob.origin.to_string(),
                // Debug formatting carries the validation details
                reason: format!("{e:?}"),
            },
        )?;
    Ok(shader_module)
}

pub fn shader_entry_point(
    shader_module: Arc<ShaderModule>,
    entry_point_name: &str,
) -> CrateResult<EntryPoint> {
    shader_module
        .entry_point(entry_point_name)
        .ok_or_else(|| ComputeError::EntryPointNotFound(entry_point_name.to_string()))
}
