use crate::error::CrateResult;
use std::sync::Arc;

use std::collections::BTreeMap;
use vulkano::{
    descriptor_set::{
        allocator::StandardDescriptorSetAllocator,
        layout::{
            DescriptorSetLayout, DescriptorSetLayoutBinding, DescriptorSetLayoutCreateInfo,
            DescriptorType,
        },
        DescriptorSet, WriteDescriptorSet,
    },
    device::Device,
    shader::ShaderStages,
};

/// Binding of the output image storage buffer
pub const IMAGE_BINDING: u32 = 0;

/// Layout with a single compute-stage storage buffer at [`IMAGE_BINDING`]
pub fn build_image_descriptor_set_layout(device: Arc<Device>) -> CrateResult<Arc<DescriptorSetLayout>> {
    let mut binding = DescriptorSetLayoutBinding::descriptor_type(DescriptorType::StorageBuffer);
    binding.stages = ShaderStages::COMPUTE;
    binding.descriptor_count = 1;

    let mut bindings = BTreeMap::new();
    bindings.insert(IMAGE_BINDING, binding);

    let layout = DescriptorSetLayout::new(
        device,
        DescriptorSetLayoutCreateInfo {
            bindings,
            ..Default::default()
        },
    )?;

    Ok(layout)
}

pub fn build_concrete_descriptor_set(
    descriptor_set_allocator: Arc<StandardDescriptorSetAllocator>,
    layout: Arc<DescriptorSetLayout>,
    writes: Vec<WriteDescriptorSet>,
) -> CrateResult<Arc<DescriptorSet>> {
    let set = DescriptorSet::new(descriptor_set_allocator, layout, writes, [])?;
    Ok(set)
}
