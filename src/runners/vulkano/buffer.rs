use crate::error::CrateResult;
use std::sync::Arc;

use bytemuck::Zeroable;
use vulkano::{
    buffer::{Buffer, BufferContents, BufferCreateInfo, BufferUsage, Subbuffer},
    descriptor_set::WriteDescriptorSet,
    memory::allocator::{AllocationCreateInfo, MemoryTypeFilter, StandardMemoryAllocator},
};

/// Host-visible storage buffer of `len` zeroed elements, bound at `binding`.
///
/// The memory stays mappable so the host can read the shader's output
/// straight back.
pub fn build_zeroed_storage_buffer_and_get_write_descriptor_set<T>(
    memory_allocator: Arc<StandardMemoryAllocator>,
    len: usize,
    binding: u32,
) -> CrateResult<(Subbuffer<[T]>, WriteDescriptorSet)>
where
    T: BufferContents + Zeroable,
{
    let buffer: Subbuffer<[T]> = Buffer::from_iter(
        memory_allocator,
        BufferCreateInfo {
            usage: BufferUsage::STORAGE_BUFFER,
            ..Default::default()
        },
        AllocationCreateInfo {
            memory_type_filter: MemoryTypeFilter::PREFER_HOST
                | MemoryTypeFilter::HOST_RANDOM_ACCESS,
            ..Default::default()
        },
        (0..len).map(|_| T::zeroed()),
    )?;

    let write_descriptor_set = WriteDescriptorSet::buffer(binding, buffer.clone());

    Ok((buffer, write_descriptor_set))
}

/// Copy the buffer contents back to the host
pub fn read_back<T: BufferContents + Copy>(buffer: &Subbuffer<[T]>) -> CrateResult<Vec<T>> {
    let content = buffer.read()?;
    Ok(content.to_vec())
}
