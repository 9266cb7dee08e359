use std::sync::Arc;

use shared::ImageParams;
use vulkano::{
    command_buffer::{AutoCommandBufferBuilder, PrimaryAutoCommandBuffer},
    descriptor_set::DescriptorSet,
    pipeline::{ComputePipeline, Pipeline, PipelineBindPoint},
};

use crate::error::CrateResult;

/// Bind the pipeline and descriptor set, push the image size and dispatch.
/// This is basically like:
/// * providing arguments (the descriptor set and push constants)
/// * to a function/function pointer (the pipeline)
/// * then calling it (dispatch)
pub fn bind_and_dispatch(
    builder: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
    pipeline: Arc<ComputePipeline>,
    descriptor_set: Arc<DescriptorSet>,
    params: ImageParams,
    num_wg: [u32; 3],
) -> CrateResult<()> {
    builder.bind_pipeline_compute(pipeline.clone())?;
    builder.bind_descriptor_sets(
        PipelineBindPoint::Compute,
        pipeline.layout().clone(),
        0,
        descriptor_set,
    )?;
    builder.push_constants(pipeline.layout().clone(), 0, params)?;
    unsafe {
        builder.dispatch(num_wg)?;
    }
    Ok(())
}
