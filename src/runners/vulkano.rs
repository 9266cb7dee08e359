//! Vulkano runner implementation - Safe Vulkan abstraction via vulkano
//!
//! Owns every Vulkan object for one compute-to-image run. Fields are declared
//! in teardown order so dependents drop before the device and instance.

pub mod buffer;
pub mod descriptor_sets;
pub mod device;
pub mod dispatch;
pub mod pipeline;
pub mod shader;

use crate::{
    error::{ComputeError, CrateResult},
    runners::{BackendInfo, ComputeRunner},
    shader::ShaderBlob,
    texels::FloatImage,
};
use glam::Vec4;
use log::{debug, info};
use shared::{num_workgroups_2d, ImageParams};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use vulkano::{
    command_buffer::{
        allocator::StandardCommandBufferAllocator, AutoCommandBufferBuilder, CommandBufferUsage,
    },
    descriptor_set::allocator::StandardDescriptorSetAllocator,
    device::{Device, Queue},
    instance::{debug::DebugUtilsMessenger, Instance},
    memory::allocator::StandardMemoryAllocator,
    pipeline::{ComputePipeline, Pipeline},
    sync::{self, GpuFuture},
};

use self::{
    buffer::{build_zeroed_storage_buffer_and_get_write_descriptor_set, read_back},
    descriptor_sets::{
        build_concrete_descriptor_set, build_image_descriptor_set_layout, IMAGE_BINDING,
    },
    device::{
        compute_capable_device_and_queue, create_instance, debug_messenger,
        select_compute_device, LayerRequest,
    },
    dispatch::bind_and_dispatch,
    pipeline::build_pipeline,
    shader::{shader_entry_point, shader_module},
};

/// How long to wait on the submission fence before giving up
pub const FENCE_TIMEOUT: Duration = Duration::from_nanos(100_000_000_000);

/// Vulkan-based runner for the compute-to-image pass
pub struct VulkanoRunner {
    pipeline: Arc<ComputePipeline>,
    descriptor_set_allocator: Arc<StandardDescriptorSetAllocator>,
    command_buffer_allocator: Arc<StandardCommandBufferAllocator>,
    memory_allocator: Arc<StandardMemoryAllocator>,
    queue: Arc<Queue>,
    device: Arc<Device>,
    _debug_messenger: Option<DebugUtilsMessenger>,
    instance: Arc<Instance>,
    device_name: String,
}

impl VulkanoRunner {
    /// Create the instance, device and compute pipeline for `blob`
    pub fn new(layers: LayerRequest, blob: &ShaderBlob) -> CrateResult<Self> {
        let instance = create_instance(layers)?;
        let debug_messenger = if layers.debug {
            debug_messenger(instance.clone())?
        } else {
            None
        };

        let (physical, queue_family_index) = select_compute_device(&instance)?;
        let device_name = physical.properties().device_name.clone();
        let (device, queue) = compute_capable_device_and_queue(physical, queue_family_index)?;

        let memory_allocator = Arc::new(StandardMemoryAllocator::new_default(device.clone()));

        let descriptor_set_allocator = Arc::new(StandardDescriptorSetAllocator::new(
            device.clone(),
            Default::default(),
        ));

        let command_buffer_allocator = Arc::new(StandardCommandBufferAllocator::new(
            device.clone(),
            Default::default(),
        ));

        let module = shader_module(device.clone(), blob)?;
        let entry_point = shader_entry_point(module, &blob.entry_point)?;
        debug!("Entry point `{}` from {}", blob.entry_point, blob.origin);

        let layout = build_image_descriptor_set_layout(device.clone())?;
        let pipeline = build_pipeline(device.clone(), layout, entry_point)?;

        Ok(Self {
            pipeline,
            descriptor_set_allocator,
            command_buffer_allocator,
            memory_allocator,
            queue,
            device,
            _debug_messenger: debug_messenger,
            instance,
            device_name,
        })
    }

    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl ComputeRunner for VulkanoRunner {
    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            runner: "vulkano",
            api: Some("Vulkan"),
            device_name: Some(self.device_name.clone()),
        }
    }

    fn render(&self, params: ImageParams, workgroup_size: u32) -> CrateResult<FloatImage> {
        if workgroup_size == 0 {
            return Err(ComputeError::InvalidConfig(
                "workgroup size must be greater than zero".into(),
            ));
        }
        if params.num_texels() == 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "image size must be non-empty, got {}x{}",
                params.width, params.height
            )));
        }
        let len = params.num_texels();

        let (image_buffer, write) = build_zeroed_storage_buffer_and_get_write_descriptor_set::<Vec4>(
            self.memory_allocator.clone(),
            len,
            IMAGE_BINDING,
        )?;

        let layout = self
            .pipeline
            .layout()
            .set_layouts()
            .first()
            .cloned()
            .ok_or_else(|| {
                ComputeError::InvalidConfig("pipeline missing descriptor set layout 0".into())
            })?;
        let set = build_concrete_descriptor_set(
            self.descriptor_set_allocator.clone(),
            layout,
            vec![write],
        )?;

        let num_wg = num_workgroups_2d(params.width, params.height, workgroup_size);
        debug!("Dispatching {num_wg:?} workgroups for {}x{}", params.width, params.height);

        let mut builder = AutoCommandBufferBuilder::primary(
            self.command_buffer_allocator.clone(),
            self.queue.queue_family_index(),
            CommandBufferUsage::OneTimeSubmit,
        )?;
        bind_and_dispatch(&mut builder, self.pipeline.clone(), set, params, num_wg)?;
        let command_buffer = builder.build()?;

        // Execute + wait
        let start = Instant::now();
        let future = sync::now(self.device.clone())
            .then_execute(self.queue.clone(), command_buffer)?
            .then_signal_fence_and_flush()?;
        future.wait(Some(FENCE_TIMEOUT))?;
        let elapsed = start.elapsed();
        println!("Time to run commands {}ms", elapsed.as_secs_f64() * 1000.0);
        info!("Compute pass finished on {}", self.device_name);

        let texels = read_back(&image_buffer)?;
        FloatImage::from_texels(params, texels)
    }
}
