use crate::error::{ComputeError, CrateResult};
use std::sync::Arc;

use log::{debug, error, info, trace, warn};
use vulkano::{
    device::{
        physical::{PhysicalDevice, PhysicalDeviceType},
        Device, DeviceCreateInfo, DeviceExtensions, DeviceFeatures, Queue, QueueCreateInfo,
        QueueFlags,
    },
    instance::{
        debug::{
            DebugUtilsMessageSeverity, DebugUtilsMessageType, DebugUtilsMessenger,
            DebugUtilsMessengerCallback, DebugUtilsMessengerCreateInfo,
        },
        Instance, InstanceCreateFlags, InstanceCreateInfo, InstanceExtensions,
    },
    Version, VulkanLibrary,
};

/// Khronos validation layer, enabled by `--debug`
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";
/// LunarG API dump layer, enabled by `--api`
pub const API_DUMP_LAYER: &str = "VK_LAYER_LUNARG_api_dump";

/// Instance layers the user asked for
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerRequest {
    pub debug: bool,
    pub api_dump: bool,
}

impl LayerRequest {
    pub fn layer_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.debug {
            names.push(VALIDATION_LAYER);
            if self.api_dump {
                names.push(API_DUMP_LAYER);
            }
        }
        names
    }
}

/// Keep the requested layers that are actually installed, warning about the
/// rest.
pub fn validate_layer_names<I, S>(requested: &[&str], available: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let available: Vec<S> = available.into_iter().collect();
    requested
        .iter()
        .filter(|name| {
            let found = available.iter().any(|a| a.as_ref() == **name);
            if !found {
                warn!("Requested layer {name} is not available, skipping it");
            }
            found
        })
        .map(|name| name.to_string())
        .collect()
}

/// Load the Vulkan library and create an instance with the requested layers
pub fn create_instance(layers: LayerRequest) -> CrateResult<Arc<Instance>> {
    let library = VulkanLibrary::new()?;

    let requested = layers.layer_names();
    let enabled_layers = if requested.is_empty() {
        Vec::new()
    } else {
        let available: Vec<String> = library
            .layer_properties()?
            .map(|layer| layer.name().to_owned())
            .collect();
        validate_layer_names(&requested, available)
    };

    let supported = library.supported_extensions();
    let enabled_extensions = InstanceExtensions {
        ext_debug_utils: layers.debug && supported.ext_debug_utils,
        khr_portability_enumeration: supported.khr_portability_enumeration,
        ..InstanceExtensions::empty()
    };
    // Needed to see MoltenVK devices on macOS
    let flags = if enabled_extensions.khr_portability_enumeration {
        InstanceCreateFlags::ENUMERATE_PORTABILITY
    } else {
        InstanceCreateFlags::empty()
    };

    debug!("Enabling instance layers {enabled_layers:?}");
    let instance = Instance::new(
        library,
        InstanceCreateInfo {
            application_name: Some(env!("CARGO_PKG_NAME").to_owned()),
            flags,
            enabled_layers,
            enabled_extensions,
            ..Default::default()
        },
    )?;
    Ok(instance)
}

/// Route `VK_EXT_debug_utils` messages to the `log` facade
pub fn debug_messenger(instance: Arc<Instance>) -> CrateResult<Option<DebugUtilsMessenger>> {
    if !instance.enabled_extensions().ext_debug_utils {
        return Ok(None);
    }

    let messenger = unsafe {
        let callback = DebugUtilsMessengerCallback::new(|severity, ty, data| {
            let id = data.message_id_name.unwrap_or("unknown");
            let kind = if ty.intersects(DebugUtilsMessageType::VALIDATION) {
                "validation"
            } else if ty.intersects(DebugUtilsMessageType::PERFORMANCE) {
                "performance"
            } else {
                "general"
            };
            if severity.intersects(DebugUtilsMessageSeverity::ERROR) {
                error!("[{kind}] {id}: {}", data.message);
            } else if severity.intersects(DebugUtilsMessageSeverity::WARNING) {
                warn!("[{kind}] {id}: {}", data.message);
            } else if severity.intersects(DebugUtilsMessageSeverity::INFO) {
                debug!("[{kind}] {id}: {}", data.message);
            } else {
                trace!("[{kind}] {id}: {}", data.message);
            }
        });

        DebugUtilsMessenger::new(
            instance,
            DebugUtilsMessengerCreateInfo {
                message_severity: DebugUtilsMessageSeverity::ERROR
                    | DebugUtilsMessageSeverity::WARNING
                    | DebugUtilsMessageSeverity::INFO
                    | DebugUtilsMessageSeverity::VERBOSE,
                message_type: DebugUtilsMessageType::GENERAL
                    | DebugUtilsMessageType::VALIDATION
                    | DebugUtilsMessageType::PERFORMANCE,
                ..DebugUtilsMessengerCreateInfo::user_callback(callback)
            },
        )?
    };
    Ok(Some(messenger))
}

/// Lower is better
fn device_type_rank(device_type: PhysicalDeviceType) -> u32 {
    match device_type {
        PhysicalDeviceType::DiscreteGpu => 0,
        PhysicalDeviceType::IntegratedGpu => 1,
        PhysicalDeviceType::VirtualGpu => 2,
        PhysicalDeviceType::Cpu => 3,
        _ => 4,
    }
}

/// Pick a physical device with a compute queue family, preferring discrete GPUs
pub fn select_compute_device(instance: &Arc<Instance>) -> CrateResult<(Arc<PhysicalDevice>, u32)> {
    let devices: Vec<Arc<PhysicalDevice>> = instance.enumerate_physical_devices()?.collect();
    let device_count = devices.len();

    devices
        .into_iter()
        .filter_map(|physical| {
            physical
                .queue_family_properties()
                .iter()
                .position(|q| q.queue_flags.intersects(QueueFlags::COMPUTE))
                .map(|index| (physical, index as u32))
        })
        .min_by_key(|(physical, _)| device_type_rank(physical.properties().device_type))
        .ok_or(ComputeError::NoVulkanDevice(device_count))
}

/// Create the logical device and its compute queue
pub fn compute_capable_device_and_queue(
    physical: Arc<PhysicalDevice>,
    queue_family_index: u32,
) -> CrateResult<(Arc<Device>, Arc<Queue>)> {
    info!(
        "Using {} ({:?}), queue family {queue_family_index}",
        physical.properties().device_name,
        physical.properties().device_type
    );

    let enabled_extensions = DeviceExtensions {
        khr_storage_buffer_storage_class: physical
            .supported_extensions()
            .khr_storage_buffer_storage_class,
        ..DeviceExtensions::empty()
    };

    // SPIR-V from rust-gpu declares the VulkanMemoryModel capability, which
    // needs this feature. GLSL-compiled blobs do not.
    let mut enabled_features = DeviceFeatures::empty();
    if physical.api_version() >= Version::V1_2 && physical.supported_features().vulkan_memory_model
    {
        enabled_features.vulkan_memory_model = true;
    } else {
        debug!("vulkan_memory_model is not available on this device");
    }

    let (device, mut queues) = Device::new(
        physical,
        DeviceCreateInfo {
            queue_create_infos: vec![QueueCreateInfo {
                queue_family_index,
                ..Default::default()
            }],
            enabled_extensions,
            enabled_features,
            ..Default::default()
        },
    )
    .map_err(|e| ComputeError::DeviceCreation(e.to_string()))?;

    let queue = queues.next().ok_or(ComputeError::NoComputeQueue)?;

    Ok((device, queue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_layers_without_debug() {
        assert!(LayerRequest::default().layer_names().is_empty());
        let api_only = LayerRequest {
            debug: false,
            api_dump: true,
        };
        assert!(api_only.layer_names().is_empty());
    }

    #[test]
    fn debug_enables_validation_then_api_dump() {
        let debug = LayerRequest {
            debug: true,
            api_dump: false,
        };
        assert_eq!(debug.layer_names(), vec![VALIDATION_LAYER]);

        let both = LayerRequest {
            debug: true,
            api_dump: true,
        };
        assert_eq!(both.layer_names(), vec![VALIDATION_LAYER, API_DUMP_LAYER]);
    }

    #[test]
    fn unavailable_layers_are_dropped() {
        let requested = [VALIDATION_LAYER, API_DUMP_LAYER];
        let available = ["VK_LAYER_MESA_device_select", VALIDATION_LAYER];
        assert_eq!(
            validate_layer_names(&requested, available),
            vec![VALIDATION_LAYER.to_string()]
        );
        assert!(validate_layer_names(&requested, Vec::<String>::new()).is_empty());
    }

    #[test]
    fn discrete_gpus_rank_first() {
        assert!(
            device_type_rank(PhysicalDeviceType::DiscreteGpu)
                < device_type_rank(PhysicalDeviceType::IntegratedGpu)
        );
        assert!(
            device_type_rank(PhysicalDeviceType::IntegratedGpu)
                < device_type_rank(PhysicalDeviceType::Cpu)
        );
    }
}
