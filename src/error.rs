//! Error types for the library

use std::path::PathBuf;

use thiserror::Error;
use vulkano::{
    buffer::AllocateBufferError, command_buffer::CommandBufferExecError, sync::HostAccessError,
    Validated,
};

/// Error types for the compute-to-image pipeline
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error(
        "Shader `{name}` not found in {searched:?} (pass --shader, build with \
         --features spirv-build, or use --backend cpu)"
    )]
    ShaderNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Unable to read shader {path:?}: {source}")]
    ShaderUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid SPIR-V in {origin}: {reason}")]
    InvalidSpirv { origin: String, reason: String },

    #[error("Entry point '{0}' not found in SPIR-V")]
    EntryPointNotFound(String),

    #[error("No suitable Vulkan device found among {0} devices")]
    NoVulkanDevice(usize),

    #[error("Failed to find compute queue family")]
    NoComputeQueue,

    #[error("Failed to create Vulkan device: {0}")]
    DeviceCreation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Buffer size overflow: {0} x {1} texels")]
    BufferSizeOverflow(u32, u32),

    #[error("Read back {actual} texels, expected {expected}")]
    TexelCountMismatch { expected: usize, actual: usize },

    #[error("Unsupported output format for {0}")]
    UnsupportedOutputFormat(PathBuf),

    #[error("vulkano LoadingError: {0}")]
    VulkanoLoadingError(#[from] vulkano::LoadingError),

    #[error("vulkano VulkanError: {0}")]
    VulkanoVulkanError(#[from] vulkano::VulkanError),

    #[error("vulkano CommandBufferExecError: {0}")]
    VulkanoCommandBufferExecError(#[from] CommandBufferExecError),

    #[error("vulkano HostAccessError: {0}")]
    VulkanoHostAccessError(#[from] HostAccessError),

    #[error("vulkano ValidatedAllocateBufferError: {0}")]
    VulkanoValidatedAllocateBufferError(#[from] Validated<AllocateBufferError>),

    #[error("vulkano ValidationError: {0}")]
    VulkanoBoxedValidationError(#[from] Box<vulkano::ValidationError>),

    #[error("vulkano ValidatedVulkanError: {0}")]
    VulkanoValidatedVulkanError(#[from] Validated<vulkano::VulkanError>),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComputeError {
    /// Whether this error means no usable shader blob was loaded
    pub fn is_shader_load_failure(&self) -> bool {
        matches!(
            self,
            ComputeError::ShaderNotFound { .. }
                | ComputeError::InvalidSpirv { .. }
                | ComputeError::ShaderUnreadable { .. }
                | ComputeError::EntryPointNotFound(_)
        )
    }

    /// Whether this error means no logical device could be created
    pub fn is_device_failure(&self) -> bool {
        matches!(
            self,
            ComputeError::NoVulkanDevice(_)
                | ComputeError::NoComputeQueue
                | ComputeError::DeviceCreation(_)
                | ComputeError::VulkanoLoadingError(_)
        )
    }
}

/// Convenience type alias for Results with [`ComputeError`]
pub type CrateResult<T> = std::result::Result<T, ComputeError>;
