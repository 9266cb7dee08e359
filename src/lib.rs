//! GPU compute to image
//!
//! Runs a single compute dispatch that fills a float RGBA storage buffer,
//! then reads it back and writes it out as an image:
//! - Vulkan (via vulkano, SPIR-V from rust-gpu or any compiler)
//! - CPU (native Rust, same kernel code)

pub mod config;
pub mod error;
pub mod output;
pub mod runners;
pub mod shader;
pub mod texels;

pub use config::{Backend, Cli, ComputeConfig};
pub use error::{ComputeError, CrateResult};
pub use runners::{BackendInfo, ComputeRunner, CpuRunner, VulkanoRunner};
pub use shader::{load_compute_shader, ShaderBlob};
pub use texels::FloatImage;
