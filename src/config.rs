//! Command-line configuration

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use shared::{ImageParams, DEFAULT_WORKGROUP_SIZE, TEXEL_SIZE};

use crate::error::{ComputeError, CrateResult};

/// Which runner executes the kernel
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Vulkan compute dispatch through vulkano
    #[default]
    Vulkan,
    /// Native Rust evaluation of the same kernel
    Cpu,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "gpu-compute-image")]
#[command(version, about = "Run a compute shader once and write its output buffer as an image", long_about = None)]
pub struct Cli {
    /// Enable the Vulkan validation layer
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Enable the API dump layer
    #[arg(short = 'a', long = "api", requires = "debug")]
    pub api_dump: bool,

    /// Workgroup size used to tile the dispatch
    #[arg(short = 'w', value_name = "UINT", default_value_t = DEFAULT_WORKGROUP_SIZE)]
    pub workgroup_size: u32,

    /// Output file; nothing is written when empty
    #[arg(short = 'o', value_name = "PATH", default_value = "")]
    pub output: String,

    /// Write the raw floating point image instead of 8-bit RGBA
    #[arg(short = 'f')]
    pub output_as_float: bool,

    /// Image size as WIDTHxHEIGHT
    #[arg(short = 's', long = "size", value_name = "WxH", value_parser = parse_size,
          default_value_t = ImageParams::default())]
    pub size: ImageParams,

    /// Load the shader from this file instead of searching for shaders/comp.spv
    #[arg(long = "shader", value_name = "PATH")]
    pub shader: Option<PathBuf>,

    /// Compute entry point name in the shader
    #[arg(long = "entry", value_name = "NAME")]
    pub entry_point: Option<String>,

    /// Runner executing the kernel
    #[arg(long = "backend", value_enum, default_value_t = Backend::Vulkan)]
    pub backend: Backend,
}

/// Parse `WIDTHxHEIGHT`
fn parse_size(s: &str) -> Result<ImageParams, String> {
    let (w, h) = s
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid width `{w}`: {e}"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid height `{h}`: {e}"))?;
    Ok(ImageParams::new(width, height))
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeConfig {
    pub debug_layer: bool,
    pub api_dump_layer: bool,
    pub workgroup_size: u32,
    pub output: Option<PathBuf>,
    pub output_as_float: bool,
    pub params: ImageParams,
    pub shader: Option<PathBuf>,
    pub entry_point: Option<String>,
    pub backend: Backend,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            debug_layer: false,
            api_dump_layer: false,
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            output: None,
            output_as_float: false,
            params: ImageParams::default(),
            shader: None,
            entry_point: None,
            backend: Backend::default(),
        }
    }
}

impl ComputeConfig {
    /// Size in bytes of the storage buffer backing the image
    pub fn buffer_size(&self) -> CrateResult<u64> {
        (self.params.width as u64)
            .checked_mul(self.params.height as u64)
            .and_then(|n| n.checked_mul(TEXEL_SIZE as u64))
            .filter(|&n| usize::try_from(n).is_ok())
            .ok_or(ComputeError::BufferSizeOverflow(
                self.params.width,
                self.params.height,
            ))
    }

    pub fn validate(&self) -> CrateResult<()> {
        if self.workgroup_size == 0 {
            return Err(ComputeError::InvalidConfig(
                "workgroup size must be greater than zero".into(),
            ));
        }
        if self.params.width == 0 || self.params.height == 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "image size must be non-empty, got {}x{}",
                self.params.width, self.params.height
            )));
        }
        // The kernel indexes the storage buffer with a u32
        if !self.params.fits_u32_indexing() {
            return Err(ComputeError::BufferSizeOverflow(
                self.params.width,
                self.params.height,
            ));
        }
        if self.api_dump_layer && !self.debug_layer {
            return Err(ComputeError::InvalidConfig(
                "the API dump layer requires the debug layer".into(),
            ));
        }
        self.buffer_size()?;
        Ok(())
    }
}

impl TryFrom<Cli> for ComputeConfig {
    type Error = ComputeError;

    fn try_from(cli: Cli) -> CrateResult<Self> {
        let output = (!cli.output.is_empty()).then(|| PathBuf::from(cli.output));

        let config = Self {
            debug_layer: cli.debug,
            api_dump_layer: cli.api_dump,
            workgroup_size: cli.workgroup_size,
            output,
            output_as_float: cli.output_as_float,
            params: cli.size,
            shader: cli.shader,
            entry_point: cli.entry_point,
            backend: cli.backend,
        };
        config.validate()?;
        Ok(config)
    }
}
