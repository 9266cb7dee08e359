//! Locating and loading the precompiled SPIR-V compute shader

use std::{
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::error::{ComputeError, CrateResult};

/// Relative path of the shader blob, resolved against the search paths
pub const SHADER_FILE: &str = "shaders/comp.spv";

/// Environment variable holding extra shader search directories
pub const SEARCH_PATH_VAR: &str = "GPU_COMPUTE_FILE_PATH";

/// Entry point conventionally exported by GLSL-compiled blobs
pub const DEFAULT_ENTRY_POINT: &str = "main";

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// SPIR-V compiled from the kernel crate at build time
#[cfg(feature = "spirv-build")]
pub const EMBEDDED_SPIRV: Option<&[u8]> = Some(include_bytes!(env!("KERNEL_SPV_PATH")));
#[cfg(not(feature = "spirv-build"))]
pub const EMBEDDED_SPIRV: Option<&[u8]> = None;

#[cfg(feature = "spirv-build")]
pub const EMBEDDED_ENTRY_POINT: &str = env!("KERNEL_SPV_ENTRY");
#[cfg(not(feature = "spirv-build"))]
pub const EMBEDDED_ENTRY_POINT: &str = "mandelbrot";

/// Where a shader blob came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderOrigin {
    File(PathBuf),
    Embedded,
}

impl fmt::Display for ShaderOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderOrigin::File(path) => write!(f, "{}", path.display()),
            ShaderOrigin::Embedded => write!(f, "<embedded kernel>"),
        }
    }
}

/// A validated SPIR-V module and the compute entry point to run
#[derive(Debug, Clone)]
pub struct ShaderBlob {
    pub origin: ShaderOrigin,
    pub words: Vec<u32>,
    pub entry_point: String,
}

impl ShaderBlob {
    /// Validate raw bytes as a SPIR-V module
    pub fn from_bytes(
        origin: ShaderOrigin,
        bytes: &[u8],
        entry_point: impl Into<String>,
    ) -> CrateResult<Self> {
        let invalid = |reason: &str| ComputeError::InvalidSpirv {
            origin: origin.to_string(),
            reason: reason.to_string(),
        };

        if bytes.is_empty() {
            return Err(invalid("empty file"));
        }
        if bytes.len() % 4 != 0 {
            return Err(invalid("length is not a multiple of 4"));
        }

        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|w| u32::from_ne_bytes([w[0], w[1], w[2], w[3]]))
            .collect();

        // A module written with the other endianness starts with the
        // byte-swapped magic number.
        let words = match words[0] {
            SPIRV_MAGIC => words,
            magic if magic.swap_bytes() == SPIRV_MAGIC => {
                words.into_iter().map(u32::swap_bytes).collect()
            }
            _ => return Err(invalid("missing SPIR-V magic number")),
        };

        Ok(Self {
            origin,
            words,
            entry_point: entry_point.into(),
        })
    }

    pub fn read(path: &Path, entry_point: impl Into<String>) -> CrateResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| ComputeError::ShaderUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(ShaderOrigin::File(path.to_path_buf()), &bytes, entry_point)
    }
}

/// Directories listed in `var`, in order
pub fn env_search_paths(var: impl AsRef<OsStr>) -> Vec<PathBuf> {
    std::env::var_os(var)
        .map(|value| {
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// First `search_path/filename` that exists, falling back to `filename` itself
pub fn find_file(filename: &Path, search_paths: &[PathBuf]) -> Option<PathBuf> {
    if filename.is_absolute() {
        return filename.is_file().then(|| filename.to_path_buf());
    }
    search_paths
        .iter()
        .map(|dir| dir.join(filename))
        .chain(std::iter::once(filename.to_path_buf()))
        .find(|candidate| candidate.is_file())
}

/// Resolve the compute shader for a run.
///
/// An explicit path is loaded as-is. Otherwise [`SHADER_FILE`] is searched
/// for, and the embedded kernel is used when the search comes up empty.
pub fn load_compute_shader(
    explicit: Option<&Path>,
    entry_point: Option<&str>,
    search_paths: &[PathBuf],
) -> CrateResult<ShaderBlob> {
    let file_entry = entry_point.unwrap_or(DEFAULT_ENTRY_POINT);

    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ComputeError::ShaderNotFound {
                name: path.display().to_string(),
                searched: vec![path.to_path_buf()],
            });
        }
        return ShaderBlob::read(path, file_entry);
    }

    if let Some(path) = find_file(Path::new(SHADER_FILE), search_paths) {
        info!("Loading compute shader from {}", path.display());
        return ShaderBlob::read(&path, file_entry);
    }

    match EMBEDDED_SPIRV {
        Some(bytes) => {
            debug!("{SHADER_FILE} not found, using the embedded kernel");
            ShaderBlob::from_bytes(
                ShaderOrigin::Embedded,
                bytes,
                entry_point.unwrap_or(EMBEDDED_ENTRY_POINT),
            )
        }
        None => {
            let mut searched = search_paths.to_vec();
            searched.push(PathBuf::from("."));
            Err(ComputeError::ShaderNotFound {
                name: SHADER_FILE.to_string(),
                searched,
            })
        }
    }
}
