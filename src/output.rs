//! Writing the read-back image to disk

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use image::ImageFormat;
use log::info;

use crate::{
    error::{ComputeError, CrateResult},
    texels::FloatImage,
};

/// Encoding chosen for an output path
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// 8-bit RGBA through an `image` encoder picked by extension
    Rgba8(ImageFormat),
    /// 32-bit float RGBA OpenEXR
    OpenExrF32,
    /// Headerless little-endian `f32` RGBA, row-major
    RawF32,
}

impl OutputFormat {
    /// Pick the encoding for `path`.
    ///
    /// Float output goes to OpenEXR for `.exr` paths and to a raw channel
    /// dump otherwise. 8-bit output needs an extension `image` can encode.
    pub fn for_path(path: &Path, as_float: bool) -> CrateResult<Self> {
        if as_float {
            return Ok(match ImageFormat::from_path(path) {
                Ok(ImageFormat::OpenExr) => OutputFormat::OpenExrF32,
                _ => OutputFormat::RawF32,
            });
        }
        match ImageFormat::from_path(path) {
            Ok(format) if format.writing_enabled() && format != ImageFormat::OpenExr => {
                Ok(OutputFormat::Rgba8(format))
            }
            _ => Err(ComputeError::UnsupportedOutputFormat(path.to_path_buf())),
        }
    }
}

/// Write `image` to `path`, converting to 8-bit unless `as_float` is set
pub fn write_image(image: &FloatImage, path: &Path, as_float: bool) -> CrateResult<OutputFormat> {
    let format = OutputFormat::for_path(path, as_float)?;
    match format {
        OutputFormat::Rgba8(encoding) => {
            image.to_rgba8()?.save_with_format(path, encoding)?;
        }
        OutputFormat::OpenExrF32 => {
            image
                .to_rgba32f()?
                .save_with_format(path, ImageFormat::OpenExr)?;
        }
        OutputFormat::RawF32 => write_raw_f32(image, path)?,
    }
    info!(
        "Wrote {}x{} image to {} ({format:?})",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(format)
}

fn write_raw_f32(image: &FloatImage, path: &Path) -> CrateResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for channel in image.as_channels() {
        writer.write_all(&channel.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}
