//! Run one compute dispatch and write the resulting image

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use gpu_compute_image::{
    output::write_image,
    runners::vulkano::device::LayerRequest,
    shader::{env_search_paths, SEARCH_PATH_VAR},
    *,
};
use log::{error, info};

fn runner_for(config: &ComputeConfig) -> Result<Box<dyn ComputeRunner>> {
    match config.backend {
        Backend::Vulkan => {
            let blob = load_compute_shader(
                config.shader.as_deref(),
                config.entry_point.as_deref(),
                &env_search_paths(SEARCH_PATH_VAR),
            )?;
            let layers = LayerRequest {
                debug: config.debug_layer,
                api_dump: config.api_dump_layer,
            };
            Ok(Box::new(VulkanoRunner::new(layers, &blob)?))
        }
        Backend::Cpu => Ok(Box::new(CpuRunner)),
    }
}

fn run(config: &ComputeConfig) -> Result<()> {
    let runner = runner_for(config)?;
    let info = runner.backend_info();
    info!(
        "Running on {} ({}){}",
        info.runner,
        info.api.unwrap_or("unknown API"),
        info.device_name
            .map(|name| format!(" - {name}"))
            .unwrap_or_default()
    );

    let image = runner.render(config.params, config.workgroup_size)?;

    if let Some(path) = &config.output {
        write_image(&image, path, config.output_as_float)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match ComputeConfig::try_from(cli) {
        Ok(config) => config,
        Err(e) => Cli::command()
            .error(ErrorKind::ValueValidation, e.to_string())
            .exit(),
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ComputeError>() {
                Some(err) if err.is_shader_load_failure() => {
                    error!("{err}");
                    println!("Error : No shader loaded.");
                }
                Some(err) if err.is_device_failure() => {
                    error!("{err}");
                    println!("Unable to create required Vulkan Device.");
                }
                _ => error!("{e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
