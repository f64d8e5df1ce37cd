//! wsi-openslide - Inspect and extract pixels from Whole Slide Images.
//!
//! This binary parses the command line, loads OpenSlide and runs one
//! subcommand.

use clap::Parser;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsi_openslide::{
    config::{
        output_format, AssociatedConfig, Cli, Command, InfoConfig, PropertiesConfig,
        RegionConfig, SlideArgs, ThumbnailConfig,
    },
    detect_vendor_with, Backend, NativeBackend, OpenSlideLibrary, Slide, SlideError, SlideInfo,
};

/// Errors surfaced by subcommands.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Slide(#[from] SlideError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{0}")]
    Output(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = cli.command.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let backend = match load_backend(cli.library.as_deref()) {
        Ok(backend) => backend,
        Err(e) => {
            error!("{}", e);
            error!("Install OpenSlide or point --library / OPENSLIDE_LIBRARY at libopenslide");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Info(config) => run_info(&backend, config),
        Command::Vendor(args) => run_vendor(&backend, args),
        Command::Properties(config) => run_properties(&backend, config),
        Command::Region(config) => run_region(&backend, config),
        Command::Thumbnail(config) => run_thumbnail(&backend, config),
        Command::Associated(config) => run_associated(&backend, config),
        Command::Version => run_version(&backend),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so command output on stdout stays pipeable.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "wsi_openslide=debug"
    } else {
        "wsi_openslide=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_backend(library: Option<&Path>) -> Result<NativeBackend, SlideError> {
    let backend = match library {
        Some(path) => NativeBackend::new(Arc::new(OpenSlideLibrary::load_from(path)?)),
        None => NativeBackend::shared()?,
    };
    debug!("Using OpenSlide from {}", backend.library().source());
    Ok(backend)
}

// =============================================================================
// Commands
// =============================================================================

fn run_info(backend: &NativeBackend, config: InfoConfig) -> Result<(), CliError> {
    let slide = Slide::open_with(backend, &config.slide)?;
    let summary = SlideInfo::collect(&slide);

    if config.json {
        print_json(&summary);
        return Ok(());
    }

    println!("Slide: {}", summary.path.display());
    println!("Vendor: {}", summary.vendor.as_deref().unwrap_or("unknown"));
    if let Some((width, height)) = summary.dimensions {
        println!("Dimensions: {} x {}", width, height);
    }

    println!();
    println!("Levels ({}):", summary.levels.len());
    for (level, info) in summary.levels.iter().enumerate() {
        println!(
            "  {:>2}: {:>8} x {:<8} downsample {:.3}",
            level, info.width, info.height, info.downsample
        );
    }

    if !summary.associated_images.is_empty() {
        println!();
        println!("Associated images:");
        for (name, (width, height)) in &summary.associated_images {
            println!("  {}: {} x {}", name, width, height);
        }
    }

    println!();
    match summary.mpp {
        Some(mpp) => println!("MPP: {} x {} µm/px", mpp.x, mpp.y),
        None => println!("MPP: unknown"),
    }
    if let Some(power) = summary.objective_power {
        println!("Objective power: {}x", power);
    }
    if let Some(bounds) = summary.bounds {
        println!(
            "Bounds: {} x {} at ({}, {})",
            bounds.width, bounds.height, bounds.x, bounds.y
        );
    }
    if let Some(ref color) = summary.background_color {
        println!("Background color: #{}", color);
    }
    println!("Properties: {}", summary.property_count);

    Ok(())
}

fn run_vendor(backend: &NativeBackend, args: SlideArgs) -> Result<(), CliError> {
    let vendor = detect_vendor_with(backend, &args.slide)?;
    println!("{}", vendor);
    Ok(())
}

fn run_properties(backend: &NativeBackend, config: PropertiesConfig) -> Result<(), CliError> {
    let slide = Slide::open_with(backend, &config.slide)?;
    let properties = slide.properties();

    if config.json {
        print_json(&properties);
    } else {
        for (name, value) in properties.iter() {
            println!("{} = {}", name, value);
        }
    }
    Ok(())
}

fn run_region(backend: &NativeBackend, config: RegionConfig) -> Result<(), CliError> {
    let slide = Slide::open_with(backend, &config.slide)?;
    let region = slide.read_region(
        config.x,
        config.y,
        config.level,
        config.width,
        config.height,
    )?;

    save_image(&region, &config.output)?;
    info!(
        "Wrote {}x{} region to {}",
        config.width,
        config.height,
        config.output.display()
    );
    Ok(())
}

fn run_thumbnail(backend: &NativeBackend, config: ThumbnailConfig) -> Result<(), CliError> {
    let slide = Slide::open_with(backend, &config.slide)?;
    let thumbnail = slide.thumbnail(config.size)?;

    save_image(&thumbnail, &config.output)?;
    info!(
        "Wrote {}x{} thumbnail to {}",
        thumbnail.width(),
        thumbnail.height(),
        config.output.display()
    );
    Ok(())
}

fn run_associated(backend: &NativeBackend, config: AssociatedConfig) -> Result<(), CliError> {
    let slide = Slide::open_with(backend, &config.slide)?;

    match (config.name, config.output) {
        (Some(name), Some(output)) => {
            let image = slide.read_associated_image(&name)?;
            save_image(&image, &output)?;
            info!("Wrote associated image {} to {}", name, output.display());
        }
        _ => {
            let dimensions = slide.associated_image_dimensions();
            if dimensions.is_empty() {
                println!("(no associated images)");
            }
            for (name, (width, height)) in dimensions {
                println!("{}\t{} x {}", name, width, height);
            }
        }
    }
    Ok(())
}

fn run_version(backend: &NativeBackend) -> Result<(), CliError> {
    match backend.version() {
        Some(version) => println!("OpenSlide {}", version),
        None => println!("OpenSlide (unknown version)"),
    }
    Ok(())
}

// =============================================================================
// Output helpers
// =============================================================================

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}

/// Save an RGBA image; JPEG output drops the alpha channel.
fn save_image(image: &RgbaImage, output: &Path) -> Result<(), CliError> {
    let format = output_format(output).map_err(CliError::Output)?;

    let result = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save_with_format(output, format),
        _ => image.save_with_format(output, format),
    };

    result.map_err(|source| CliError::Write {
        path: output.display().to_string(),
        source,
    })
}
