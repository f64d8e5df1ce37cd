//! Command-line configuration for the `wsi-openslide` tool.
//!
//! Arguments are parsed with clap. The library location can also be set
//! through the environment:
//!
//! - `OPENSLIDE_LIBRARY` - Path to `libopenslide` (default: platform search)
//! - `RUST_LOG` - Log filter (default: `wsi_openslide=info`)
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use wsi_openslide::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Info(config) => println!("{}", config.slide.display()),
//!     _ => {}
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use image::ImageFormat;

use crate::ffi::LIBRARY_ENV;

// =============================================================================
// Default Values
// =============================================================================

/// Default thumbnail size (longest side, in pixels).
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 512;

/// Largest region the CLI will read in one call, per side.
pub const MAX_REGION_SIDE: u32 = 32_768;

// =============================================================================
// CLI Arguments
// =============================================================================

/// wsi-openslide - Inspect and extract pixels from Whole Slide Images.
///
/// Reads any format supported by OpenSlide (Aperio, Hamamatsu, Leica, MIRAX,
/// Philips, Sakura, Trestle, Ventana, generic tiled TIFF).
#[derive(Parser, Debug, Clone)]
#[command(name = "wsi-openslide")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the OpenSlide shared library.
    ///
    /// If not specified, the platform's default library names are searched.
    #[arg(long, global = true, env = LIBRARY_ENV)]
    pub library: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Summarize a slide: vendor, levels, associated images, metadata.
    Info(InfoConfig),

    /// Detect the vendor of a slide without opening it.
    Vendor(SlideArgs),

    /// List all properties of a slide.
    Properties(PropertiesConfig),

    /// Read a region and save it as an image.
    Region(RegionConfig),

    /// Render a thumbnail and save it as an image.
    Thumbnail(ThumbnailConfig),

    /// List associated images, or extract one.
    Associated(AssociatedConfig),

    /// Print the OpenSlide library version.
    Version,
}

impl Command {
    /// Validate the subcommand's arguments.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Command::Info(config) => config.validate(),
            Command::Vendor(args) => args.validate(),
            Command::Properties(config) => config.validate(),
            Command::Region(config) => config.validate(),
            Command::Thumbnail(config) => config.validate(),
            Command::Associated(config) => config.validate(),
            Command::Version => Ok(()),
        }
    }
}

// =============================================================================
// Subcommand configurations
// =============================================================================

/// A single slide path.
#[derive(Args, Debug, Clone)]
pub struct SlideArgs {
    /// Path to the slide file.
    pub slide: PathBuf,
}

impl SlideArgs {
    pub fn validate(&self) -> Result<(), String> {
        validate_slide_path(&self.slide)
    }
}

/// Arguments for `info`.
#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// Path to the slide file.
    pub slide: PathBuf,

    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_slide_path(&self.slide)
    }
}

/// Arguments for `properties`.
#[derive(Args, Debug, Clone)]
pub struct PropertiesConfig {
    /// Path to the slide file.
    pub slide: PathBuf,

    /// Print JSON instead of `name = value` lines.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl PropertiesConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_slide_path(&self.slide)
    }
}

/// Arguments for `region`.
#[derive(Args, Debug, Clone)]
pub struct RegionConfig {
    /// Path to the slide file.
    pub slide: PathBuf,

    /// Left edge in level 0 coordinates.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub x: i64,

    /// Top edge in level 0 coordinates.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub y: i64,

    /// Level to read from.
    #[arg(long, default_value_t = 0)]
    pub level: usize,

    /// Region width in pixels of the chosen level.
    #[arg(long)]
    pub width: u32,

    /// Region height in pixels of the chosen level.
    #[arg(long)]
    pub height: u32,

    /// Output image (.png or .jpg).
    #[arg(short, long)]
    pub output: PathBuf,
}

impl RegionConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_slide_path(&self.slide)?;

        if self.width == 0 || self.height == 0 {
            return Err("width and height must be greater than 0".to_string());
        }
        if self.width > MAX_REGION_SIDE || self.height > MAX_REGION_SIDE {
            return Err(format!(
                "width and height must be at most {}",
                MAX_REGION_SIDE
            ));
        }

        validate_output_path(&self.output)
    }
}

/// Arguments for `thumbnail`.
#[derive(Args, Debug, Clone)]
pub struct ThumbnailConfig {
    /// Path to the slide file.
    pub slide: PathBuf,

    /// Longest side of the thumbnail in pixels.
    #[arg(long, default_value_t = DEFAULT_THUMBNAIL_SIZE)]
    pub size: u32,

    /// Output image (.png or .jpg).
    #[arg(short, long)]
    pub output: PathBuf,
}

impl ThumbnailConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_slide_path(&self.slide)?;

        if self.size == 0 || self.size > MAX_REGION_SIDE {
            return Err(format!("size must be between 1 and {}", MAX_REGION_SIDE));
        }

        validate_output_path(&self.output)
    }
}

/// Arguments for `associated`.
#[derive(Args, Debug, Clone)]
pub struct AssociatedConfig {
    /// Path to the slide file.
    pub slide: PathBuf,

    /// Associated image to extract (e.g. `label`, `macro`, `thumbnail`).
    ///
    /// If not specified, lists the associated images.
    #[arg(long, requires = "output")]
    pub name: Option<String>,

    /// Output image (.png or .jpg).
    #[arg(short, long, requires = "name")]
    pub output: Option<PathBuf>,
}

impl AssociatedConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_slide_path(&self.slide)?;

        match (&self.name, &self.output) {
            (Some(name), Some(output)) => {
                if name.is_empty() {
                    return Err("associated image name must not be empty".to_string());
                }
                validate_output_path(output)
            }
            (None, None) => Ok(()),
            _ => Err("--name and --output must be given together".to_string()),
        }
    }

    /// Whether this invocation extracts an image rather than listing.
    pub fn is_extract(&self) -> bool {
        self.name.is_some()
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

fn validate_slide_path(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("slide path is required".to_string());
    }
    Ok(())
}

/// Output images must be PNG or JPEG, chosen by extension.
pub fn output_format(path: &Path) -> Result<ImageFormat, String> {
    match ImageFormat::from_path(path) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(format),
        _ => Err(format!(
            "unsupported output format for {} (use .png or .jpg)",
            path.display()
        )),
    }
}

fn validate_output_path(path: &Path) -> Result<(), String> {
    output_format(path).map(|_| ())
}

// =============================================================================
// Tests
// =============================================================================
