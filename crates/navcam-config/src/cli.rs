//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Navigation camera command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "navcam", about = "Interactive 3D camera navigation")]
pub struct CliArgs {
    /// Viewport width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Vertical field of view in degrees.
    #[arg(long)]
    pub fov: Option<f32>,

    /// Use a parallel projection.
    #[arg(long)]
    pub orthographic: bool,

    /// Speed of smooth pose transitions.
    #[arg(long)]
    pub interpolation_speed: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.lens.viewport_width = w;
        }
        if let Some(h) = args.height {
            self.lens.viewport_height = h;
        }
        if let Some(fov) = args.fov {
            self.lens.fov_y_deg = fov;
        }
        if args.orthographic {
            self.lens.orthographic = true;
        }
        if let Some(speed) = args.interpolation_speed {
            self.interpolation.speed = speed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
