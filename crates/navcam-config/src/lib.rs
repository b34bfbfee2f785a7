//! Configuration for the navigation camera.
//!
//! Settings persist to disk as `config.ron`. Every section defaults field by
//! field, so older and newer files both load. Values can be overridden from the
//! command line via clap and checked with [`Config::validate`].

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, Config, DebugConfig, FollowConfig, InputConfig, InterpolationConfig, LensConfig, OrbitConfig,
    PanConfig, SpatialConfig, TouchConfig, Viewpoint, ZoomConfig,
};
pub use error::ConfigError;
