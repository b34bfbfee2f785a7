//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Orbit elevation can never reach ±90°; pitch limits must stay inside this.
const PITCH_LIMIT_DEG: f32 = 89.0;

/// Top-level navigation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Projection used to turn pointer pixels into rays.
    pub lens: LensConfig,
    /// Global input scaling.
    pub input: InputConfig,
    /// Mouse orbit behaviour.
    pub orbit: OrbitConfig,
    /// Mouse pan behaviour.
    pub pan: PanConfig,
    /// Scroll, pinch, and drag zoom.
    pub zoom: ZoomConfig,
    /// Defaults for follow mode.
    pub follow: FollowConfig,
    /// Smooth pose transitions.
    pub interpolation: InterpolationConfig,
    /// Touch gestures.
    pub touch: TouchConfig,
    /// 6-DoF controller.
    pub spatial: SpatialConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Named camera bookmarks.
    pub viewpoints: Vec<Viewpoint>,
}

/// Camera lens and viewport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LensConfig {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Viewport width in pixels.
    pub viewport_width: u32,
    /// Viewport height in pixels.
    pub viewport_height: u32,
    /// Parallel projection; zoom scales `ortho_size` instead of moving the camera.
    pub orthographic: bool,
    /// Half the viewport height in world units when orthographic.
    pub ortho_size: f32,
}

/// Input configuration shared by all devices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Multiplier applied to every rotation and zoom delta.
    pub master_sensitivity: f32,
    /// Extra multiplier while the fine modifier (shift) is held.
    pub fine_factor: f32,
    /// Arrow-key travel speed.
    pub key_speed: f32,
}

/// Orbit configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrbitConfig {
    /// Rotate with the left button instead of the right one.
    pub rotate_with_left_button: bool,
    /// Orbit directly around the picked pivot instead of around the anchor.
    pub pivot_bypass: bool,
    /// Use the scene point under the pointer as pivot when there is one.
    pub pivot_on_pointer_hit: bool,
    /// Degrees of rotation per pixel of pointer travel.
    pub degrees_per_pixel: f32,
    /// Rotation smoothing; higher converges faster.
    pub damping: f32,
    /// Lowest pitch in degrees.
    pub min_pitch_deg: f32,
    /// Highest pitch in degrees.
    pub max_pitch_deg: f32,
}

/// Pan configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanConfig {
    /// Anchor smoothing; higher converges faster.
    pub damping: f32,
    /// Pan plane distance when nothing is under the pointer.
    pub default_plane_distance: f32,
}

/// Zoom configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoomConfig {
    /// Scroll zoom speed.
    pub speed: f32,
    /// Distance smoothing; higher converges faster.
    pub damping: f32,
    /// Closest the camera may get to its anchor.
    pub min_distance: f32,
    /// Farthest the camera may get from its anchor.
    pub max_distance: f32,
    /// Distance of the implicit anchor at startup.
    pub initial_distance: f32,
    /// Zoom factor when the geometry under the pointer is close.
    pub near_factor: f32,
    /// Zoom factor when the geometry under the pointer is far.
    pub far_factor: f32,
    /// Hit distance separating near from far.
    pub near_threshold: f32,
    /// Speed of zoom-modifier drags.
    pub drag_speed: f32,
}

/// Follow-mode defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FollowConfig {
    /// Default lerp speed, clamped to `[0.01, 100]` when used.
    pub lerp_speed: f32,
    /// Fraction of the screen height the followed object should fill.
    pub screen_fraction: f32,
    /// Distance used when the object has no usable bounds.
    pub fallback_distance: f32,
}

/// Smooth pose transitions (viewpoint recall, `set_pose(.., true)`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterpolationConfig {
    /// When false, poses are assigned immediately.
    pub enabled: bool,
    /// Transition speed.
    pub speed: f32,
}

/// Touch gesture configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TouchConfig {
    pub rotation_speed: f32,
    pub zoom_speed: f32,
    pub invert_horizontal: bool,
    pub invert_vertical: bool,
}

/// 6-DoF controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpatialConfig {
    pub enabled: bool,
    pub translation_speed: f32,
    pub rotation_speed: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

/// A named camera bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Viewpoint {
    pub name: String,
    /// Look-at point.
    pub anchor: [f32; 3],
    /// Distance from the anchor.
    pub distance: f32,
    /// Orientation as `(pitch, yaw, roll)` in degrees.
    pub angles_deg: [f32; 3],
}

// --- Default implementations ---

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 60.0,
            viewport_width: 1280,
            viewport_height: 720,
            orthographic: false,
            ortho_size: 5.0,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            master_sensitivity: 1.0,
            fine_factor: 0.5,
            key_speed: 1.0,
        }
    }
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_with_left_button: false,
            pivot_bypass: true,
            pivot_on_pointer_hit: true,
            degrees_per_pixel: 0.25,
            damping: 1.0,
            min_pitch_deg: -PITCH_LIMIT_DEG,
            max_pitch_deg: PITCH_LIMIT_DEG,
        }
    }
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            damping: 1.0,
            default_plane_distance: 3.0,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            damping: 1.0,
            min_distance: 1.0,
            max_distance: 1000.0,
            initial_distance: 5.0,
            near_factor: 0.25,
            far_factor: 1.0,
            near_threshold: 5.0,
            drag_speed: 1.0,
        }
    }
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            lerp_speed: 1.0,
            screen_fraction: 0.33,
            fallback_distance: 5.0,
        }
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 0.5,
        }
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 1.0,
            zoom_speed: 1.0,
            invert_horizontal: false,
            invert_vertical: false,
        }
    }
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            translation_speed: 1.0,
            rotation_speed: 1.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            name: String::new(),
            anchor: [0.0; 3],
            distance: 5.0,
            angles_deg: [0.0; 3],
        }
    }
}

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

impl Config {
    pub fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// when the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::file_path(config_dir);
        if !path.exists() {
            let defaults = Self::default();
            defaults.save(config_dir)?;
            log::info!("Wrote default camera config to {}", path.display());
            return Ok(defaults);
        }
        let config = Self::read(&path)?;
        log::info!(
            "Camera config loaded from {} ({} viewpoints)",
            path.display(),
            config.viewpoints.len()
        );
        Ok(config)
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;
        std::fs::write(Self::file_path(config_dir), self.to_ron()?).map_err(ConfigError::WriteError)
    }

    /// Re-reads the file and returns it only if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let on_disk = Self::read(&Self::file_path(config_dir))?;
        if on_disk == *self {
            return Ok(None);
        }
        log::info!("Camera config changed on disk");
        Ok(Some(on_disk))
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&text).map_err(ConfigError::ParseError)
    }

    /// Look up a bookmark by name.
    pub fn viewpoint(&self, name: &str) -> Option<&Viewpoint> {
        self.viewpoints.iter().find(|v| v.name == name)
    }

    /// Insert a bookmark, replacing any existing one with the same name.
    pub fn upsert_viewpoint(&mut self, viewpoint: Viewpoint) {
        match self.viewpoints.iter_mut().find(|v| v.name == viewpoint.name) {
            Some(existing) => *existing = viewpoint,
            None => self.viewpoints.push(viewpoint),
        }
    }

    /// Rejects values the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fov = self.lens.fov_y_deg;
        if !(fov > 1.0 && fov < 179.0) {
            return Err(invalid("lens.fov_y_deg", format!("{fov} not in (1, 179)")));
        }
        if self.lens.viewport_width == 0 || self.lens.viewport_height == 0 {
            return Err(invalid("lens.viewport", "viewport must be non-empty".into()));
        }

        let (min, max) = (self.zoom.min_distance, self.zoom.max_distance);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(invalid(
                "zoom.min_distance",
                format!("need 0 < min ({min}) <= max ({max})"),
            ));
        }

        let (lo, hi) = (self.orbit.min_pitch_deg, self.orbit.max_pitch_deg);
        if !(lo <= hi && lo >= -PITCH_LIMIT_DEG && hi <= PITCH_LIMIT_DEG) {
            return Err(invalid(
                "orbit.min_pitch_deg",
                format!("need -89 <= min ({lo}) <= max ({hi}) <= 89"),
            ));
        }

        let positive = [
            ("input.master_sensitivity", self.input.master_sensitivity),
            ("input.fine_factor", self.input.fine_factor),
            ("input.key_speed", self.input.key_speed),
            ("lens.ortho_size", self.lens.ortho_size),
            ("orbit.degrees_per_pixel", self.orbit.degrees_per_pixel),
            ("orbit.damping", self.orbit.damping),
            ("pan.damping", self.pan.damping),
            ("pan.default_plane_distance", self.pan.default_plane_distance),
            ("zoom.speed", self.zoom.speed),
            ("zoom.damping", self.zoom.damping),
            ("zoom.initial_distance", self.zoom.initial_distance),
            ("zoom.drag_speed", self.zoom.drag_speed),
            ("follow.lerp_speed", self.follow.lerp_speed),
            ("follow.screen_fraction", self.follow.screen_fraction),
            ("follow.fallback_distance", self.follow.fallback_distance),
            ("interpolation.speed", self.interpolation.speed),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("{value} must be finite and positive")));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let ron_str = Config::default().to_ron().unwrap();
        assert!(ron_str.contains("fov_y_deg: 60.0"));
        assert!(ron_str.contains("min_distance: 1.0"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(lens: (fov_y_deg: 45.0), zoom: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.lens.fov_y_deg, 45.0);
        assert_eq!(config.lens.viewport_width, 1280);
        assert_eq!(config.follow, FollowConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load_with_viewpoints() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.zoom.max_distance = 250.0;
        config.upsert_viewpoint(Viewpoint {
            name: "overview".to_string(),
            anchor: [1.0, 0.0, -2.0],
            distance: 12.0,
            angles_deg: [-30.0, 45.0, 0.0],
        });

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
        assert_eq!(loaded.viewpoint("overview").unwrap().distance, 12.0);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::file_path(dir.path()).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.interpolation.speed = 2.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().interpolation.speed, 2.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_upsert_replaces_by_name() {
        let mut config = Config::default();
        config.upsert_viewpoint(Viewpoint {
            name: "a".into(),
            ..Default::default()
        });
        config.upsert_viewpoint(Viewpoint {
            name: "a".into(),
            distance: 9.0,
            ..Default::default()
        });
        assert_eq!(config.viewpoints.len(), 1);
        assert_eq!(config.viewpoint("a").unwrap().distance, 9.0);
        assert!(config.viewpoint("b").is_none());
    }

    #[test]
    fn test_validate_rejects_inverted_distance_limits() {
        let mut config = Config::default();
        config.zoom.min_distance = 10.0;
        config.zoom.max_distance = 2.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "zoom.min_distance",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_pitch_past_limit() {
        let mut config = Config::default();
        config.orbit.max_pitch_deg = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_fov_and_speed() {
        let mut config = Config::default();
        config.lens.fov_y_deg = 180.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.interpolation.speed = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_orthographic_lens_round_trips() {
        let ron_str = "(lens: (orthographic: true, ortho_size: 12.5), input: (key_speed: 2.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert!(config.lens.orthographic);
        assert_eq!(config.lens.ortho_size, 12.5);
        assert_eq!(config.lens.fov_y_deg, 60.0);
        assert_eq!(config.input.key_speed, 2.0);
        assert!(config.validate().is_ok());

        let mut config = config;
        config.lens.ortho_size = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "lens.ortho_size",
                ..
            }
        ));
    }
}
