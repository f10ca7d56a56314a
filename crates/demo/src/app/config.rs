use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pixelcam::{CameraConfig, LoopConfig, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const CONFIG_ENV_VAR: &str = "PIXELCAM_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DemoConfig {
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) target_tps: u32,
    pub(crate) max_render_fps: Option<u32>,
    pub(crate) camera: CameraConfig,
    pub(crate) pan_speed_units_per_second: f32,
    pub(crate) tile_scale: f32,
    pub(crate) chunk_size: u32,
    pub(crate) shake_strength: f32,
    pub(crate) shake_decay: f32,
    pub(crate) minimap: MinimapConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MinimapConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) margin: f32,
    pub(crate) zoom: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_title: "pixelcam demo".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_render_fps: None,
            camera: CameraConfig {
                position: Vec2::ZERO,
                zoom: 20.0,
            },
            pan_speed_units_per_second: 6.0,
            tile_scale: 1.0,
            chunk_size: 16,
            shake_strength: 6.0,
            shake_decay: 0.85,
            minimap: MinimapConfig::default(),
        }
    }
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            width: 160.0,
            height: 120.0,
            margin: 8.0,
            zoom: 4.0,
        }
    }
}

impl DemoConfig {
    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window_title.clone(),
            window_width: self.window_width,
            window_height: self.window_height,
            target_tps: self.target_tps,
            max_render_fps: self.max_render_fps,
            metrics_log_interval: Duration::from_secs(1),
            ..LoopConfig::default()
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{}' at {at}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads the file named by [`CONFIG_ENV_VAR`], or returns defaults when the
/// variable is unset or empty.
pub(crate) fn load_config_from_env() -> Result<DemoConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => load_config(Path::new(&path)),
        _ => Ok(DemoConfig::default()),
    }
}

pub(crate) fn load_config(path: &Path) -> Result<DemoConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&raw).map_err(|(at, source)| ConfigError::Parse {
        path: path.to_path_buf(),
        at,
        source,
    })
}

fn parse_config(raw: &str) -> Result<DemoConfig, (String, serde_json::Error)> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, DemoConfig>(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        (at, error.into_inner())
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let file = write_config(r#"{ "window_width": 1024, "camera": { "zoom": 8.0 } }"#);
        let config = load_config(file.path()).expect("config");

        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, DemoConfig::default().window_height);
        assert_eq!(config.camera.zoom, 8.0);
        assert_eq!(config.camera.position, Vec2::ZERO);
        assert_eq!(config.minimap, MinimapConfig::default());
    }

    #[test]
    fn parse_errors_report_the_json_path() {
        let file = write_config(r#"{ "minimap": { "zoom": "far" } }"#);
        let error = load_config(file.path()).expect_err("bad zoom");

        match error {
            ConfigError::Parse { at, .. } => assert_eq!(at, "minimap.zoom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write_config(r#"{ "window_widht": 10 }"#);
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            load_config(&missing),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn loop_config_carries_window_settings() {
        let config = DemoConfig {
            window_title: "test".to_string(),
            max_render_fps: Some(30),
            ..DemoConfig::default()
        };
        let loop_config = config.loop_config();
        assert_eq!(loop_config.window_title, "test");
        assert_eq!(loop_config.window_width, 800);
        assert_eq!(loop_config.max_render_fps, Some(30));
    }
}
