use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::{error::LoadError, game::animation::TimeWrapMode};

/// Window, camera, lighting and playback settings. Missing JSON fields fall back to the defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub resizable: bool,
    pub vsync: bool,
    /// degrees
    pub fov: f32,
    pub znear: f32,
    pub zfar: f32,
    pub camera_pos: Vec3,
    pub camera_target: Vec3,
    pub model_scale: f32,
    /// direction the light comes from, normalized on use
    pub light_dir: Vec3,
    pub light_color: Vec3,
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub specular_shininess: f32,
    pub specular_intensity: f32,
    pub clear_color: [f64; 3],
    pub play_animation: bool,
    pub initial_clip: usize,
    pub time_wrap: TimeWrapMode,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Skeletal Animation Viewer".to_string(),
            window_width: 800,
            window_height: 600,
            resizable: false,
            vsync: false,
            fov: 75.0,
            znear: 0.1,
            zfar: 100.0,
            camera_pos: Vec3::new(-1.2, 1.5, 1.2),
            camera_target: Vec3::new(0.0, 1.0, 0.0),
            model_scale: 0.01,
            light_dir: Vec3::new(0.5, 1.0, 1.0).normalize(),
            light_color: Vec3::new(1.0, 1.0, 0.8),
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.5,
            specular_shininess: 32.0,
            specular_intensity: 0.5,
            clear_color: [0.2, 0.3, 0.4],
            play_animation: true,
            initial_clip: 1,
            time_wrap: TimeWrapMode::Repeat,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn aspect(&self) -> f32 {
        if self.window_height > 0 {
            self.window_width as f32 / self.window_height as f32
        } else {
            16.0 / 9.0
        }
    }

    /// OpenGL-style clip space, convert with `OPENGL_TO_WGPU_MATRIX` before upload.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, self.znear, self.zfar)
    }

    /// Falls back to FIFO on surfaces that can't present without vsync.
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.camera_pos, self.camera_target, Vec3::Y)
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.model_scale))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(r#"{ "fov": 60.0, "time_wrap": "ping_pong", "camera_pos": [0.0, 1.0, 3.0] }"#).unwrap();
        assert_eq!(config.fov, 60.0);
        assert_eq!(config.time_wrap, TimeWrapMode::PingPong);
        assert_eq!(config.camera_pos, Vec3::new(0.0, 1.0, 3.0));
        assert_eq!(config.window_width, 800);
        assert_eq!(config.initial_clip, 1);
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(ViewerConfig::from_json("{}").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(
            ViewerConfig::from_json("{ fov: }"),
            Err(LoadError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, r#"{ "play_animation": false }"#).unwrap();
        assert!(!ViewerConfig::load(&path).unwrap().play_animation);
    }

    #[test]
    fn presents_without_vsync_by_default() {
        assert_eq!(ViewerConfig::default().present_mode(), wgpu::PresentMode::AutoNoVsync);
        let config = ViewerConfig::from_json(r#"{ "vsync": true }"#).unwrap();
        assert_eq!(config.present_mode(), wgpu::PresentMode::AutoVsync);
    }

    #[test]
    fn aspect_of_default_window() {
        assert!((ViewerConfig::default().aspect() - 4.0 / 3.0).abs() < 1e-6);
    }
}
