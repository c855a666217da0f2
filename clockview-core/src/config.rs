/// Startup configuration shared by every front end
use crate::controls::ControlState;

/// Where the clock asset lives when nothing else is configured
pub const DEFAULT_ASSET_PATH: &str = "resources/clock.glb";

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial distance from the target along +Z
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 10000.0,
            distance: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitConfig {
    /// Radians of rotation for a drag across the full viewport height
    pub rotate_speed: f32,
    /// Radius multiplier per zoom step, below 1
    pub zoom_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed: std::f32::consts::TAU,
            zoom_factor: 0.95,
            min_distance: 1.0,
            max_distance: 1000.0,
        }
    }
}

/// Everything a viewer needs before the first frame
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// File path (terminal) or URL (browser) of the clock asset
    pub asset: String,
    pub controls: ControlState,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset: DEFAULT_ASSET_PATH.to_string(),
            controls: ControlState::default(),
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
        }
    }
}
