//! Application state shared by the front ends and the per-frame update.

use crate::clock::ClockModel;
use crate::config::ViewerConfig;
use crate::controls::{Color, ControlId, ControlState};
use crate::error::{AssetError, ControlError};
use crate::orbit::OrbitControls;
use crate::projection::Camera;
use crate::scene::Lighting;

/// Everything that changes while the viewer runs
pub struct ViewerState {
    pub controls: ControlState,
    pub camera: Camera,
    pub orbit: OrbitControls,
    pub lighting: Lighting,
    model: Option<ClockModel>,
    frame: u64,
    viewport: (u32, u32),
}

impl ViewerState {
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        let camera = Camera::from_config(&config.camera, width, height);
        let orbit = OrbitControls::new(&camera, config.orbit.clone());
        Self {
            controls: config.controls.clone(),
            camera,
            orbit,
            lighting: Lighting::default(),
            model: None,
            frame: 0,
            viewport: (width, height),
        }
    }

    pub fn model(&self) -> Option<&ClockModel> {
        self.model.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Frames ticked so far, with or without a model
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn background(&self) -> Color {
        self.controls.background
    }

    /// Hand over the result of the one asset load.
    ///
    /// A failure is logged and leaves the viewer without a model for good.
    pub fn finish_load(&mut self, result: Result<ClockModel, AssetError>) {
        match result {
            Ok(_) if self.model.is_some() => {
                log::warn!("clock model already loaded, ignoring second load");
            }
            Ok(model) => {
                log::info!("clock model loaded after {} frames", self.frame);
                self.model = Some(model);
            }
            Err(err) => {
                log::error!("failed to load clock model: {err}");
            }
        }
    }

    /// One animation frame: apply orbit input, then rotate the clock if it
    /// has loaded. Returns whether the model moved.
    pub fn tick(&mut self) -> bool {
        self.frame += 1;
        self.orbit.update(&mut self.camera);

        match self.model.as_mut() {
            Some(model) => {
                model.advance(&self.controls);
                true
            }
            None => false,
        }
    }

    /// Viewport changed size; zero-sized viewports are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.camera.set_viewport(width, height) {
            self.viewport = (width, height);
            log::debug!("viewport resized to {width}x{height}");
        }
    }

    /// Apply a raw input value; returns the text its display should show
    pub fn apply_input(&mut self, control: ControlId, raw: &str) -> Result<String, ControlError> {
        let shown = self.controls.apply_input(control, raw);
        if let Err(err) = &shown {
            log::warn!("ignoring input: {err}");
        }
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::tests::clock_scene;
    use crate::clock::{ClockHand, HOUR_HAND_RATE, MINUTE_HAND_RATE, SECOND_HAND_RATE};

    fn viewer() -> ViewerState {
        ViewerState::new(&ViewerConfig::default(), 800, 600)
    }

    fn loaded_viewer() -> ViewerState {
        let mut viewer = viewer();
        viewer.finish_load(ClockModel::from_scene(clock_scene()));
        viewer
    }

    #[test]
    fn test_tick_without_model_is_a_no_op() {
        let mut viewer = viewer();
        viewer.controls.rotation_x = 100.0;

        for _ in 0..1000 {
            assert!(!viewer.tick());
        }
        assert!(viewer.model().is_none());
        assert_eq!(viewer.frame(), 1000);
    }

    #[test]
    fn test_failed_load_stays_absent() {
        let mut viewer = viewer();
        viewer.finish_load(Err(AssetError::MissingNode("hour_hand")));
        assert!(!viewer.is_loaded());
        assert!(!viewer.tick());
    }

    #[test]
    fn test_hand_angles_after_n_frames() {
        let mut viewer = loaded_viewer();
        viewer.apply_input(ControlId::ClockSpeed, "25").unwrap();

        let n = 240;
        for _ in 0..n {
            assert!(viewer.tick());
        }

        let model = viewer.model().unwrap();
        for (hand, rate) in [
            (ClockHand::Hour, HOUR_HAND_RATE),
            (ClockHand::Minute, MINUTE_HAND_RATE),
            (ClockHand::Second, SECOND_HAND_RATE),
        ] {
            let expected = n as f64 * rate * 0.25;
            assert!((model.hand_angle(hand) - expected).abs() <= expected * 1e-9);
        }
    }

    #[test]
    fn test_zero_frames_leaves_model_at_rest() {
        let viewer = loaded_viewer();
        let model = viewer.model().unwrap();
        for hand in ClockHand::ALL {
            assert_eq!(model.hand_angle(hand), 0.0);
        }
    }

    #[test]
    fn test_model_loads_only_once() {
        let mut viewer = loaded_viewer();
        viewer.tick();
        let angle = viewer.model().unwrap().hand_angle(ClockHand::Second);

        viewer.finish_load(ClockModel::from_scene(clock_scene()));
        assert_eq!(viewer.model().unwrap().hand_angle(ClockHand::Second), angle);
    }

    #[test]
    fn test_resize_sequence_keeps_last_aspect() {
        let mut viewer = viewer();
        viewer.resize(800, 600);
        viewer.resize(1024, 768);
        assert!((viewer.camera.aspect - 1024.0 / 768.0).abs() < 1e-6);
        assert_eq!(viewer.viewport(), (1024, 768));

        viewer.resize(0, 0);
        assert_eq!(viewer.viewport(), (1024, 768));
    }

    #[test]
    fn test_background_follows_color_input() {
        let mut viewer = viewer();
        assert_eq!(
            viewer.apply_input(ControlId::Background, "#ff00aa"),
            Ok("#FF00AA".to_string())
        );
        assert_eq!(viewer.background(), Color::new(0xFF, 0x00, 0xAA));
        assert!(viewer.apply_input(ControlId::Background, "red").is_err());
        assert_eq!(viewer.background(), Color::new(0xFF, 0x00, 0xAA));
    }
}
