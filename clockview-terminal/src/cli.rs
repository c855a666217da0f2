use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clockview_core::config::DEFAULT_ASSET_PATH;
use clockview_core::controls::SliderRange;
use clockview_core::{Color, ControlError, ControlId, ViewerConfig};

use crate::logging::LoggingConfig;

/// Render a rotating 3D clock in the terminal
#[derive(Debug, Parser)]
#[command(name = "clockview-terminal", version, about)]
pub struct Args {
    /// GLB/GLTF asset with hour_hand, minute_hand and second_hand nodes
    #[arg(short, long, default_value = DEFAULT_ASSET_PATH)]
    pub asset: PathBuf,

    /// Frames per second; each frame applies one rotation step
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Initial X rotation speed (0-100)
    #[arg(long, default_value_t = 0.0)]
    pub rotation_x: f64,

    /// Initial Y rotation speed (0-100)
    #[arg(long, default_value_t = 0.0)]
    pub rotation_y: f64,

    /// Initial Z rotation speed (0-100)
    #[arg(long, default_value_t = 0.0)]
    pub rotation_z: f64,

    /// Initial clock hand speed (0-100)
    #[arg(long, default_value_t = 100.0)]
    pub clock_speed: f64,

    /// Initial background color as #rrggbb
    #[arg(long, default_value = "#000000", value_parser = parse_color)]
    pub background: Color,

    /// Log filter in env_logger syntax; falls back to RUST_LOG, then "info"
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Where log records go while the renderer owns the screen
    #[arg(long, default_value = "clockview.log")]
    pub log_file: PathBuf,
}

fn parse_color(value: &str) -> Result<Color, String> {
    Color::parse_hex(value).map_err(|err| err.to_string())
}

impl Args {
    pub fn frame_time(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }

    /// Viewer configuration; slider values are clamped to their range and
    /// non-finite values are rejected
    pub fn viewer_config(&self) -> Result<ViewerConfig, ControlError> {
        let mut config = ViewerConfig {
            asset: self.asset.display().to_string(),
            ..ViewerConfig::default()
        };

        let controls = &mut config.controls;
        controls.range = SliderRange::default();
        controls.background = self.background;
        for (control, value) in [
            (ControlId::RotationX, self.rotation_x),
            (ControlId::RotationY, self.rotation_y),
            (ControlId::RotationZ, self.rotation_z),
            (ControlId::ClockSpeed, self.clock_speed),
        ] {
            controls.set_value(control, value)?;
        }

        Ok(config)
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log_filter.clone(),
            log_file: Some(self.log_file.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["clockview-terminal"]).unwrap();
        assert_eq!(args.asset, PathBuf::from(DEFAULT_ASSET_PATH));
        assert_eq!(args.fps, 60);

        let config = args.viewer_config().unwrap();
        assert_eq!(config.controls.clock_speed, 100.0);
        assert_eq!(config.controls.rotation_x, 0.0);
        assert_eq!(config.controls.background, Color::BLACK);
    }

    #[test]
    fn test_overrides_are_clamped() {
        let args = Args::try_parse_from([
            "clockview-terminal",
            "--asset",
            "models/wall.glb",
            "--rotation-y",
            "250",
            "--clock-speed",
            "40",
            "--background",
            "#ff00aa",
        ])
        .unwrap();

        let config = args.viewer_config().unwrap();
        assert_eq!(config.asset, "models/wall.glb");
        assert_eq!(config.controls.rotation_y, 100.0);
        assert_eq!(config.controls.clock_speed, 40.0);
        assert_eq!(config.controls.background.to_hex(), "#FF00AA");
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        assert!(Args::try_parse_from(["clockview-terminal", "--background", "blue"]).is_err());
        assert!(Args::try_parse_from(["clockview-terminal", "--fps", "0"]).is_err());
    }

    #[test]
    fn test_non_finite_speed_rejected() {
        let args = Args::try_parse_from(["clockview-terminal", "--clock-speed", "NaN"]).unwrap();
        assert!(matches!(
            args.viewer_config(),
            Err(ControlError::NotANumber {
                control: ControlId::ClockSpeed,
                ..
            })
        ));

        let args = Args::try_parse_from(["clockview-terminal", "--rotation-x", "inf"]).unwrap();
        assert!(args.viewer_config().is_err());
    }

    #[test]
    fn test_frame_time() {
        let args = Args::try_parse_from(["clockview-terminal", "--fps", "50"]).unwrap();
        assert_eq!(args.frame_time(), Duration::from_millis(20));
    }
}
