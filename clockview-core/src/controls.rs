//! The five user controls driving the viewer, and parsing of their raw values.
//!
//! Browser inputs hand over strings; the terminal front end nudges values by
//! steps. Both paths end in [`ControlState`], which the per-frame update only
//! reads.

use std::fmt;

use nom::{
    bytes::complete::{tag, take_while_m_n},
    character::complete::multispace0,
    combinator::{all_consuming, map_res},
    number::complete::double,
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::error::ControlError;

/// Identifies one of the five controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    RotationX,
    RotationY,
    RotationZ,
    Background,
    ClockSpeed,
}

impl ControlId {
    pub const ALL: [ControlId; 5] = [
        ControlId::RotationX,
        ControlId::RotationY,
        ControlId::RotationZ,
        ControlId::Background,
        ControlId::ClockSpeed,
    ];

    /// DOM id of the input element
    pub fn element_id(self) -> &'static str {
        match self {
            ControlId::RotationX => "rotationSpeedX",
            ControlId::RotationY => "rotationSpeedY",
            ControlId::RotationZ => "rotationSpeedZ",
            ControlId::Background => "backgroundColor",
            ControlId::ClockSpeed => "clockRotationSpeed",
        }
    }

    /// DOM id of the text element mirroring the input
    pub fn display_id(self) -> String {
        format!("{}Value", self.element_id())
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlId::RotationX => "Rotation X",
            ControlId::RotationY => "Rotation Y",
            ControlId::RotationZ => "Rotation Z",
            ControlId::Background => "Background",
            ControlId::ClockSpeed => "Clock speed",
        }
    }

    /// Next control in display order, wrapping around
    pub fn next(self) -> ControlId {
        let index = Self::ALL.iter().position(|&c| c == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, hex digits in either case
    pub fn parse_hex(input: &str) -> Result<Color, ControlError> {
        all_consuming(hex_color)(input)
            .map(|(_, color)| color)
            .map_err(|_| ControlError::InvalidColor {
                value: input.to_string(),
            })
    }

    /// Upper-case `#RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Channels scaled to [0, 1]
    pub fn to_unit_rgb(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

fn hex_byte(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |s| {
        u8::from_str_radix(s, 16)
    })(input)
}

fn hex_color(input: &str) -> IResult<&str, Color> {
    let (input, (r, g, b)) = preceded(tag("#"), tuple((hex_byte, hex_byte, hex_byte)))(input)?;
    Ok((input, Color::new(r, g, b)))
}

/// Parse a numeric slider value, tolerating surrounding whitespace
pub fn parse_slider_value(control: ControlId, input: &str) -> Result<f64, ControlError> {
    let parsed: IResult<&str, f64> = all_consuming(delimited(multispace0, double, multispace0))(input);
    match parsed {
        Ok((_, value)) if value.is_finite() => Ok(value),
        _ => Err(ControlError::NotANumber {
            control,
            value: input.to_string(),
        }),
    }
}

/// Inclusive range and step of the numeric sliders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl Default for SliderRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
        }
    }
}

/// Colors the terminal front end cycles through for the background
pub const BACKGROUND_PRESETS: [Color; 6] = [
    Color::new(0x00, 0x00, 0x00),
    Color::new(0x1E, 0x1E, 0x2E),
    Color::new(0x0B, 0x3D, 0x91),
    Color::new(0x2E, 0x7D, 0x32),
    Color::new(0x8E, 0x24, 0xAA),
    Color::new(0xFF, 0xFF, 0xFF),
];

/// Current value of every control
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub rotation_z: f64,
    pub clock_speed: f64,
    pub background: Color,
    pub range: SliderRange,
}

impl ControlState {
    /// Numeric value of a slider; `None` for the color control
    pub fn value(&self, control: ControlId) -> Option<f64> {
        match control {
            ControlId::RotationX => Some(self.rotation_x),
            ControlId::RotationY => Some(self.rotation_y),
            ControlId::RotationZ => Some(self.rotation_z),
            ControlId::ClockSpeed => Some(self.clock_speed),
            ControlId::Background => None,
        }
    }

    fn slider_mut(&mut self, control: ControlId) -> Option<&mut f64> {
        match control {
            ControlId::RotationX => Some(&mut self.rotation_x),
            ControlId::RotationY => Some(&mut self.rotation_y),
            ControlId::RotationZ => Some(&mut self.rotation_z),
            ControlId::ClockSpeed => Some(&mut self.clock_speed),
            ControlId::Background => None,
        }
    }

    /// Set a slider, clamped to the configured range.
    ///
    /// NaN and infinities are rejected and the previous value kept.
    pub fn set_value(&mut self, control: ControlId, value: f64) -> Result<(), ControlError> {
        if !value.is_finite() {
            return Err(ControlError::NotANumber {
                control,
                value: value.to_string(),
            });
        }
        let range = self.range;
        let slot = self.slider_mut(control).ok_or(ControlError::WrongKind {
            control,
            kind: "numeric",
        })?;
        *slot = range.clamp(value);
        Ok(())
    }

    /// Apply a raw value as produced by an input element.
    ///
    /// On error the previous value is kept. Returns the text the control's
    /// display should show.
    pub fn apply_input(&mut self, control: ControlId, raw: &str) -> Result<String, ControlError> {
        match control {
            ControlId::Background => {
                self.background = Color::parse_hex(raw.trim())?;
            }
            _ => {
                let value = parse_slider_value(control, raw)?;
                self.set_value(control, value)?;
            }
        }
        Ok(self.display_text(control))
    }

    /// Text mirrored next to a control
    pub fn display_text(&self, control: ControlId) -> String {
        match self.value(control) {
            Some(value) => format_slider_value(value),
            None => self.background.to_hex(),
        }
    }

    /// Move a control by `steps`: sliders by their step size, the color
    /// through [`BACKGROUND_PRESETS`]
    pub fn nudge(&mut self, control: ControlId, steps: i32) {
        let range = self.range;
        match self.slider_mut(control) {
            Some(slot) => *slot = range.clamp(*slot + range.step * steps as f64),
            None => {
                let len = BACKGROUND_PRESETS.len() as i32;
                let current = BACKGROUND_PRESETS
                    .iter()
                    .position(|&c| c == self.background)
                    .map(|i| i as i32)
                    .unwrap_or(if steps >= 0 { -1 } else { 0 });
                let next = (current + steps).rem_euclid(len) as usize;
                self.background = BACKGROUND_PRESETS[next];
            }
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            clock_speed: 100.0,
            background: Color::BLACK,
            range: SliderRange::default(),
        }
    }
}

fn format_slider_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_display_is_upper_case() {
        let mut controls = ControlState::default();
        assert_eq!(
            controls.apply_input(ControlId::Background, "#FF0000"),
            Ok("#FF0000".to_string())
        );
        assert_eq!(
            controls.apply_input(ControlId::Background, "#ff00aa"),
            Ok("#FF00AA".to_string())
        );
        assert_eq!(controls.background, Color::new(0xFF, 0x00, 0xAA));
    }

    #[test]
    fn test_invalid_color_keeps_previous() {
        let mut controls = ControlState::default();
        controls.apply_input(ControlId::Background, "#123456").unwrap();

        for bad in ["123456", "#12345", "#1234567", "#GG0000", ""] {
            assert!(matches!(
                controls.apply_input(ControlId::Background, bad),
                Err(ControlError::InvalidColor { .. })
            ));
        }
        assert_eq!(controls.background.to_hex(), "#123456");
    }

    #[test]
    fn test_slider_values_parse_and_clamp() {
        let mut controls = ControlState::default();
        assert_eq!(controls.apply_input(ControlId::RotationX, "42"), Ok("42".to_string()));
        assert_eq!(controls.apply_input(ControlId::RotationY, " 12.5 "), Ok("12.5".to_string()));
        assert_eq!(controls.apply_input(ControlId::RotationZ, "250"), Ok("100".to_string()));
        assert_eq!(controls.apply_input(ControlId::ClockSpeed, "-3"), Ok("0".to_string()));

        assert_eq!(controls.rotation_x, 42.0);
        assert_eq!(controls.rotation_y, 12.5);
        assert_eq!(controls.rotation_z, 100.0);
        assert_eq!(controls.clock_speed, 0.0);
    }

    #[test]
    fn test_non_numeric_slider_rejected() {
        let mut controls = ControlState::default();
        for bad in ["", "fast", "12px", "nan", "inf"] {
            assert!(controls.apply_input(ControlId::ClockSpeed, bad).is_err(), "{bad}");
        }
        assert_eq!(controls.clock_speed, 100.0);
    }

    #[test]
    fn test_each_control_mirrors_its_own_value() {
        let mut controls = ControlState::default();
        controls.apply_input(ControlId::RotationX, "10").unwrap();
        controls.apply_input(ControlId::RotationY, "20").unwrap();
        controls.apply_input(ControlId::RotationZ, "30").unwrap();

        assert_eq!(controls.display_text(ControlId::RotationX), "10");
        assert_eq!(controls.display_text(ControlId::RotationY), "20");
        assert_eq!(controls.display_text(ControlId::RotationZ), "30");
        assert_eq!(controls.display_text(ControlId::ClockSpeed), "100");
        assert_eq!(controls.display_text(ControlId::Background), "#000000");
    }

    #[test]
    fn test_non_finite_values_keep_previous() {
        let mut controls = ControlState::default();
        controls.set_value(ControlId::RotationX, 30.0).unwrap();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                controls.set_value(ControlId::RotationX, bad),
                Err(ControlError::NotANumber { .. })
            ));
            assert!(controls.set_value(ControlId::ClockSpeed, bad).is_err());
        }
        assert_eq!(controls.rotation_x, 30.0);
        assert_eq!(controls.clock_speed, 100.0);
        assert_eq!(controls.display_text(ControlId::RotationX), "30");
    }

    #[test]
    fn test_set_value_on_color_is_rejected() {
        let mut controls = ControlState::default();
        assert!(matches!(
            controls.set_value(ControlId::Background, 1.0),
            Err(ControlError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_nudge() {
        let mut controls = ControlState::default();
        controls.nudge(ControlId::RotationX, 5);
        assert_eq!(controls.rotation_x, 5.0);
        controls.nudge(ControlId::RotationX, -10);
        assert_eq!(controls.rotation_x, 0.0);
        controls.nudge(ControlId::ClockSpeed, 1);
        assert_eq!(controls.clock_speed, 100.0);

        controls.nudge(ControlId::Background, 1);
        assert_eq!(controls.background, BACKGROUND_PRESETS[1]);
        controls.nudge(ControlId::Background, -2);
        assert_eq!(controls.background, BACKGROUND_PRESETS[BACKGROUND_PRESETS.len() - 1]);
    }

    #[test]
    fn test_element_ids() {
        assert_eq!(ControlId::ClockSpeed.element_id(), "clockRotationSpeed");
        assert_eq!(ControlId::Background.display_id(), "backgroundColorValue");
        assert_eq!(ControlId::ClockSpeed.next(), ControlId::RotationX);
    }
}
