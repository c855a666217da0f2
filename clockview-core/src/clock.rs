//! The clock model and the per-frame rotation rule.

use crate::controls::ControlState;
use crate::error::AssetError;
use crate::scene::{NodeId, Scene};
use crate::transform::RotationState;

/// Base per-frame body rotation (radians) at a full-scale slider
pub const BODY_RATE: f64 = 0.01;

/// Per-frame hand rotations (radians) at a full-scale clock slider.
/// Proportioned 1 : 60 : 3600 like real clock gearing.
pub const HOUR_HAND_RATE: f64 = 0.000002777777778;
pub const MINUTE_HAND_RATE: f64 = 0.000166666666667;
pub const SECOND_HAND_RATE: f64 = 0.01;

/// Sliders are percentages of the base rate
const SLIDER_SCALE: f64 = 100.0;

/// Name of the node wrapping the imported asset
pub const ROOT_NODE_NAME: &str = "clock";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockHand {
    Hour,
    Minute,
    Second,
}

impl ClockHand {
    pub const ALL: [ClockHand; 3] = [ClockHand::Hour, ClockHand::Minute, ClockHand::Second];

    /// Node name the asset must use for this hand
    pub fn node_name(self) -> &'static str {
        match self {
            ClockHand::Hour => "hour_hand",
            ClockHand::Minute => "minute_hand",
            ClockHand::Second => "second_hand",
        }
    }

    pub fn rate(self) -> f64 {
        match self {
            ClockHand::Hour => HOUR_HAND_RATE,
            ClockHand::Minute => MINUTE_HAND_RATE,
            ClockHand::Second => SECOND_HAND_RATE,
        }
    }

    fn index(self) -> usize {
        match self {
            ClockHand::Hour => 0,
            ClockHand::Minute => 1,
            ClockHand::Second => 2,
        }
    }
}

/// A loaded clock: its scene plus handles to the root and the three hands
#[derive(Debug, Clone)]
pub struct ClockModel {
    scene: Scene,
    root: NodeId,
    hands: [NodeId; 3],
    /// Authored Y angle of each hand
    rest: [f64; 3],
}

impl ClockModel {
    /// Wrap an imported scene, locate the hands and centre the model on the
    /// origin.
    pub fn from_scene(mut scene: Scene) -> Result<Self, AssetError> {
        if scene.is_empty() {
            return Err(AssetError::NoScene);
        }

        let mut hands = [0; 3];
        for hand in ClockHand::ALL {
            hands[hand.index()] = scene
                .find_by_name(hand.node_name())
                .ok_or(AssetError::MissingNode(hand.node_name()))?;
        }

        let mut rest = [0.0; 3];
        for hand in ClockHand::ALL {
            if let Some(node) = scene.node(hands[hand.index()]) {
                rest[hand.index()] = node.rotation.y;
            }
        }

        let center = scene.bounds().center();
        let root = scene.wrap_roots(Some(ROOT_NODE_NAME.to_string()));
        if let Some(node) = scene.node_mut(root) {
            node.translation = -center.coords;
        }

        log::debug!(
            "clock model ready: {} nodes, centred from {:?}",
            scene.len(),
            center
        );

        Ok(Self {
            scene,
            root,
            hands,
            rest,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn root_rotation(&self) -> RotationState {
        self.rotation_of(self.root)
    }

    /// Y rotation a hand has accumulated since load
    pub fn hand_angle(&self, hand: ClockHand) -> f64 {
        self.rotation_of(self.hands[hand.index()]).y - self.rest[hand.index()]
    }

    fn rotation_of(&self, id: NodeId) -> RotationState {
        self.scene
            .node(id)
            .map(|node| node.rotation)
            .unwrap_or_default()
    }

    /// Apply one frame of rotation driven by the current controls
    pub fn advance(&mut self, controls: &ControlState) {
        if let Some(root) = self.scene.node_mut(self.root) {
            root.rotation.rotate(
                BODY_RATE * (controls.rotation_x / SLIDER_SCALE),
                BODY_RATE * (controls.rotation_y / SLIDER_SCALE),
                BODY_RATE * (controls.rotation_z / SLIDER_SCALE),
            );
        }

        let clock_speed = controls.clock_speed / SLIDER_SCALE;
        for hand in ClockHand::ALL {
            if let Some(node) = self.scene.node_mut(self.hands[hand.index()]) {
                node.rotation.y += hand.rate() * clock_speed;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::scene::SceneNode;
    use nalgebra::{Point3, Vector3};

    /// Clock face with three hands, deliberately off-centre
    pub(crate) fn clock_scene() -> Scene {
        let mut scene = Scene::new();
        let face = scene.add_root(
            SceneNode::new(Some("face".into()))
                .with_translation(Vector3::new(3.0, 1.0, 0.0))
                .with_mesh(Mesh::cuboid(5.0, 0.2, 5.0)),
        );
        for (name, length) in [("hour_hand", 2.0), ("minute_hand", 3.0), ("second_hand", 4.0)] {
            scene.add_child(
                face,
                SceneNode::new(Some(name.into()))
                    .with_translation(Vector3::new(0.0, 0.3, 0.0))
                    .with_mesh(Mesh::cuboid(0.1, 0.05, length / 2.0)),
            );
        }
        scene
    }

    fn controls(x: f64, y: f64, z: f64, clock: f64) -> ControlState {
        ControlState {
            rotation_x: x,
            rotation_y: y,
            rotation_z: z,
            clock_speed: clock,
            ..ControlState::default()
        }
    }

    #[test]
    fn test_hand_angles_accumulate_linearly() {
        let mut model = ClockModel::from_scene(clock_scene()).unwrap();
        let controls = controls(0.0, 0.0, 0.0, 40.0);

        for n in 1..=500u32 {
            model.advance(&controls);
            for hand in ClockHand::ALL {
                let expected = n as f64 * hand.rate() * 0.4;
                let actual = model.hand_angle(hand);
                assert!(
                    (actual - expected).abs() <= 1e-12 + expected * 1e-9,
                    "{hand:?} after {n} frames: {actual} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn test_hand_rates_follow_clock_gearing() {
        let minute_per_hour = MINUTE_HAND_RATE / HOUR_HAND_RATE;
        let second_per_hour = SECOND_HAND_RATE / HOUR_HAND_RATE;
        let second_per_minute = SECOND_HAND_RATE / MINUTE_HAND_RATE;

        assert!((minute_per_hour - 60.0).abs() < 1e-6);
        assert!((second_per_hour - 3600.0).abs() < 1e-5);
        assert!((second_per_minute - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_root_rotation_per_axis() {
        let mut model = ClockModel::from_scene(clock_scene()).unwrap();
        let controls = controls(100.0, 50.0, 0.0, 0.0);

        for _ in 0..10 {
            model.advance(&controls);
        }

        let rotation = model.root_rotation();
        assert!((rotation.x - 0.1).abs() < 1e-12);
        assert!((rotation.y - 0.05).abs() < 1e-12);
        assert_eq!(rotation.z, 0.0);
        for hand in ClockHand::ALL {
            assert_eq!(model.hand_angle(hand), 0.0);
        }
    }

    #[test]
    fn test_hand_angles_never_decrease() {
        let mut model = ClockModel::from_scene(clock_scene()).unwrap();
        let mut controls = controls(0.0, 0.0, 0.0, 0.0);
        let mut previous = [0.0; 3];

        for speed in [0.0, 100.0, 3.0, 0.0, 75.5] {
            controls.clock_speed = speed;
            model.advance(&controls);
            for hand in ClockHand::ALL {
                let angle = model.hand_angle(hand);
                assert!(angle >= previous[hand.index()]);
                previous[hand.index()] = angle;
            }
        }
    }

    #[test]
    fn test_model_is_centred() {
        let model = ClockModel::from_scene(clock_scene()).unwrap();
        let center = model.scene().bounds().center();
        assert!((center - Point3::origin()).norm() < 1e-5, "{center:?}");
    }

    #[test]
    fn test_missing_hand_is_an_error() {
        let mut scene = Scene::new();
        let face = scene.add_root(SceneNode::new(Some("face".into())));
        scene.add_child(face, SceneNode::new(Some("hour_hand".into())));
        scene.add_child(face, SceneNode::new(Some("minute_hand".into())));

        let err = ClockModel::from_scene(scene).unwrap_err();
        assert!(matches!(err, AssetError::MissingNode("second_hand")));
    }

    #[test]
    fn test_empty_scene_is_an_error() {
        let err = ClockModel::from_scene(Scene::new()).unwrap_err();
        assert!(matches!(err, AssetError::NoScene));
    }
}
