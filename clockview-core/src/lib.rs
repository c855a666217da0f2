/// clockview core library - clock model, controls and per-frame update
///
/// This library holds everything the front ends share: the scene graph and
/// GLTF import, the clock model with its rotation rule, control parsing,
/// camera, orbit controls and the viewer state that ties them together.

pub mod asset;
pub mod clock;
pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod orbit;
pub mod projection;
pub mod scene;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use clock::{ClockHand, ClockModel};
pub use config::ViewerConfig;
pub use controls::{Color, ControlId, ControlState};
pub use error::{AssetError, ControlError};
pub use geometry::{Bounds, Mesh, Triangle, Vertex};
pub use projection::Camera;
pub use scene::{Lighting, Scene, SceneNode};
pub use transform::{RotationState, Transform};
pub use viewer::ViewerState;
