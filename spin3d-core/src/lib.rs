/// Spin3D Core Library - Shared scene, animation and render-pass logic
///
/// This library holds everything that does not depend on where the scene is
/// displayed: geometry generators, transforms, the camera, pointer routing,
/// the parameter store, the animated primitives and the fault boundary.
/// Frontends (terminal, web) only rasterize the draw list and feed input.

pub mod boundary;
pub mod color;
pub mod config;
pub mod controls;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod lighting;
pub mod material;
pub mod node;
pub mod params;
pub mod pointer;
pub mod primitives;
pub mod projection;
pub mod raycast;
pub mod render;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use boundary::{BoundaryState, FaultBoundary, Rendered, FALLBACK_MESSAGE};
pub use color::Color;
pub use config::ViewerConfig;
pub use error::{ColorError, ConfigError, ParamError, RenderError};
pub use frame::{FrameClock, FrameTick};
pub use geometry::{Mesh, Triangle, Vertex};
pub use params::{ParamDescriptor, ParamKind, ParamValue, ParameterStore};
pub use projection::{Camera, ScreenPoint};
pub use render::{DrawLine, DrawList, DrawTriangle};
pub use scene::Scene;
pub use transform::{RotationState, Transform};
