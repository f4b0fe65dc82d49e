//! Platform-free core of the background scene: page state, palettes,
//! deformation targets and the per-frame interpolation engine.
//!
//! Nothing in here touches the DOM or the GPU. Front-ends implement
//! [`RenderBackend`] and drive a [`SceneView`] once per display refresh.

pub mod camera;
pub mod choreography;
pub mod constants;
pub mod decor;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod layouts;
pub mod noise;
pub mod registry;
pub mod scene;
pub mod smoothing;
pub mod store;
pub mod view;

pub use camera::*;
pub use choreography::*;
pub use constants::*;
pub use decor::*;
pub use engine::*;
pub use error::*;
pub use geometry::*;
pub use layouts::*;
pub use noise::*;
pub use registry::*;
pub use scene::*;
pub use smoothing::*;
pub use store::*;
pub use view::*;

// Shaders bundled as string constants
pub static CORE_WGSL: &str = include_str!("../shaders/core.wgsl");
pub static STARS_WGSL: &str = include_str!("../shaders/stars.wgsl");
pub static STICKS_WGSL: &str = include_str!("../shaders/sticks.wgsl");
pub static OVERLAY_WGSL: &str = include_str!("../shaders/overlay.wgsl");
