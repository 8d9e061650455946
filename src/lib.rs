//! flow-spotlight
//!
//! A spotlight scene on a small wgpu flow engine: a textured, shadow-casting
//! spotlight orbits the Lucy scan while a debug panel edits the light live and
//! an orbit camera looks on.
//!
//! High-level modules
//! - `animation`: wall-clock orbit of the light
//! - `camera`: orbit camera, controller and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (meshes, instances, textures)
//! - `error`: recoverable scene errors
//! - `flow`: high level flow control (scenes / update loops)
//! - `gui`: egui integration (input, tessellation, drawing)
//! - `helper`: wireframe cone that follows the spotlight
//! - `light`: spotlight parameters, controller and shading state
//! - `panel`: debug panel bound to the light parameters
//! - `pipelines`: definitions for the render pipelines (basic, shadow, lines, gui)
//! - `resources`: helpers to load textures and meshes from `./assets/`
//! - `render`: render composition for efficient pipeline reuse
//! - `scene`: the spotlight scene flow and its state
//!

pub mod animation;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod gui;
pub mod helper;
pub mod light;
pub mod panel;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use error::SceneError;
pub use scene::{SceneEvent, SceneState, SpotlightScene};
