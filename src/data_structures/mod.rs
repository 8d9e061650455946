//! Engine data structures: models, textures and instances.
//!
//! - `model` contains mesh and Lambert material definitions and their GPU resources
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data

pub mod instance;
pub mod model;
pub mod texture;
