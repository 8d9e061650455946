//! Render pipelines and the GPU resources they bind.
//!
//! - `basic`: Lambert shading lit by the spotlight, plus the shared pipeline builder
//! - `shadow`: depth-only pass into the spotlight's shadow map
//! - `light`: the spotlight uniform, projected texture and shadow map bindings
//! - `lines`: unlit line lists for helper geometry
//! - `gui`: egui overlay

pub mod basic;
pub mod gui;
pub mod light;
pub mod lines;
pub mod shadow;
