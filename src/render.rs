//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn with a [`Render`] value. The engine
//! flattens it into one batch per pipeline: lit instanced models (a subset of
//! which also goes through the shadow pass) and helper line lists.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (model + instance buffer)
//! - [`Lines<'a>`] contains an unlit line list drawn in world space

use crate::data_structures::model::Model;

/// Data for instanced object rendering: a model and its instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
    /// Whether the model is drawn into the spotlight's shadow map.
    pub cast_shadow: bool,
}

/// A line list with per-vertex colour, see [`crate::helper::LineVertex`].
pub struct Lines<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub count: u32,
}

/// Specifies how a flow should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Defaults(Vec<Instanced>)` renders a batch of lit instanced objects
/// - `Lines(Lines)` renders unlit helper geometry
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
pub enum Render<'a> {
    None,
    Defaults(Vec<Instanced<'a>>),
    Lines(Lines<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>, lines: &mut Vec<Lines<'a>>) {
        match self {
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Lines(line_list) => lines.push(line_list),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, lines)),
            Render::None => (),
        }
    }
}

impl Default for Render<'_> {
    fn default() -> Self {
        Render::None
    }
}
