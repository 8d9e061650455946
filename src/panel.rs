//! Debug panel for the spotlight.
//!
//! [`DebugPanel`] describes one control per [`LightParameters`] field and draws
//! them with egui. It never touches the light itself: every widget edit is
//! validated by [`DebugPanel::edit`] and handed back to the caller as a
//! [`LightParam`], which the scene feeds into the light controller.
//!
//! [`PanelBinder`] owns the panel's lifecycle. It builds the panel once the
//! texture registry is populated and rebuilds it from scratch whenever the
//! registry's key set changes.

use std::f32::consts::PI;

use crate::{
    error::SceneError,
    light::{LightParam, LightParameters},
    resources::texture::{NONE, TextureRegistry},
};

pub const PANEL_TITLE: &str = "Spotlight";

pub const INTENSITY_RANGE: (f32, f32) = (0.0, 500.0);
pub const DISTANCE_RANGE: (f32, f32) = (0.0, 20.0);
pub const ANGLE_RANGE: (f32, f32) = (0.0, PI / 3.0);
pub const PENUMBRA_RANGE: (f32, f32) = (0.0, 1.0);
pub const DECAY_RANGE: (f32, f32) = (1.0, 2.0);
pub const FOCUS_RANGE: (f32, f32) = (0.0, 1.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Map,
    Color,
    Intensity,
    Distance,
    Angle,
    Penumbra,
    Decay,
    Focus,
    Shadows,
}

impl Field {
    pub fn of(change: &LightParam) -> Self {
        match change {
            LightParam::Map(_) => Field::Map,
            LightParam::Color(_) => Field::Color,
            LightParam::Intensity(_) => Field::Intensity,
            LightParam::Distance(_) => Field::Distance,
            LightParam::Angle(_) => Field::Angle,
            LightParam::Penumbra(_) => Field::Penumbra,
            LightParam::Decay(_) => Field::Decay,
            LightParam::Focus(_) => Field::Focus,
            LightParam::Shadows(_) => Field::Shadows,
        }
    }

    fn float_change(self, value: f32) -> Option<LightParam> {
        match self {
            Field::Intensity => Some(LightParam::Intensity(value)),
            Field::Distance => Some(LightParam::Distance(value)),
            Field::Angle => Some(LightParam::Angle(value)),
            Field::Penumbra => Some(LightParam::Penumbra(value)),
            Field::Decay => Some(LightParam::Decay(value)),
            Field::Focus => Some(LightParam::Focus(value)),
            Field::Map | Field::Color | Field::Shadows => None,
        }
    }

    fn float_value(self, params: &LightParameters) -> Option<f32> {
        match self {
            Field::Intensity => Some(params.intensity),
            Field::Distance => Some(params.distance),
            Field::Angle => Some(params.angle),
            Field::Penumbra => Some(params.penumbra),
            Field::Decay => Some(params.decay),
            Field::Focus => Some(params.focus),
            Field::Map | Field::Color | Field::Shadows => None,
        }
    }
}

fn float_of(change: &LightParam) -> Option<f32> {
    match change {
        LightParam::Intensity(v)
        | LightParam::Distance(v)
        | LightParam::Angle(v)
        | LightParam::Penumbra(v)
        | LightParam::Decay(v)
        | LightParam::Focus(v) => Some(*v),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControlKind {
    Enum(Vec<String>),
    Color,
    Float { min: f32, max: f32 },
    Bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Control {
    pub field: Field,
    pub label: &'static str,
    pub kind: ControlKind,
}

impl Control {
    fn float(field: Field, label: &'static str, (min, max): (f32, f32)) -> Self {
        Self {
            field,
            label,
            kind: ControlKind::Float { min, max },
        }
    }
}

#[derive(Debug)]
pub struct DebugPanel {
    controls: Vec<Control>,
    /// What the widgets currently show.
    values: LightParameters,
}

impl DebugPanel {
    pub fn new(registry: &TextureRegistry, params: &LightParameters) -> Result<Self, SceneError> {
        if registry.is_empty() {
            return Err(SceneError::PanelInitFailure {
                reason: "no texture options to offer".to_string(),
            });
        }
        let options: Vec<String> = registry.names().map(str::to_string).collect();
        let controls = vec![
            Control {
                field: Field::Map,
                label: "map",
                kind: ControlKind::Enum(options),
            },
            Control {
                field: Field::Color,
                label: "color",
                kind: ControlKind::Color,
            },
            Control::float(Field::Intensity, "intensity", INTENSITY_RANGE),
            Control::float(Field::Distance, "distance", DISTANCE_RANGE),
            Control::float(Field::Angle, "angle", ANGLE_RANGE),
            Control::float(Field::Penumbra, "penumbra", PENUMBRA_RANGE),
            Control::float(Field::Decay, "decay", DECAY_RANGE),
            Control::float(Field::Focus, "focus", FOCUS_RANGE),
            Control {
                field: Field::Shadows,
                label: "shadows",
                kind: ControlKind::Bool,
            },
        ];

        for control in &controls {
            if let (ControlKind::Float { min, max }, Some(value)) =
                (&control.kind, control.field.float_value(params))
            {
                if !value.is_finite() || value < *min || value > *max {
                    return Err(SceneError::PanelInitFailure {
                        reason: format!(
                            "{} = {} lies outside {}..={}",
                            control.label, value, min, max
                        ),
                    });
                }
            }
        }

        let mut values = params.clone();
        if !registry.contains(&values.map) {
            log::warn!("texture {} is not loaded, showing {}", values.map, NONE);
            values.map = NONE.to_string();
        }

        Ok(Self { controls, values })
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, field: Field) -> Option<&Control> {
        self.controls.iter().find(|c| c.field == field)
    }

    pub fn values(&self) -> &LightParameters {
        &self.values
    }

    /// Validates an edit against its control and mirrors it.
    ///
    /// Floats are clamped into range, non-finite floats and unknown texture
    /// names are rejected. Returns the change that should reach the light.
    pub fn edit(&mut self, change: LightParam) -> Option<LightParam> {
        let kind = self.control(Field::of(&change))?.kind.clone();
        let change = match (kind, change) {
            (ControlKind::Enum(options), LightParam::Map(name)) => {
                if !options.contains(&name) {
                    log::warn!("ignoring unknown texture option {}", name);
                    return None;
                }
                LightParam::Map(name)
            }
            (ControlKind::Float { min, max }, change) => {
                let value = float_of(&change).filter(|v| v.is_finite())?;
                Field::of(&change).float_change(value.clamp(min, max))?
            }
            (ControlKind::Color, LightParam::Color(hex)) => LightParam::Color(hex & 0xffffff),
            (_, change) => change,
        };
        self.values = self.values.merge(&change);
        Some(change)
    }

    pub fn select_map(&mut self, name: &str) -> Option<LightParam> {
        self.edit(LightParam::Map(name.to_string()))
    }

    /// Draws the panel and returns the edits made this frame.
    pub fn show(&mut self, ctx: &egui::Context) -> Vec<LightParam> {
        let mut raw = Vec::new();
        let values = &self.values;
        egui::Window::new(PANEL_TITLE)
            .resizable(false)
            .default_pos([12.0, 12.0])
            .show(ctx, |ui| {
                for control in &self.controls {
                    match &control.kind {
                        ControlKind::Enum(options) => {
                            let mut selected = values.map.clone();
                            egui::ComboBox::from_label(control.label)
                                .selected_text(selected.clone())
                                .show_ui(ui, |ui| {
                                    for option in options {
                                        ui.selectable_value(&mut selected, option.clone(), option.as_str());
                                    }
                                });
                            if selected != values.map {
                                raw.push(LightParam::Map(selected));
                            }
                        }
                        ControlKind::Color => {
                            let mut rgb = srgb8(values.color);
                            let changed = ui
                                .horizontal(|ui| {
                                    let response = ui.color_edit_button_srgb(&mut rgb);
                                    ui.label(control.label);
                                    response.changed()
                                })
                                .inner;
                            if changed {
                                raw.push(LightParam::Color(hex(rgb)));
                            }
                        }
                        ControlKind::Float { min, max } => {
                            let Some(mut value) = control.field.float_value(values) else {
                                continue;
                            };
                            let slider = egui::Slider::new(&mut value, *min..=*max).text(control.label);
                            if ui.add(slider).changed() {
                                raw.extend(control.field.float_change(value));
                            }
                        }
                        ControlKind::Bool => {
                            let mut on = values.shadows;
                            if ui.checkbox(&mut on, control.label).changed() {
                                raw.push(LightParam::Shadows(on));
                            }
                        }
                    }
                }
            });
        raw.into_iter().filter_map(|change| self.edit(change)).collect()
    }
}

impl Drop for DebugPanel {
    fn drop(&mut self) {
        log::debug!("debug panel released");
    }
}

fn srgb8(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

fn hex([r, g, b]: [u8; 3]) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

#[derive(Debug, Default)]
enum PanelState {
    #[default]
    Absent,
    Present(DebugPanel),
}

/// Lifecycle of the single debug panel: absent until textures are known, rebuilt
/// whenever the registry's key set changes, absent again after [`unmount`](Self::unmount).
#[derive(Debug, Default)]
pub struct PanelBinder {
    state: PanelState,
    built_for: Option<u64>,
    builds: usize,
}

impl PanelBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, registry: &TextureRegistry, params: &LightParameters) {
        if registry.is_empty() || self.built_for == Some(registry.revision()) {
            return;
        }
        self.teardown();
        self.built_for = Some(registry.revision());
        match DebugPanel::new(registry, params) {
            Ok(panel) => {
                log::debug!("debug panel built with {} texture options", registry.len());
                self.builds += 1;
                self.state = PanelState::Present(panel);
            }
            Err(e) => log::error!("{}", e),
        }
    }

    pub fn unmount(&mut self) {
        self.teardown();
        self.built_for = None;
    }

    fn teardown(&mut self) {
        if let PanelState::Present(panel) = std::mem::take(&mut self.state) {
            drop(panel);
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self.state, PanelState::Present(_))
    }

    pub fn panel(&self) -> Option<&DebugPanel> {
        match &self.state {
            PanelState::Present(panel) => Some(panel),
            PanelState::Absent => None,
        }
    }

    pub fn panel_mut(&mut self) -> Option<&mut DebugPanel> {
        match &mut self.state {
            PanelState::Present(panel) => Some(panel),
            PanelState::Absent => None,
        }
    }

    /// How many panels were constructed so far.
    pub fn builds(&self) -> usize {
        self.builds
    }
}
