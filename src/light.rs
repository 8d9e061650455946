//! The spotlight, its tweakable parameters and the renderer-wide shading state.
//!
//! [`LightParameters`] is the record the debug panel edits. Every edit is a
//! functional merge ([`LightParameters::merge`]) followed by pushing the one
//! changed field onto the live [`SpotLight`] ([`apply_change`]). Nothing else
//! writes to the parameters, so the record and the light never disagree.

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};

use crate::{
    camera::OPENGL_TO_WGPU_MATRIX,
    resources::texture::{TextureHandle, TextureRegistry},
};

pub const AMBIENT_INTENSITY: f32 = 0.15;
pub const INITIAL_POSITION: [f32; 3] = [2.5, 5.0, 2.5];
pub const DEFAULT_MAP: &str = "disturb.jpg";
pub const SHADOW_MAP_SIZE: u32 = 1024;

// SpotLightHelper and shadow camera fall back to these when `distance` is 0 (infinite).
const UNBOUNDED_CONE_LENGTH: f32 = 1000.0;
const UNBOUNDED_SHADOW_FAR: f32 = 500.0;
const SHADOW_NEAR: f32 = 0.5;

/// The record edited by the debug panel.
#[derive(Clone, Debug, PartialEq)]
pub struct LightParameters {
    /// Registry key of the projected texture, `"none"` for no gobo.
    pub map: String,
    /// Packed `0xRRGGBB`.
    pub color: u32,
    pub intensity: f32,
    pub distance: f32,
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub focus: f32,
    pub shadows: bool,
}

impl Default for LightParameters {
    fn default() -> Self {
        Self {
            map: DEFAULT_MAP.to_string(),
            color: 0xffffff,
            intensity: 100.0,
            distance: 0.0,
            angle: PI / 6.0,
            penumbra: 1.0,
            decay: 2.0,
            focus: 1.0,
            shadows: true,
        }
    }
}

/// One edited field, as emitted by a panel control.
#[derive(Clone, Debug, PartialEq)]
pub enum LightParam {
    Map(String),
    Color(u32),
    Intensity(f32),
    Distance(f32),
    Angle(f32),
    Penumbra(f32),
    Decay(f32),
    Focus(f32),
    Shadows(bool),
}

impl LightParameters {
    /// Returns a new record with exactly the field named by `change` replaced.
    pub fn merge(&self, change: &LightParam) -> Self {
        let mut next = self.clone();
        match change {
            LightParam::Map(name) => next.map = name.clone(),
            LightParam::Color(hex) => next.color = *hex,
            LightParam::Intensity(v) => next.intensity = *v,
            LightParam::Distance(v) => next.distance = *v,
            LightParam::Angle(v) => next.angle = *v,
            LightParam::Penumbra(v) => next.penumbra = *v,
            LightParam::Decay(v) => next.decay = *v,
            LightParam::Focus(v) => next.focus = *v,
            LightParam::Shadows(on) => next.shadows = *on,
        }
        next
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightShadow {
    /// Scales the shadow camera's field of view relative to the cone.
    pub focus: f32,
    pub bias: f32,
    pub map_size: u32,
}

impl Default for LightShadow {
    fn default() -> Self {
        Self {
            focus: 1.0,
            bias: 0.0005,
            map_size: SHADOW_MAP_SIZE,
        }
    }
}

/// The live light object the renderer reads every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub color: u32,
    pub intensity: f32,
    pub distance: f32,
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub shadow: LightShadow,
    pub map: Option<TextureHandle>,
    pub cast_shadow: bool,
}

impl SpotLight {
    pub fn new() -> Self {
        let params = LightParameters::default();
        Self {
            position: INITIAL_POSITION.into(),
            target: Point3::origin(),
            color: params.color,
            intensity: params.intensity,
            distance: params.distance,
            angle: params.angle,
            penumbra: params.penumbra,
            decay: params.decay,
            shadow: LightShadow {
                focus: params.focus,
                ..Default::default()
            },
            // assigned once the texture registry is known
            map: None,
            cast_shadow: true,
        }
    }

    pub fn direction(&self) -> Vector3<f32> {
        let dir = self.target - self.position;
        if dir.magnitude2() <= f32::EPSILON {
            -Vector3::unit_y()
        } else {
            dir.normalize()
        }
    }

    pub fn color_linear(&self) -> [f32; 3] {
        linear_rgb(self.color)
    }

    pub fn cone_cos(&self) -> f32 {
        self.angle.cos()
    }

    pub fn penumbra_cos(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra)).cos()
    }

    /// Length of the visualised cone: the cut-off distance, or a long ray when unbounded.
    pub fn cone_length(&self) -> f32 {
        if self.distance > 0.0 {
            self.distance
        } else {
            UNBOUNDED_CONE_LENGTH
        }
    }

    /// View-projection of the shadow camera. The projected gobo uses the same frustum.
    pub fn shadow_view_proj(&self) -> Matrix4<f32> {
        let direction = self.direction();
        let up = if direction.y.abs() > 0.999 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        let view = Matrix4::look_at_rh(self.position, self.position + direction, up);
        let fov = (2.0 * self.angle * self.shadow.focus).clamp(1.0f32.to_radians(), PI - 0.01);
        let far = if self.distance > 0.0 {
            self.distance
        } else {
            UNBOUNDED_SHADOW_FAR
        };
        let proj = cgmath::perspective(cgmath::Rad(fov), 1.0, SHADOW_NEAR, far.max(SHADOW_NEAR + 0.1));
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct LambertMaterial {
    pub name: String,
    pub color: u32,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Set whenever the shading inputs change; cleared once the GPU copy is rewritten.
    pub needs_update: bool,
}

impl LambertMaterial {
    pub fn new(name: &str, color: u32, cast_shadow: bool, receive_shadow: bool) -> Self {
        Self {
            name: name.to_string(),
            color,
            cast_shadow,
            receive_shadow,
            needs_update: true,
        }
    }
}

/// Renderer-wide shading state: the shadow-map switch and every material in the scene.
#[derive(Debug)]
pub struct Shading {
    pub shadow_map_enabled: bool,
    materials: Vec<LambertMaterial>,
}

impl Shading {
    pub fn new(shadow_map_enabled: bool) -> Self {
        Self {
            shadow_map_enabled,
            materials: Vec::new(),
        }
    }

    pub fn add_material(&mut self, material: LambertMaterial) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&LambertMaterial> {
        self.materials.get(id.0)
    }

    pub fn materials(&self) -> &[LambertMaterial] {
        &self.materials
    }

    /// Switching the shadow map changes how every material shades, so all of them are flagged.
    pub fn set_shadow_map_enabled(&mut self, enabled: bool) {
        self.shadow_map_enabled = enabled;
        self.materials
            .iter_mut()
            .for_each(|material| material.needs_update = true);
    }

    pub fn receives_shadow(&self, id: MaterialId) -> bool {
        self.shadow_map_enabled && self.material(id).is_some_and(|m| m.receive_shadow)
    }

    pub fn casts_shadow(&self, id: MaterialId) -> bool {
        self.shadow_map_enabled && self.material(id).is_some_and(|m| m.cast_shadow)
    }

    /// Drains the update flags and returns the materials that have to be re-uploaded.
    pub fn take_material_updates(&mut self) -> Vec<MaterialId> {
        self.materials
            .iter_mut()
            .enumerate()
            .filter(|(_, material)| material.needs_update)
            .map(|(idx, material)| {
                material.needs_update = false;
                MaterialId(idx)
            })
            .collect()
    }
}

impl Default for Shading {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Pushes every field of `params` onto the live light and the renderer.
pub fn apply_to_light(
    light: &mut SpotLight,
    params: &LightParameters,
    textures: &TextureRegistry,
    shading: &mut Shading,
) {
    light.map = textures.get(&params.map);
    light.color = params.color;
    light.intensity = params.intensity;
    light.distance = params.distance;
    light.angle = params.angle;
    light.penumbra = params.penumbra;
    light.decay = params.decay;
    light.shadow.focus = params.focus;
    light.cast_shadow = params.shadows;
    shading.set_shadow_map_enabled(params.shadows);
}

/// Pushes a single edited field onto the live light.
pub fn apply_change(
    light: &mut SpotLight,
    change: &LightParam,
    textures: &TextureRegistry,
    shading: &mut Shading,
) {
    match change {
        LightParam::Map(name) => light.map = textures.get(name),
        LightParam::Color(hex) => light.color = *hex,
        LightParam::Intensity(v) => light.intensity = *v,
        LightParam::Distance(v) => light.distance = *v,
        LightParam::Angle(v) => light.angle = *v,
        LightParam::Penumbra(v) => light.penumbra = *v,
        LightParam::Decay(v) => light.decay = *v,
        LightParam::Focus(v) => light.shadow.focus = *v,
        LightParam::Shadows(on) => {
            light.cast_shadow = *on;
            shading.set_shadow_map_enabled(*on);
        }
    }
}

/// Owner of the single [`LightParameters`] record.
#[derive(Debug, Default)]
pub struct LightController {
    params: LightParameters,
}

impl LightController {
    pub fn new(params: LightParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LightParameters {
        &self.params
    }

    pub fn handle(
        &mut self,
        change: LightParam,
        light: &mut SpotLight,
        textures: &TextureRegistry,
        shading: &mut Shading,
    ) {
        log::debug!("light parameter changed: {:?}", change);
        self.params = self.params.merge(&change);
        apply_change(light, &change, textures, shading);
    }

    pub fn apply_all(&self, light: &mut SpotLight, textures: &TextureRegistry, shading: &mut Shading) {
        apply_to_light(light, &self.params, textures, shading);
    }
}

/// `0xRRGGBB` (sRGB) to linear RGB.
pub fn linear_rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
