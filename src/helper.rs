//! Wireframe cone that visualises the spotlight.

use cgmath::{Quaternion, Vector3};

use crate::light::SpotLight;

pub const CIRCLE_SEGMENTS: usize = 32;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Line-list geometry of a unit cone (apex at the origin, base at z = 1), placed in
/// world space on every [`update`](Self::update).
#[derive(Debug)]
pub struct SpotLightHelper {
    local: Vec<[f32; 3]>,
    vertices: Vec<LineVertex>,
}

impl SpotLightHelper {
    pub fn new(light: &SpotLight) -> Self {
        let mut local = vec![
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            [-1.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 1.0],
            [0.0, 0.0, 0.0],
            [0.0, -1.0, 1.0],
        ];
        for i in 0..CIRCLE_SEGMENTS {
            let p1 = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
            let p2 = (i + 1) as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
            local.push([p1.cos(), p1.sin(), 1.0]);
            local.push([p2.cos(), p2.sin(), 1.0]);
        }
        let mut helper = Self {
            vertices: Vec::with_capacity(local.len()),
            local,
        };
        helper.update(light);
        helper
    }

    /// Re-places the cone at the light's position, pointing at its target, scaled to
    /// the current range and angle and tinted with the light colour.
    pub fn update(&mut self, light: &SpotLight) {
        let length = light.cone_length();
        let width = length * light.angle.tan();
        let rotation =
            Quaternion::from_arc(Vector3::unit_z(), light.direction(), Some(Vector3::unit_y()));
        let color = light.color_linear();
        self.vertices.clear();
        self.vertices.extend(self.local.iter().map(|p| {
            let scaled = Vector3::new(p[0] * width, p[1] * width, p[2] * length);
            LineVertex {
                position: (light.position + rotation * scaled).into(),
                color,
            }
        }));
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn apex(&self) -> [f32; 3] {
        self.vertices[0].position
    }

    /// The end of the axis ray, centre of the cone's base.
    pub fn base_center(&self) -> [f32; 3] {
        self.vertices[1].position
    }
}
