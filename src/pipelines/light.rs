//! GPU side of the spotlight: its uniform, the projected texture and the shadow map.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::Texture,
    light::{AMBIENT_INTENSITY, SHADOW_MAP_SIZE, SpotLight},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightUniform {
    view_proj: [[f32; 4]; 4],
    position: [f32; 3],
    // 0 for unbounded
    range: f32,
    direction: [f32; 3],
    decay: f32,
    color: [f32; 3],
    intensity: f32,
    cone_cos: f32,
    penumbra_cos: f32,
    shadow_enabled: u32,
    has_map: u32,
    ambient: [f32; 3],
    shadow_bias: f32,
}

impl SpotLightUniform {
    pub fn from_light(light: &SpotLight, shadows_enabled: bool) -> Self {
        Self {
            view_proj: light.shadow_view_proj().into(),
            position: light.position.into(),
            range: light.distance,
            direction: light.direction().into(),
            decay: light.decay,
            color: light.color_linear(),
            intensity: light.intensity,
            cone_cos: light.cone_cos(),
            penumbra_cos: light.penumbra_cos(),
            shadow_enabled: (shadows_enabled && light.cast_shadow) as u32,
            has_map: light.map.is_some() as u32,
            ambient: [AMBIENT_INTENSITY; 3],
            shadow_bias: light.shadow.bias,
        }
    }

    pub fn shadow_enabled(&self) -> bool {
        self.shadow_enabled == 1
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("light_bind_group_layout"),
    })
}

/// The shadow pass only needs the light's view-projection.
pub fn mk_shadow_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("shadow_bind_group_layout"),
    })
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: SpotLightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    pub shadow_bind_group_layout: wgpu::BindGroupLayout,
    pub shadow_bind_group: wgpu::BindGroup,
    pub shadow_map: Texture,
    white: Texture,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, light: &SpotLight) -> Self {
        let uniform = SpotLightUniform::from_light(light, true);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Spot Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let shadow_bind_group_layout = mk_shadow_bind_group_layout(device);
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shadow_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("shadow_bind_group"),
        });
        let shadow_map = Texture::create_shadow_map(device, SHADOW_MAP_SIZE);
        let white = Texture::create_white(device, queue);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer, &white, &shadow_map);

        Self {
            uniform,
            buffer,
            bind_group_layout,
            bind_group,
            shadow_bind_group_layout,
            shadow_bind_group,
            shadow_map,
            white,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, uniform: SpotLightUniform) {
        self.uniform = uniform;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    /// Rebinds the projected texture. `None` binds a white texture, which the shader ignores.
    pub fn bind_map(&mut self, device: &wgpu::Device, map: Option<&Texture>) {
        let map = map.unwrap_or(&self.white);
        self.bind_group = mk_bind_group(
            device,
            &self.bind_group_layout,
            &self.buffer,
            map,
            &self.shadow_map,
        );
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    map: &Texture,
    shadow_map: &Texture,
) -> wgpu::BindGroup {
    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        },
        wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::TextureView(&map.view),
        },
        wgpu::BindGroupEntry {
            binding: 3,
            resource: wgpu::BindingResource::TextureView(&shadow_map.view),
        },
    ];
    if let Some(sampler) = map.sampler.as_ref() {
        entries.push(wgpu::BindGroupEntry {
            binding: 2,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
    }
    if let Some(sampler) = shadow_map.sampler.as_ref() {
        entries.push(wgpu::BindGroupEntry {
            binding: 4,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
    }
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some("light_bind_group"),
    })
}
