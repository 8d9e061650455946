//! Draws tessellated egui output on top of the lit scene.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ScreenUniform {
    size: [f32; 2],
    _padding: [f32; 2],
}

/// Size of the frame the GUI is drawn into.
#[derive(Clone, Copy, Debug)]
pub struct ScreenDescriptor {
    pub size_px: [u32; 2],
    pub pixels_per_point: f32,
}

impl ScreenDescriptor {
    fn size_points(&self) -> [f32; 2] {
        let ppp = self.pixels_per_point.max(0.01);
        [self.size_px[0] as f32 / ppp, self.size_px[1] as f32 / ppp]
    }
}

/// egui's `Vertex` layout: position and uv in points, premultiplied sRGBA colour.
fn vertex_desc() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<egui::epaint::Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Unorm8x4,
            },
        ],
    }
}

fn mk_screen_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        label: Some("GUI screen_bind_group_layout"),
    })
}

fn mk_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("GUI texture_bind_group_layout"),
    })
}

fn mk_gui_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("GUI Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("gui.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("GUI Render Pipeline Layout"),
        bind_group_layouts: layouts,
        immediate_size: 0,
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("GUI Render Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                // egui emits premultiplied alpha
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[derive(Debug)]
struct GuiTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: [u32; 2],
}

/// One draw call: a scissored index range of the frame's shared buffers.
struct DrawCall {
    texture_id: egui::TextureId,
    scissor: [u32; 4],
    indices: std::ops::Range<u32>,
    base_vertex: i32,
}

#[derive(Debug)]
pub struct GuiRenderer {
    pipeline: wgpu::RenderPipeline,
    screen_buffer: wgpu::Buffer,
    screen_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: HashMap<egui::TextureId, GuiTexture>,
}

impl GuiRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let screen_layout = mk_screen_bind_group_layout(device);
        let texture_layout = mk_texture_bind_group_layout(device);
        let pipeline = mk_gui_pipeline(device, format, &[&screen_layout, &texture_layout]);

        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("GUI Screen Buffer"),
            contents: bytemuck::cast_slice(&[ScreenUniform {
                size: [1.0, 1.0],
                _padding: [0.0; 2],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &screen_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
            label: Some("GUI screen_bind_group"),
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("GUI sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            pipeline,
            screen_buffer,
            screen_bind_group,
            texture_layout,
            sampler,
            textures: HashMap::new(),
        }
    }

    /// Uploads new and patched textures. Freed textures are dropped by [`free_textures`](Self::free_textures)
    /// after the frame that may still reference them.
    pub fn update_textures(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        delta: &egui::TexturesDelta,
    ) {
        for (id, image_delta) in &delta.set {
            let (size, pixels) = image_to_rgba8(&image_delta.image);
            if size[0] == 0 || size[1] == 0 {
                continue;
            }
            let origin = match image_delta.pos {
                Some([x, y]) => {
                    let Some(existing) = self.textures.get(id) else {
                        log::warn!("partial update for unknown egui texture {:?}", id);
                        continue;
                    };
                    if x as u32 + size[0] > existing.size[0] || y as u32 + size[1] > existing.size[1] {
                        log::warn!("partial update exceeds egui texture {:?}", id);
                        continue;
                    }
                    wgpu::Origin3d {
                        x: x as u32,
                        y: y as u32,
                        z: 0,
                    }
                }
                None => {
                    let texture = self.create_texture(device, size);
                    self.textures.insert(*id, texture);
                    wgpu::Origin3d::ZERO
                }
            };
            let Some(target) = self.textures.get(id) else {
                continue;
            };
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &target.texture,
                    mip_level: 0,
                    origin,
                },
                &pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size[0]),
                    rows_per_image: Some(size[1]),
                },
                wgpu::Extent3d {
                    width: size[0],
                    height: size[1],
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    pub fn free_textures(&mut self, delta: &egui::TexturesDelta) {
        for id in &delta.free {
            self.textures.remove(id);
        }
    }

    fn create_texture(&self, device: &wgpu::Device, size: [u32; 2]) -> GuiTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("egui texture"),
            size: wgpu::Extent3d {
                width: size[0],
                height: size[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("egui texture_bind_group"),
        });
        GuiTexture {
            texture,
            bind_group,
            size,
        }
    }

    /// Records a pass that draws `primitives` over whatever `view` already holds.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        primitives: &[egui::ClippedPrimitive],
        screen: ScreenDescriptor,
    ) {
        queue.write_buffer(
            &self.screen_buffer,
            0,
            bytemuck::cast_slice(&[ScreenUniform {
                size: screen.size_points(),
                _padding: [0.0; 2],
            }]),
        );

        let mut vertices: Vec<egui::epaint::Vertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut calls = Vec::new();
        for clipped in primitives {
            let egui::epaint::Primitive::Mesh(mesh) = &clipped.primitive else {
                continue;
            };
            if mesh.indices.is_empty() {
                continue;
            }
            let Some(scissor) = scissor_rect(clipped.clip_rect, screen) else {
                continue;
            };
            let first = indices.len() as u32;
            calls.push(DrawCall {
                texture_id: mesh.texture_id,
                scissor,
                indices: first..first + mesh.indices.len() as u32,
                base_vertex: vertices.len() as i32,
            });
            vertices.extend_from_slice(&mesh.vertices);
            indices.extend_from_slice(&mesh.indices);
        }
        if calls.is_empty() {
            return;
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("GUI Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("GUI Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("GUI Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.screen_bind_group, &[]);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for call in calls {
            let Some(texture) = self.textures.get(&call.texture_id) else {
                log::warn!("egui texture {:?} is not uploaded", call.texture_id);
                continue;
            };
            let [x, y, w, h] = call.scissor;
            render_pass.set_scissor_rect(x, y, w, h);
            render_pass.set_bind_group(1, &texture.bind_group, &[]);
            render_pass.draw_indexed(call.indices, call.base_vertex, 0..1);
        }
    }
}

/// Clip rectangle in pixels, clamped to the frame. `None` if nothing is visible.
fn scissor_rect(clip: egui::Rect, screen: ScreenDescriptor) -> Option<[u32; 4]> {
    let ppp = screen.pixels_per_point;
    let [width, height] = screen.size_px;
    let min_x = ((clip.min.x * ppp).round().max(0.0) as u32).min(width);
    let min_y = ((clip.min.y * ppp).round().max(0.0) as u32).min(height);
    let max_x = ((clip.max.x * ppp).round().max(0.0) as u32).min(width);
    let max_y = ((clip.max.y * ppp).round().max(0.0) as u32).min(height);
    if max_x <= min_x || max_y <= min_y {
        return None;
    }
    Some([min_x, min_y, max_x - min_x, max_y - min_y])
}

fn image_to_rgba8(image: &egui::ImageData) -> ([u32; 2], Vec<u8>) {
    let size = [image.width() as u32, image.height() as u32];
    let pixels = match image {
        egui::ImageData::Color(image) => image
            .pixels
            .iter()
            .flat_map(|pixel| pixel.to_array())
            .collect(),
        egui::ImageData::Font(image) => image
            .srgba_pixels(None)
            .flat_map(|pixel| pixel.to_array())
            .collect(),
    };
    (size, pixels)
}
