//! The spotlight scene: a ground plane, the Lucy statue and an orbiting textured spotlight.
//!
//! [`SceneState`] is everything the scene logic mutates. It holds no GPU handles, so
//! every transition (texture registry ready, panel edit, animation frame, mesh
//! arrival) can be driven without a window. [`SpotlightScene`] is the flow that
//! owns the GPU side and mirrors the state into buffers once per frame.

use std::{
    f32::consts::FRAC_PI_2,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use cgmath::Vector3;
use instant::Duration;
use wgpu::util::DeviceExt;

use crate::{
    animation::AnimationDriver,
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        model::{Material, MaterialUniform, Mesh, Model},
        texture::Texture,
    },
    error::SceneError,
    flow::{FlowConstructor, GraphicsFlow, Out},
    helper::SpotLightHelper,
    light::{LambertMaterial, LightController, LightParam, MaterialId, Shading, SpotLight},
    panel::PanelBinder,
    pipelines::light::SpotLightUniform,
    render::{Instanced, Lines, Render},
    resources::{
        LUCY_PATH, LUCY_SCALE, MeshData, NONE, TEXTURE_DIR, TEXTURE_FILES, TextureHandle,
        TextureRegistry, load_ply, load_texture,
    },
};

pub const PLANE_SIZE: f32 = 200.0;
pub const PLANE_Y: f32 = -1.0;
pub const PLANE_COLOR: u32 = 0xbcbcbc;
pub const LUCY_POSITION: [f32; 3] = [0.0, 0.8, 0.0];
pub const LUCY_COLOR: u32 = 0xffffff;

/// Materials are registered in this order by [`SceneState::new`].
pub const PLANE_MATERIAL: MaterialId = MaterialId(0);
pub const LUCY_MATERIAL: MaterialId = MaterialId(1);

/// Cancellation flag shared between a load request and its completion handler.
#[derive(Clone, Debug, Default)]
pub struct LoadToken(Arc<AtomicBool>);

impl LoadToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Results of background loads, delivered through `on_custom_events`.
#[derive(Debug)]
pub enum SceneEvent {
    MeshLoaded {
        token: LoadToken,
        result: Result<MeshData, SceneError>,
    },
    /// The token was cancelled before the load finished.
    LoadAbandoned { path: String },
}

#[derive(Debug)]
pub struct SceneState {
    pub controller: LightController,
    pub light: SpotLight,
    pub shading: Shading,
    pub textures: TextureRegistry,
    pub panel: PanelBinder,
    pub helper: SpotLightHelper,
    pub animation: AnimationDriver,
}

impl SceneState {
    pub fn new() -> Self {
        let light = SpotLight::new();
        let mut shading = Shading::default();
        let plane = shading.add_material(LambertMaterial::new("plane", PLANE_COLOR, false, true));
        let lucy = shading.add_material(LambertMaterial::new("lucy", LUCY_COLOR, true, true));
        debug_assert_eq!((plane, lucy), (PLANE_MATERIAL, LUCY_MATERIAL));
        Self {
            controller: LightController::default(),
            helper: SpotLightHelper::new(&light),
            light,
            shading,
            textures: TextureRegistry::new(),
            panel: PanelBinder::new(),
            animation: AnimationDriver::new(),
        }
    }

    /// Installs the registry of loaded textures, pushes the full parameter record onto
    /// the light and builds the panel.
    ///
    /// A map that did not load is replaced by `"none"` in the record as well.
    pub fn textures_ready(&mut self, registry: TextureRegistry) {
        self.textures = registry;
        self.controller
            .apply_all(&mut self.light, &self.textures, &mut self.shading);
        if !self.textures.contains(&self.controller.params().map) {
            log::warn!(
                "texture {} is not loaded, starting without a map",
                self.controller.params().map
            );
            self.controller.handle(
                LightParam::Map(NONE.to_string()),
                &mut self.light,
                &self.textures,
                &mut self.shading,
            );
        }
        self.helper.update(&self.light);
        self.panel.sync(&self.textures, self.controller.params());
    }

    pub fn handle_panel_change(&mut self, change: LightParam) {
        self.controller
            .handle(change, &mut self.light, &self.textures, &mut self.shading);
        self.helper.update(&self.light);
    }

    /// Draws the panel, if there is one, and applies this frame's edits.
    pub fn show_panel(&mut self, gui: &egui::Context) {
        let edits = self
            .panel
            .panel_mut()
            .map(|panel| panel.show(gui))
            .unwrap_or_default();
        edits
            .into_iter()
            .for_each(|change| self.handle_panel_change(change));
    }

    pub fn frame(&mut self) {
        self.animation.frame(&mut self.light, &mut self.helper);
    }

    pub fn frame_at(&mut self, elapsed_ms: f64) {
        AnimationDriver::frame_at(elapsed_ms, &mut self.light, &mut self.helper);
    }

    /// Filters a finished mesh load: cancelled tokens and failures yield `None`.
    pub fn accept_mesh(
        &self,
        token: &LoadToken,
        result: Result<MeshData, SceneError>,
    ) -> Option<MeshData> {
        if token.is_cancelled() {
            log::debug!("dropping mesh load result, the scene is gone");
            return None;
        }
        match result {
            Ok(mesh) => Some(mesh),
            Err(e) => {
                log::error!("{}, rendering without the mesh", e);
                None
            }
        }
    }

    /// The light as the GPU sees it, with the renderer's shadow switch applied.
    pub fn light_uniform(&self) -> SpotLightUniform {
        SpotLightUniform::from_light(&self.light, self.shading.shadow_map_enabled)
    }

    pub fn material_uniform(&self, id: MaterialId) -> MaterialUniform {
        let color = self.shading.material(id).map_or(0xffffff, |m| m.color);
        MaterialUniform::new(color, self.shading.receives_shadow(id))
    }

    pub fn unmount(&mut self) {
        self.panel.unmount();
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads, decodes, scales and shades the Lucy mesh, checking `token` between steps.
pub async fn load_lucy(token: LoadToken) -> SceneEvent {
    let abandoned = || SceneEvent::LoadAbandoned {
        path: LUCY_PATH.to_string(),
    };
    if token.is_cancelled() {
        return abandoned();
    }
    let result = match load_ply(LUCY_PATH).await {
        Ok(mesh) => {
            if token.is_cancelled() {
                return abandoned();
            }
            tokio::task::spawn_blocking(move || prepare_mesh(mesh))
                .await
                .map_err(|e| SceneError::decode(LUCY_PATH, e))
        }
        Err(e) => Err(e),
    };
    SceneEvent::MeshLoaded { token, result }
}

pub fn prepare_mesh(mut mesh: MeshData) -> MeshData {
    mesh.scale(LUCY_SCALE);
    mesh.compute_vertex_normals();
    mesh
}

#[derive(Debug)]
struct Placed {
    model: Model,
    instance: wgpu::Buffer,
    material: MaterialId,
}

impl Placed {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        name: &str,
        data: &MeshData,
        instance: Instance,
        material: MaterialId,
        uniform: MaterialUniform,
    ) -> Self {
        let model = Model {
            meshes: vec![Mesh::from_data(device, name, data)],
            material: Material::new(device, layout, name, uniform),
        };
        Self {
            model,
            instance: instance.buffer(device, &format!("{} Instance Buffer", name)),
            material,
        }
    }

    fn instanced<'a>(&'a self, state: &SceneState) -> Instanced<'a> {
        Instanced {
            instance: &self.instance,
            model: &self.model,
            amount: 1,
            cast_shadow: state.shading.casts_shadow(self.material),
        }
    }
}

pub struct SpotlightScene {
    textures: Vec<Texture>,
    registry: TextureRegistry,
    plane: Placed,
    lucy: Option<Placed>,
    helper_buffer: wgpu::Buffer,
    /// The map bound to the light on the GPU; `None` until the first upload.
    bound_map: Option<Option<TextureHandle>>,
    token: LoadToken,
}

impl SpotlightScene {
    pub async fn new(init: InitContext) -> Self {
        let device = &init.device;
        let queue = &init.queue;
        let loads = TEXTURE_FILES.iter().map(|name| async move {
            let path = format!("{}/{}", TEXTURE_DIR, name);
            (*name, load_texture(&path, device, queue).await)
        });

        let mut textures = Vec::new();
        let mut loaded = Vec::new();
        for (name, result) in futures::future::join_all(loads).await {
            match result {
                Ok(texture) => {
                    log::info!("loaded texture {}", name);
                    loaded.push((name, TextureHandle(textures.len())));
                    textures.push(texture);
                }
                Err(e) => log::error!("{}", e),
            }
        }
        let registry = TextureRegistry::from_loaded(loaded);

        let plane = Placed::new(
            device,
            &init.material_layout,
            "plane",
            &MeshData::plane(PLANE_SIZE, PLANE_SIZE),
            Instance::with_rotation(
                Vector3::new(0.0, PLANE_Y, 0.0),
                Vector3::unit_x(),
                cgmath::Rad(-FRAC_PI_2),
            ),
            PLANE_MATERIAL,
            MaterialUniform::new(PLANE_COLOR, true),
        );
        // rewritten by the first on_update
        let helper = SpotLightHelper::new(&SpotLight::new());
        let helper_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Spot Light Helper Buffer"),
            contents: bytemuck::cast_slice(helper.vertices()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            textures,
            registry,
            plane,
            lucy: None,
            helper_buffer,
            bound_map: None,
            token: LoadToken::new(),
        }
    }

    fn placed_mut(&mut self, id: MaterialId) -> Option<&mut Placed> {
        std::iter::once(&mut self.plane)
            .chain(self.lucy.as_mut())
            .find(|placed| placed.material == id)
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for SpotlightScene {
    fn on_init(&mut self, _ctx: &mut Context, state: &mut SceneState) -> Out<SceneEvent> {
        state.textures_ready(self.registry.clone());
        let load: Pin<Box<dyn Future<Output = SceneEvent> + Send>> =
            Box::pin(load_lucy(self.token.clone()));
        Out::FutEvent(vec![load])
    }

    fn on_update(&mut self, ctx: &Context, state: &mut SceneState, _dt: Duration) -> Out<SceneEvent> {
        state.frame();

        for id in state.shading.take_material_updates() {
            let uniform = state.material_uniform(id);
            if let Some(placed) = self.placed_mut(id) {
                placed.model.material.write(&ctx.queue, uniform);
            }
        }
        ctx.queue.write_buffer(
            &self.helper_buffer,
            0,
            bytemuck::cast_slice(state.helper.vertices()),
        );

        let uniform = state.light_uniform();
        let map = state.light.map;
        let rebind = (self.bound_map != Some(map))
            .then(|| map.and_then(|handle| self.textures.get(handle.0).cloned()));
        self.bound_map = Some(map);
        Out::Configure(Box::new(move |ctx: &mut Context| {
            ctx.light.update(&ctx.queue, uniform);
            if let Some(map) = rebind {
                ctx.light.bind_map(&ctx.device, map.as_ref());
            }
        }))
    }

    fn on_custom_events(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        event: SceneEvent,
    ) -> Option<SceneEvent> {
        match event {
            SceneEvent::MeshLoaded { token, result } => {
                if self.lucy.is_some() {
                    log::warn!("{} is already in the scene", LUCY_PATH);
                    return None;
                }
                let mesh = state.accept_mesh(&token, result)?;
                self.lucy = Some(Placed::new(
                    &ctx.device,
                    &ctx.material_layout,
                    "lucy",
                    &mesh,
                    Instance::with_rotation(
                        LUCY_POSITION.into(),
                        Vector3::unit_y(),
                        cgmath::Rad(-FRAC_PI_2),
                    ),
                    LUCY_MATERIAL,
                    state.material_uniform(LUCY_MATERIAL),
                ));
                None
            }
            SceneEvent::LoadAbandoned { path } => {
                log::debug!("load of {} abandoned", path);
                None
            }
        }
    }

    fn on_gui(&mut self, gui: &egui::Context, state: &mut SceneState) -> Out<SceneEvent> {
        state.show_panel(gui);
        Out::Empty
    }

    fn on_render<'a>(&'a self, state: &'a SceneState) -> Render<'a> {
        let mut models = vec![self.plane.instanced(state)];
        models.extend(self.lucy.as_ref().map(|lucy| lucy.instanced(state)));
        Render::Composed(vec![
            Render::Defaults(models),
            Render::Lines(Lines {
                vertex: &self.helper_buffer,
                count: state.helper.vertices().len() as u32,
            }),
        ])
    }

    fn on_exit(&mut self, state: &mut SceneState) {
        state.unmount();
        self.token.cancel();
    }
}

impl Drop for SpotlightScene {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub fn constructor() -> FlowConstructor<SceneState, SceneEvent> {
    Box::new(|init| {
        Box::pin(async move {
            Box::new(SpotlightScene::new(init).await) as Box<dyn GraphicsFlow<_, _>>
        })
    })
}
