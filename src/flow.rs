//! Flow control and application event loop.
//!
//! A "flow" represents a scene that handles user input, updates its state and
//! provides renderable objects each frame. The engine owns the window, the GPU
//! context and the GUI host, and drives every flow through the hooks of
//! [`GraphicsFlow`].
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S, E>`] is the trait for scenes that handle events and rendering
//! - [`Out<E>`] is the output type for async event handling and context configuration
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Route window events to egui first, then to the camera and the flows
//! 2. Run the GUI and handle each flow's `on_gui` output
//! 3. Update flow state (via `on_update`) and the orbit camera
//! 4. Collect each flow's `on_render` and batch it per pipeline
//! 5. Shadow pass, lit pass, helper lines, GUI overlay
//! 6. Present frame

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::Window,
};

use crate::{
    context::{Context, InitContext, MouseButtonState},
    data_structures::{
        model::{DrawModel, DrawShadow},
        texture::Texture,
    },
    gui::{GuiFrame, GuiHost},
    render::{Instanced, Lines},
};

pub const WINDOW_TITLE: &str = "flow-spotlight";

///
/// This is the Output Type for every lifecycle hook where the user can pass async events.
///
/// `Out::FutEvent` spawns each future on the async runtime. Once a future resolves, its event is
/// put in the event queue and delivered to `on_custom_events`. Until then the frame loop keeps
/// running.
///
/// `Out::Configure` can be used to modify the Context during runtime, for instance to upload
/// uniforms or change the clear colour.
///
/// `Empty` is the default output used when no eventing/futures need to be handled.
///
pub enum Out<E> {
    FutEvent(Vec<Pin<Box<dyn Future<Output = E> + Send>>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl<E> Default for Out<E> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<E> Debug for Out<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FutEvent(futures) => write!(f, "FutEvent({} futures)", futures.len()),
            Self::Configure(_) => f.write_str("Configure(|&mut Context| -> {...})"),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure the context here
/// 2. `on_window_events()` and `on_device_events()` are called for each winit input event
///    that the GUI did not consume
/// 3. `on_gui()` is called every frame while the GUI is built
/// 4. `on_update()` is called every frame, after `on_gui()`
/// 5. `on_custom_events()` is called for resolved [`Out::FutEvent`] futures
/// 6. `on_render()` is called each frame and specifies how to render `self`
/// 7. `on_exit()` is called once when the window closes
///
pub trait GraphicsFlow<S, E> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<E>;

    /// Update state every frame.
    ///
    /// Called every frame with the elapsed time `dt`, after this frame's GUI edits
    /// were applied. Use for animations, other per-frame logic and uploads.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<E>;

    /// Handle raw device events (keyboard, mouse hardware input).
    fn on_device_events(&mut self, _ctx: &Context, _state: &mut S, _event: &DeviceEvent) -> Out<E> {
        Out::Empty
    }

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, _ctx: &Context, _state: &mut S, _event: &WindowEvent) -> Out<E> {
        Out::Empty
    }

    /// Handle custom application events.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;

    /// Build this flow's windows and widgets.
    fn on_gui(&mut self, _gui: &egui::Context, _state: &mut S) -> Out<E> {
        Out::Empty
    }

    /// Return renderable objects for this flow.
    fn on_render<'a>(&'a self, state: &'a S) -> crate::render::Render<'a>;

    /// Release whatever must not outlive the window.
    fn on_exit(&mut self, _state: &mut S) {}
}

impl<S, E> Debug for dyn GraphicsFlow<S, E> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `GraphicsFlow`. This allows resource loading before the first frame.
pub type FlowConstructor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S, E>>>>>>;

/// Application state bundle: GPU context, GUI, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    gui: GuiHost,
    state: State,
    is_surface_configured: bool,
}

impl<State> AppState<State> {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    /// Builds this frame's GUI. Returns `None` while the surface is not configured.
    fn run_gui<Event>(
        &mut self,
        graphics_flows: &mut [Box<dyn GraphicsFlow<State, Event>>],
    ) -> Option<(GuiFrame, Vec<Out<Event>>)> {
        if !self.is_surface_configured {
            return None;
        }
        let mut outs = Vec::new();
        let state = &mut self.state;
        let frame = self.gui.run(&self.ctx.window, |gui_ctx| {
            graphics_flows
                .iter_mut()
                .for_each(|flow| outs.push(flow.on_gui(gui_ctx, state)));
        });
        Some((frame, outs))
    }

    /// Draws one frame with the GUI built by [`AppState::run_gui`].
    fn render<Event>(
        &mut self,
        graphics_flows: &[Box<dyn GraphicsFlow<State, Event>>],
        frame: GuiFrame,
    ) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // egui only sends a texture delta once, so it is applied even if the surface is lost
        self.gui
            .renderer
            .update_textures(&self.ctx.device, &self.ctx.queue, &frame.textures_delta);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

        let mut basics: Vec<Instanced> = Vec::new();
        let mut lines: Vec<Lines> = Vec::new();
        graphics_flows.iter().for_each(|flow| {
            flow.on_render(&self.state)
                .set_pipelines(&mut basics, &mut lines);
        });
        basics.retain(|instanced| {
            let empty = instanced.amount == 0 || instanced.instance.size() == 0;
            if empty {
                log::warn!("you attemted to render something with zero instances");
            }
            !empty
        });

        {
            // The shadow map is always cleared so that sampling it is defined even without casters.
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.light.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if self.ctx.light.uniform.shadow_enabled() {
                shadow_pass.set_pipeline(&self.ctx.pipelines.shadow);
                for instanced in basics.iter().filter(|instanced| instanced.cast_shadow) {
                    shadow_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                    shadow_pass.draw_model_depth(
                        instanced.model,
                        0..instanced.amount as u32,
                        &self.ctx.light.shadow_bind_group,
                    );
                }
            }
        }

        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in &basics {
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }

            render_pass.set_pipeline(&self.ctx.pipelines.lines);
            render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            for line_list in lines.iter().filter(|line_list| line_list.count > 0) {
                render_pass.set_vertex_buffer(0, line_list.vertex.slice(..));
                render_pass.draw(0..line_list.count, 0..1);
            }
        }

        self.gui.renderer.render(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &view,
            &frame.primitives,
            frame.screen,
        );

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        self.gui.renderer.free_textures(&frame.textures_delta);

        Ok(())
    }
}

pub struct App<State: 'static, Event: 'static> {
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent<Event>>,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // This holds the constructors at the start.
    // We use Option to `take()` it after use.
    constructors: Option<Vec<FlowConstructor<State, Event>>>,
    init_error: Option<anyhow::Error>,
    last_time: Instant,
}

impl<State, Event> App<State, Event>
where
    State: 'static,
    Event: 'static,
{
    fn new(
        event_loop: &EventLoop<FlowEvent<Event>>,
        constructors: Vec<FlowConstructor<State, Event>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            async_runtime,
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            init_error: None,
            last_time: Instant::now(),
        })
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            self.graphics_flows
                .iter_mut()
                .for_each(|flow| flow.on_exit(&mut state.state));
        }
        self.graphics_flows.clear();
        event_loop.exit();
    }
}

pub enum FlowEvent<Event: 'static> {
    Custom(Event),
}

impl<Event> Debug for FlowEvent<Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(E)"),
        }
    }
}

impl<State: 'static + Default, Event: Send + 'static> ApplicationHandler<FlowEvent<Event>>
    for App<State, Event>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        let window_attributes = Window::default_attributes().with_title(WINDOW_TITLE);
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.init_error = Some(anyhow::Error::new(e).context("cannot create the window"));
                event_loop.exit();
                return;
            }
        };

        let init_future = async move {
            let ctx = Context::new(window).await?;
            let flow_futures: Vec<_> = constructors
                .into_iter()
                // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
                .map(|constructor| constructor((&ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((ctx, flows))
        };

        let (ctx, flows) = match self.async_runtime.block_on(init_future) {
            Ok(initialized) => initialized,
            Err(e) => {
                log::error!("App initialization failed. Cannot create the main context: {:#}", e);
                self.init_error = Some(e);
                event_loop.exit();
                return;
            }
        };

        let gui = GuiHost::new(&ctx.window, &ctx.device, ctx.config.format);
        let mut app_state = AppState {
            ctx,
            gui,
            state: State::default(),
            is_surface_configured: false,
        };
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);

        self.graphics_flows = flows;
        self.graphics_flows.iter_mut().for_each(|flow| {
            let out = flow.on_init(&mut app_state.ctx, &mut app_state.state);
            handle_flow_output(&self.async_runtime, &mut app_state.ctx, &self.proxy, out);
        });
        app_state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(app_state);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent<Event>) {
        match event {
            FlowEvent::Custom(custom_event) => {
                if let Some(state) = &mut self.state {
                    let result = self
                        .graphics_flows
                        .iter_mut()
                        .fold(Some(custom_event), |event, flow| {
                            flow.on_custom_events(&state.ctx, &mut state.state, event?)
                        });
                    if result.is_some() {
                        log::warn!("Warning! Custom event was not consumed this cycle");
                    }
                }
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.ctx.mouse.pressed == MouseButtonState::Left {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
        self.graphics_flows.iter_mut().for_each(|f| {
            let out = f.on_device_events(&state.ctx, &mut state.state, &event);
            handle_flow_output(&self.async_runtime, &mut state.ctx, &self.proxy, out);
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // the GUI sees every event first; whatever it consumes stops here
        let consumed = state.gui.on_window_event(&state.ctx.window, &event);

        if !consumed {
            state.ctx.camera.controller.handle_window_events(&event);

            self.graphics_flows.iter_mut().for_each(|f| {
                let out = f.on_window_events(&state.ctx, &mut state.state, &event);
                handle_flow_output(&self.async_runtime, &mut state.ctx, &self.proxy, out);
            });
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } if !consumed => self.shutdown(event_loop),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                // GUI edits land in the state before on_update uploads it
                let Some((frame, outs)) = state.run_gui(&mut self.graphics_flows) else {
                    state.ctx.window.request_redraw();
                    return;
                };
                outs.into_iter().for_each(|out| {
                    handle_flow_output(&self.async_runtime, &mut state.ctx, &self.proxy, out)
                });

                self.graphics_flows.iter_mut().for_each(|f| {
                    let out = f.on_update(&state.ctx, &mut state.state, dt);
                    handle_flow_output(&self.async_runtime, &mut state.ctx, &self.proxy, out);
                });
                // Update the camera
                state
                    .ctx
                    .camera
                    .update(&state.ctx.queue, &state.ctx.projection);

                match state.render(&self.graphics_flows, frame) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                state.ctx.mouse.pressed = match (button_state.is_pressed(), consumed) {
                    (true, false) => MouseButtonState::Left,
                    (true, true) => state.ctx.mouse.pressed,
                    (false, _) => MouseButtonState::None,
                };
            }
            _ => {}
        }
    }
}

fn handle_flow_output<Event: Send + 'static>(
    async_runtime: &tokio::runtime::Runtime,
    ctx: &mut Context,
    proxy: &EventLoopProxy<FlowEvent<Event>>,
    out: Out<Event>,
) {
    match out {
        // Resolve in the background and hand the events to winit
        Out::FutEvent(futures) => futures.into_iter().for_each(|future| {
            let proxy = proxy.clone();
            async_runtime.spawn(async move {
                let event = future.await;
                if let Err(err) = proxy.send_event(FlowEvent::Custom(event)) {
                    log::warn!("Event loop was closed before the event could be processed: {}", err);
                }
            });
        }),
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

pub fn run<State: 'static + Default, Event: Send + 'static>(
    constructors: Vec<FlowConstructor<State, Event>>,
) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop: EventLoop<FlowEvent<Event>> = EventLoop::with_user_event().build()?;
    let mut app: App<State, Event> = App::new(&event_loop, constructors)?;

    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
