//! egui integration: input from winit, tessellated output for [`GuiRenderer`].

use winit::{event::WindowEvent, window::Window};

use crate::pipelines::gui::{GuiRenderer, ScreenDescriptor};

/// Everything the renderer needs from one egui pass.
pub struct GuiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen: ScreenDescriptor,
}

pub struct GuiHost {
    context: egui::Context,
    winit_state: egui_winit::State,
    pub renderer: GuiRenderer,
}

impl std::fmt::Debug for GuiHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuiHost")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl GuiHost {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let context = egui::Context::default();
        let winit_state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        Self {
            context,
            winit_state,
            renderer: GuiRenderer::new(device, format),
        }
    }

    /// Feeds the event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    pub fn run<F>(&mut self, window: &Window, run_ui: F) -> GuiFrame
    where
        F: FnMut(&egui::Context),
    {
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.context.run(raw_input, run_ui);
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.context.tessellate(full_output.shapes, pixels_per_point);
        let size = window.inner_size();

        GuiFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            screen: ScreenDescriptor {
                size_px: [size.width.max(1), size.height.max(1)],
                pixels_per_point,
            },
        }
    }
}
