//! Fixelview - fixel field viewer
//!
//! Draws a fixel volume as oriented line segments, either whole or one slice
//! at a time, with keyboard control of the fixel tool settings.

mod systems;

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use fixelview::config::AppConfig;
use fixelview::input::InputMapper;
use fixelview::viewer::{configure_image, ActionOutcome, ViewerState};
use fixelview_core::{phantom, FixelVolume};

use systems::{RenderError, RenderSystem, WindowSystem};

/// Main application state
struct App {
    config: AppConfig,
    volume: FixelVolume,
    volume_name: String,
    window: Option<WindowSystem>,
    render: Option<RenderSystem>,
    state: Option<ViewerState>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let (volume, volume_name) = Self::load_volume(&config);
        Self {
            config,
            volume,
            volume_name,
            window: None,
            render: None,
            state: None,
        }
    }

    /// Configured RON volume, or the crossing-fibre phantom
    fn load_volume(config: &AppConfig) -> (FixelVolume, String) {
        if let Some(path) = &config.fixel.volume {
            match FixelVolume::load(path) {
                Ok(volume) => return (volume, path.clone()),
                Err(e) => log::warn!("Failed to load volume '{}': {}. Using phantom.", path, e),
            }
        }
        let volume = phantom::crossing_fibres(
            config.fixel.phantom_dims,
            config.fixel.phantom_voxel_size,
        );
        (volume, "phantom".to_string())
    }

    fn update_title(&self) {
        if let (Some(window), Some(render), Some(state)) = (&self.window, &self.render, &self.state) {
            window.update_title(&state.describe(render.image()));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match WindowSystem::create(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let mut render = match RenderSystem::new(
            Arc::clone(window.window()),
            &self.volume,
            &self.volume_name,
            self.config.rendering.clone(),
            &self.config.camera,
            self.config.window.vsync,
        ) {
            Ok(render) => render,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let (image, _) = render.parts_mut();
        configure_image(&self.config.fixel, image);
        let state = ViewerState::from_config(&self.config.tool, render.image(), self.config.camera.orbit_step);

        self.window = Some(window);
        self.render = Some(render);
        self.state = Some(state);
        self.update_title();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(render) = &mut self.render {
                    render.resize(physical_size.width, physical_size.height);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key) = event.physical_key else {
                    return;
                };
                let Some(action) = InputMapper::map_keyboard(key, event.state) else {
                    return;
                };
                if let (Some(render), Some(state)) = (&mut self.render, &mut self.state) {
                    let (image, camera) = render.parts_mut();
                    if state.apply(action, image, camera) == ActionOutcome::Exit {
                        event_loop.exit();
                        return;
                    }
                    log::debug!("{:?} -> {}", action, state.describe(image));
                }
                self.update_title();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                let (Some(render), Some(state)) = (&mut self.render, &self.state) else {
                    return;
                };
                match render.render_frame(state) {
                    Ok(()) => {}
                    Err(RenderError::SurfaceLost) => {
                        render.reconfigure();
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                    Err(RenderError::OutOfMemory) => {
                        log::error!("{}", RenderError::OutOfMemory);
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("{}", e),
                }
            }

            _ => {}
        }
    }
}

fn main() {
    let config = AppConfig::load();
    let log_level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });
    log::info!("Starting Fixelview");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
