//! Volray - Interactive volume viewer
//!
//! Displays raw 16-bit volume files with a two-pass GPU raycaster.
//! Drag a file onto the window to load it.

use std::path::Path;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use volray_core::{RaycastParams, VolumeData, VolumeDims};
use volray_input::OrbitController;
use volray_render::{Camera, RenderContext, VolumeRenderer};

use volray::config::AppConfig;

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    /// Current compositing parameter state (mutated by the keyboard)
    params: RaycastParams,
    /// The displayed volume; kept CPU-side for the histogram and for
    /// re-upload after device loss
    volume: Option<VolumeData>,
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    renderer: Option<VolumeRenderer>,
    camera: Camera,
    controller: OrbitController,
}

impl App {
    fn new() -> Self {
        // Load configuration
        let config = AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        });

        let camera = Camera::new(config.camera.initial_radius)
            .with_radius_range(config.camera.min_radius, config.camera.max_radius)
            .with_projection(config.camera.fov, config.camera.near, config.camera.far);

        let controller = OrbitController::new()
            .with_orbit_sensitivity(config.input.orbit_sensitivity)
            .with_zoom_speed(config.input.zoom_speed);

        let params = config.rendering.to_params();

        Self {
            config,
            params,
            volume: None,
            window: None,
            render_context: None,
            renderer: None,
            camera,
            controller,
        }
    }

    /// Load a volume file and hand it to the renderer
    ///
    /// The raw format has no header, so the grid shape comes from the
    /// `[volume]` config section. A failed load keeps the previous
    /// volume on screen.
    fn load_volume<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        let dims = VolumeDims::new(
            self.config.volume.width,
            self.config.volume.height,
            self.config.volume.depth,
        );

        match VolumeData::load(path, dims) {
            Ok(volume) => {
                if let (Some(ctx), Some(renderer)) = (&self.render_context, &mut self.renderer) {
                    renderer.set_volume(ctx, &volume);
                }
                self.volume = Some(volume);
                self.camera.reset();
                log::info!(
                    "Loaded volume {:?} ({}x{}x{})",
                    path,
                    dims.width,
                    dims.height,
                    dims.depth
                );
            }
            Err(e) => {
                log::error!("Failed to load volume {:?}: {}", path, e);
            }
        }
    }

    /// Nudge a parameter field and log the new value
    fn adjust(&mut self, label: &str, apply: impl FnOnce(&mut RaycastParams, f32) -> f32) {
        let step = self.config.input.parameter_step;
        let new_value = apply(&mut self.params, step);
        log::info!("{}: {:.2}", label, new_value);
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        match key {
            KeyCode::Escape => {
                event_loop.exit();
            }
            KeyCode::KeyM => {
                self.params.mode = self.params.mode.toggled();
                log::info!("Compositing mode: {:?}", self.params.mode);
            }
            KeyCode::Digit2 => {
                self.params.second_iso_enabled = !self.params.second_iso_enabled;
                log::info!(
                    "Second iso-surface: {}",
                    if self.params.second_iso_enabled { "ON" } else { "OFF" }
                );
            }
            KeyCode::KeyH => {
                self.params.shading_enabled = !self.params.shading_enabled;
                log::info!(
                    "Shading: {}",
                    if self.params.shading_enabled { "ON" } else { "OFF" }
                );
            }
            KeyCode::KeyR => {
                self.camera.reset();
                log::info!("Camera reset");
            }
            KeyCode::KeyG => {
                if let Some(volume) = &self.volume {
                    log::info!(
                        "Density histogram (raw max {}): {:?}",
                        volume.max_value(),
                        volume.histogram(10)
                    );
                } else {
                    log::info!("No volume loaded");
                }
            }
            KeyCode::KeyW => self.adjust("iso 1 value", |p, step| {
                p.iso[0].value = (p.iso[0].value + step).clamp(0.0, 1.0);
                p.iso[0].value
            }),
            KeyCode::KeyS => self.adjust("iso 1 value", |p, step| {
                p.iso[0].value = (p.iso[0].value - step).clamp(0.0, 1.0);
                p.iso[0].value
            }),
            KeyCode::KeyD => self.adjust("iso 1 alpha", |p, step| {
                p.iso[0].alpha = (p.iso[0].alpha + step).clamp(0.0, 1.0);
                p.iso[0].alpha
            }),
            KeyCode::KeyA => self.adjust("iso 1 alpha", |p, step| {
                p.iso[0].alpha = (p.iso[0].alpha - step).clamp(0.0, 1.0);
                p.iso[0].alpha
            }),
            KeyCode::KeyI => self.adjust("iso 2 value", |p, step| {
                p.iso[1].value = (p.iso[1].value + step).clamp(0.0, 1.0);
                p.iso[1].value
            }),
            KeyCode::KeyK => self.adjust("iso 2 value", |p, step| {
                p.iso[1].value = (p.iso[1].value - step).clamp(0.0, 1.0);
                p.iso[1].value
            }),
            KeyCode::KeyL => self.adjust("iso 2 alpha", |p, step| {
                p.iso[1].alpha = (p.iso[1].alpha + step).clamp(0.0, 1.0);
                p.iso[1].alpha
            }),
            KeyCode::KeyJ => self.adjust("iso 2 alpha", |p, step| {
                p.iso[1].alpha = (p.iso[1].alpha - step).clamp(0.0, 1.0);
                p.iso[1].alpha
            }),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title(&self.config.window.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                ));

            let window = Arc::new(
                event_loop
                    .create_window(window_attributes)
                    .expect("Failed to create window"),
            );

            // Create render context and pipelines
            let render_context = pollster::block_on(RenderContext::new(
                window.clone(),
                self.config.window.vsync,
            ));
            let mut renderer = pollster::block_on(VolumeRenderer::new(
                &render_context,
                self.config.rendering.step_count,
            ))
            .expect("Failed to build render pipelines");
            renderer.set_params(&self.params);

            self.window = Some(window);
            self.render_context = Some(render_context);
            self.renderer = Some(renderer);

            // Startup volume, if configured
            if let Some(path) = self.config.volume.path.clone() {
                self.load_volume(path);
            } else {
                log::info!("No startup volume configured - drop a file onto the window");
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(ctx) = &mut self.render_context {
                    ctx.resize(physical_size);
                }
                if let (Some(ctx), Some(renderer)) =
                    (&self.render_context, &mut self.renderer)
                {
                    renderer.resize(ctx, physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state == ElementState::Pressed {
                        self.handle_key(key, event_loop);
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.controller.process_mouse_button(button, state);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.controller.process_scroll(delta);
            }

            WindowEvent::DroppedFile(path) => {
                self.load_volume(path);
            }

            WindowEvent::RedrawRequested => {
                self.controller.update(&mut self.camera);

                if let (Some(ctx), Some(renderer)) =
                    (&mut self.render_context, &mut self.renderer)
                {
                    renderer.set_params(&self.params);

                    let output = match ctx.surface.get_current_texture() {
                        Ok(output) => output,
                        Err(wgpu::SurfaceError::Lost) => {
                            ctx.resize(ctx.size);
                            if let Some(window) = &self.window {
                                window.request_redraw();
                            }
                            return;
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            event_loop.exit();
                            return;
                        }
                        Err(e) => {
                            log::warn!("Surface error: {:?}", e);
                            return;
                        }
                    };

                    let view = output
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());

                    let bg = &self.config.rendering.background_color;
                    renderer.render(
                        ctx,
                        &view,
                        &self.camera,
                        wgpu::Color {
                            r: bg[0] as f64,
                            g: bg[1] as f64,
                            b: bg[2] as f64,
                            a: bg[3] as f64,
                        },
                    );

                    output.present();
                }

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.controller.process_mouse_motion(delta.0, delta.1);
        }
    }
}

fn main() {
    // Initialize logging
    env_logger::init();
    log::info!("Starting Volray");

    // Create event loop
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    // Create and run application
    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
