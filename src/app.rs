//! Application shell
//!
//! Winit event-loop driver for one running vignette. Routes pointer
//! events into picking, clicks into dispatch, drains asset completions
//! every frame, and only starts drawing the scene once the readiness
//! gate has revealed it. Navigation effects swap in a fresh scene and
//! session.

use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorIcon, Window, WindowAttributes},
};

use crate::gfx::{
    camera::{
        camera_controller::CameraController, camera_utils::CameraManager,
        orbit_camera::OrbitCamera,
    },
    rendering::render_engine::RenderEngine,
    scene::Scene,
};
use crate::interaction::picking::{cursor_hint, CursorHint, PointerNdc};
use crate::interaction::DispatchOutcome;
use crate::scenes::{self, SceneConfig};
use crate::session::{SceneSession, SessionEvent};
use crate::ui::{overlay, UiManager};

pub struct DioramaApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    session: SceneSession,
    /// Last pointer position in physical pixels; picking re-derives NDC
    /// from this and the live viewport on every event.
    pointer: Option<(f32, f32)>,
    cursor: CursorHint,
}

impl DioramaApp {
    /// Creates an application showing the given vignette.
    pub async fn new(config: SceneConfig) -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let scene = build_scene(&config, 1.0);
        let session = SceneSession::begin(config, Instant::now());

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                session,
                pointer: None,
                cursor: CursorHint::Default,
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

/// Builds an empty scene with the config's starting camera pose.
fn build_scene(config: &SceneConfig, aspect: f32) -> Scene {
    let pose = config.camera;
    let mut camera = OrbitCamera::new(pose.distance, pose.pitch, pose.yaw, pose.target, aspect);
    camera.bounds.min_distance = Some(1.1);
    let controller = CameraController::new(0.005, 0.1);

    Scene::new(CameraManager::new(camera, controller))
}

impl AppState {
    /// Pointer position as NDC against the current viewport, when known.
    fn pointer_ndc(&self) -> Option<PointerNdc> {
        let window = self.window.as_ref()?;
        let (px, py) = self.pointer?;
        let size = window.inner_size();
        Some(PointerNdc::from_device(
            px,
            py,
            size.width as f32,
            size.height.max(1) as f32,
        ))
    }

    /// Move-event policy: recompute the pick and the cursor hint from
    /// scratch, every time. Nothing is rendered before the reveal, so
    /// until then the hint stays default.
    fn refresh_cursor_hint(&mut self) {
        let hint = match self.pointer_ndc() {
            Some(pointer) if self.session.revealed() => {
                let hits = self.session.pick(pointer, &self.scene);
                cursor_hint(&hits)
            }
            _ => CursorHint::Default,
        };

        if hint != self.cursor {
            self.cursor = hint;
            if let Some(window) = &self.window {
                window.set_cursor(match hint {
                    CursorHint::Pointer => CursorIcon::Pointer,
                    CursorHint::Default => CursorIcon::Default,
                });
            }
        }
    }

    /// Click-event policy: a fresh pick from the click's own
    /// coordinates, then at most one dispatched effect.
    fn handle_click(&mut self) {
        if !self.session.revealed() {
            return;
        }
        let Some(pointer) = self.pointer_ndc() else {
            return;
        };

        match self.session.click(pointer, &self.scene) {
            Some(DispatchOutcome::Navigated(target)) => self.navigate(&target),
            Some(DispatchOutcome::PopupShown) | None => {}
        }
    }

    /// Swaps in the target scene when it exists here; unknown targets
    /// are destinations outside this viewer and only get logged.
    fn navigate(&mut self, target: &str) {
        let Some(config) = scenes::by_name(target) else {
            log::info!("navigation target '{}' is not a scene here", target);
            return;
        };

        log::info!("navigating to scene '{}'", config.name);

        let aspect = self.scene.camera_manager.camera.aspect;
        self.scene = build_scene(&config, aspect);

        if let Some(render_engine) = self.render_engine.as_mut() {
            match &config.environment {
                Some(path) => render_engine.set_environment(path),
                None => render_engine.clear_environment(),
            }
        }
        if let Some(window) = &self.window {
            window.set_title(&config.title);
            window.set_cursor(CursorIcon::Default);
        }
        self.cursor = CursorHint::Default;

        self.session = SceneSession::begin(config, Instant::now());
    }

    fn frame(&mut self) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        let Some(window) = self.window.clone() else {
            return;
        };

        let now = Instant::now();
        let events = self.session.pump(&mut self.scene, now);
        if events
            .iter()
            .any(|event| matches!(event, SessionEvent::PropLoaded(_)))
        {
            self.scene
                .sync_gpu_resources(render_engine.device(), render_engine.queue());
        }

        self.scene.update();
        render_engine.update(self.scene.camera_manager.camera.uniform);

        let draw_scene = self.session.revealed();
        let progress = self.session.progress();
        let title = self.session.config().title.clone();

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let popup = self.session.popup_mut();
            let window_clone = window.clone();
            render_engine.render_frame(
                &self.scene,
                draw_scene,
                Some(
                    |device: &wgpu::Device,
                     queue: &wgpu::Queue,
                     encoder: &mut wgpu::CommandEncoder,
                     color_attachment: &wgpu::TextureView| {
                        ui_manager.draw(
                            device,
                            queue,
                            encoder,
                            &window_clone,
                            color_attachment,
                            |ui| {
                                let display_size = ui.io().display_size;
                                if !draw_scene {
                                    overlay::draw_loading(ui, &title, progress, display_size);
                                }
                                overlay::draw_popup(ui, popup, display_size);
                            },
                        );
                    },
                ),
            );
        } else {
            render_engine.render_frame(
                &self.scene,
                draw_scene,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            );
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.session.config().title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        if let Ok(window) = event_loop.create_window(attributes) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();
            self.scene
                .camera_manager
                .camera
                .resize_projection(width, height);

            let window_clone = window_handle.clone();
            let mut renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, width, height).await
            });

            if let Some(path) = &self.session.config().environment {
                renderer.set_environment(path);
            }

            let ui_manager = UiManager::new(
                renderer.device(),
                renderer.queue(),
                renderer.surface_format(),
                &window_handle,
            );

            self.ui_manager = Some(ui_manager);
            self.render_engine = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        let Some(window) = self.window.as_ref().cloned() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                // UI consumed the event - request redraw and return early
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if matches!(
                    key_event.physical_key,
                    winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape)
                ) {
                    event_loop.exit();
                    return;
                }
                self.scene.camera_manager.process_keyboard_event(&key_event);
                window.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = Some((position.x as f32, position.y as f32));
                self.refresh_cursor_hint();
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.handle_click();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        // Check if UI wants to capture input before processing camera events
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            let io = ui_manager.context.io();
            if io.want_capture_mouse || io.want_capture_keyboard {
                return;
            }
        }

        self.scene.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
