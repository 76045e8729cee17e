//! WGPU-based rendering engine
//!
//! Owns the surface, device, depth buffer, and the two pipelines a
//! vignette needs: the equirect environment backdrop and the lit scene
//! pass. Scene objects are only drawn once the caller says the session
//! has revealed; the backdrop and UI overlay render either way, which is
//! what keeps the loading screen visible before readiness.

use std::path::Path;
use std::sync::Arc;
use wgpu::TextureFormat;

use crate::gfx::{
    camera::camera_utils::CameraUniform,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightConfig},
        material::MaterialBindings,
        texture_resource::TextureResource,
    },
    scene::{object::DrawObject, scene::Scene},
};
use crate::wgpu_utils::{
    binding_builder::{BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

use super::environment::Environment;
use super::pipeline_manager::{PipelineConfig, PipelineManager};

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    environment_layout: BindGroupLayoutWithDesc,
    environment: Option<Environment>,
    light_config: LightConfig,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Panics
    /// Panics if unable to create a wgpu adapter or device
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: 8192,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .expect("Failed to request a device!")
        };

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            // One frame per display refresh
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let device_handle = Arc::new(device);
        let queue_handle = Arc::new(queue);

        let global_ubo = UniformBuffer::new(&device_handle);
        let mut global_bindings = GlobalBindings::new(&device_handle);
        global_bindings.create_bind_group(&device_handle, &global_ubo);

        // Layout twins of the per-object and per-material bind groups, so
        // the pipelines agree with what objects create for themselves.
        let transform_bind_group_layout =
            device_handle.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Transform Bind Group Layout"),
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
            });
        let material_bind_group_layout = MaterialBindings::new(&device_handle)
            .bind_group_layouts()
            .clone();

        let environment_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device_handle, "Environment Bind Group Layout");

        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        // Load shaders
        pipeline_manager.load_shader("scene", include_str!("scene_shader.wgsl"));
        pipeline_manager.load_shader("environment", include_str!("environment.wgsl"));

        let color_targets = vec![Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        // Backdrop pass: fullscreen triangle, reads depth but never
        // writes it, so props always render on top.
        pipeline_manager.register_pipeline(
            "Environment",
            PipelineConfig::default()
                .with_label("ENVIRONMENT")
                .with_shader("environment")
                .with_depth_stencil(depth_texture.texture.clone())
                .with_depth_read_only(wgpu::CompareFunction::Always)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    environment_layout.layout.clone(),
                ])
                .with_color_targets(color_targets.clone())
                .with_no_vertex_buffers(),
        );

        // Lit scene pass for loaded props
        pipeline_manager.register_pipeline(
            "Scene",
            PipelineConfig::default()
                .with_label("SCENE")
                .with_shader("scene")
                .with_depth_stencil(depth_texture.texture.clone())
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    transform_bind_group_layout,
                    material_bind_group_layout,
                ])
                .with_color_targets(color_targets),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            environment_layout,
            environment: None,
            light_config: LightConfig::default(),
        }
    }

    /// Loads the scene's environment panorama. Failure is not fatal: the
    /// backdrop falls back to the clear color.
    pub fn set_environment(&mut self, path: &Path) {
        match Environment::load(&self.device, &self.queue, &self.environment_layout, path) {
            Ok(environment) => self.environment = Some(environment),
            Err(err) => {
                log::warn!("environment disabled: {:#}", err);
                self.environment = None;
            }
        }
    }

    pub fn clear_environment(&mut self) {
        self.environment = None;
    }

    /// Uploads per-frame camera and light data.
    pub fn update(&mut self, camera: CameraUniform) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera, self.light_config);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Renders a frame: environment backdrop, then (when `draw_scene` is
    /// set) every visible object, then the UI overlay callback.
    pub fn render_frame<F>(&mut self, scene: &Scene, draw_scene: bool, ui_callback: Option<F>)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Surface is stale (resize mid-flight); reconfigure and
                // let the next frame draw.
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                log::error!("failed to acquire surface texture: {}", err);
                return;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);

            if let Some(environment) = &self.environment {
                if let Some(pipeline) = self.pipeline_manager.get_pipeline("Environment") {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(1, environment.bind_group(), &[]);
                    render_pass.draw(0..3, 0..1);
                }
            }

            if draw_scene {
                if let Some(pipeline) = self.pipeline_manager.get_pipeline("Scene") {
                    render_pass.set_pipeline(pipeline);

                    for object in scene.objects.iter() {
                        if !object.visible {
                            continue;
                        }
                        let Some(transform_bind_group) = object.get_transform_bind_group() else {
                            continue; // GPU resources not created yet
                        };
                        let material = scene.get_material_for_object(object);
                        let Some(material_bind_group) = material.get_bind_group() else {
                            continue;
                        };

                        render_pass.set_bind_group(1, transform_bind_group, &[]);
                        render_pass.set_bind_group(2, material_bind_group, &[]);
                        render_pass.draw_object(object);
                    }
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }
}
