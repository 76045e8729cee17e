//! # Graphics Module
//!
//! All graphics-related functionality for the vignette viewer: camera
//! system, render pipelines, scene management, and GPU resources.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with mouse and WASD controls
//! - **Rendering Pipeline** ([`rendering`]) - Forward pass plus equirect backdrop
//! - **Scene Management** ([`scene`]) - Loaded props and their transforms
//! - **Resource Management** ([`resources`]) - Materials, uniforms, textures

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
pub use scene::Scene;
