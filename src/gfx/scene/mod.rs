//! # Scene Management Module
//!
//! Holds the loaded vignette: objects installed from finished asset
//! loads, the materials they reference, and the camera looking at them.
//!
//! ## Key Components
//!
//! - [`Scene`] - The container managing objects, camera, and materials
//! - [`Object`] - One loaded prop with meshes, transform, and GPU state
//! - [`Vertex3D`] - GPU vertex format (position + normal)

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Object};
pub use scene::Scene;
pub use vertex::Vertex3D;
