//! Equirectangular environment backdrop
//!
//! One panoramic image per scene, decoded with the `image` crate and
//! sampled by view direction in the environment shader. Purely visual
//! configuration: it is not part of the asset batch and a missing file
//! degrades to the clear color.

use std::path::Path;

use anyhow::Context;

use crate::gfx::resources::texture_resource::TextureResource;
use crate::wgpu_utils::binding_builder::{BindGroupBuilder, BindGroupLayoutWithDesc};

/// A loaded panorama ready to bind into the backdrop pass.
pub struct Environment {
    bind_group: wgpu::BindGroup,
    // Keeps the texture alive for the lifetime of the bind group
    _texture: TextureResource,
}

impl Environment {
    /// Decodes the panorama and uploads it. HDR inputs are tone-squashed
    /// to RGBA8 by the decoder; panoramas wrap horizontally.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        path: &Path,
    ) -> anyhow::Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("failed to open environment map {:?}", path))?
            .to_rgba8();

        let (width, height) = image.dimensions();
        let texture = TextureResource::create_from_rgba_data(
            device,
            queue,
            image.as_raw(),
            width,
            height,
            "Environment Map",
        );

        let bind_group = BindGroupBuilder::new(layout)
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(device, "Environment Bind Group");

        log::info!(
            "environment map {:?} loaded ({}x{})",
            path,
            width,
            height
        );

        Ok(Self {
            bind_group,
            _texture: texture,
        })
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
