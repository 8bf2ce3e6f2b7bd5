//! Light accumulation pass: one full-screen triangle per atlas tile.
//!
//! Each draw adds one cube face's contribution into the HDR light mask with
//! additive blending. The fragment shader reconstructs the lit point from the
//! position target, rejects points outside the face frustum and compares
//! depth against the face's atlas rectangle.

use cgmath::Vector3;

use crate::shadow::ShadowTile;

pub const LIGHT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Per-tile GPU record shared by the shadow and light passes: the shadow pass
/// binds only the leading view-projection, the light pass the whole record.
///
/// `tile` packs the atlas rectangle (xy origin and z edge in texels, w atlas
/// edge); `color.a` carries the shadow comparison bias.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightTileUniform {
    pub view_proj: [[f32; 4]; 4],
    pub tile: [f32; 4],
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl LightTileUniform {
    pub fn new(
        tile: &ShadowTile,
        position: Vector3<f32>,
        color: Vector3<f32>,
        atlas_size: u32,
        shadow_bias: f32,
    ) -> Self {
        Self {
            view_proj: tile.view_proj.into(),
            tile: [
                tile.rect.x as f32,
                tile.rect.y as f32,
                tile.rect.size as f32,
                atlas_size as f32,
            ],
            position: [position.x, position.y, position.z, 1.0],
            color: [color.x, color.y, color.z, shadow_bias],
        }
    }
}

/// Group 0 of the light pass: position and normal targets, read back with
/// `textureLoad` so no filtering capability is required.
pub fn mk_gbuffer_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[texture_entry(0), texture_entry(1)],
        label: Some("gbuffer_bind_group_layout"),
    })
}

/// Group 1 of the light pass: the shadow atlas with its comparison sampler.
pub fn mk_atlas_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("shadow_atlas_bind_group_layout"),
    })
}

pub fn mk_light_pipeline(
    device: &wgpu::Device,
    gbuffer_layout: &wgpu::BindGroupLayout,
    atlas_layout: &wgpu::BindGroupLayout,
    tile_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Light Pipeline Layout"),
        bind_group_layouts: &[gbuffer_layout, atlas_layout, tile_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Light Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("light.wgsl").into()),
    };

    crate::pipelines::mk_render_pipeline(
        device,
        &layout,
        "Light Pipeline",
        shader,
        &[],
        &[Some(wgpu::ColorTargetState {
            format: LIGHT_FORMAT,
            blend: Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
            write_mask: wgpu::ColorWrites::ALL,
        })],
        None,
        wgpu::PolygonMode::Fill,
        None,
    )
}
