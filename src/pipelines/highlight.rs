//! Selection highlight: entity silhouette mask plus outline overlay.
//!
//! The highlighted entity is first rasterized into a small single-channel
//! mask, then a post-process draw over the finished frame marks texels whose
//! mask neighborhood crosses the silhouette edge. Everything not on the edge
//! is discarded, so the overlay blends on top of the composed image.

use crate::pipelines::{mk_render_pipeline, vertex_desc};

pub const MASK_SIZE: u32 = 512;
pub const MASK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Rasterize the selected entity as flat white into the mask target. No
/// depth: occluded silhouette parts still outline.
pub fn mk_mask_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    entity_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Highlight Mask Pipeline Layout"),
        bind_group_layouts: &[camera_layout, entity_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Highlight Mask Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("highlight_mask.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        "Highlight Mask Pipeline",
        shader,
        &[vertex_desc()],
        &[Some(wgpu::ColorTargetState {
            format: MASK_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })],
        None,
        wgpu::PolygonMode::Fill,
        None,
    )
}

pub fn mk_outline_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
            },
            count: None,
        }],
        label: Some("outline_bind_group_layout"),
    })
}

/// Edge-detect the mask and alpha-blend the outline over the surface.
pub fn mk_outline_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    outline_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Outline Pipeline Layout"),
        bind_group_layouts: &[outline_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Outline Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("outline.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        "Outline Pipeline",
        shader,
        &[],
        &[Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })],
        None,
        wgpu::PolygonMode::Fill,
        None,
    )
}
