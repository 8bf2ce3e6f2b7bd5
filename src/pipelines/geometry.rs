//! Geometry pass: scene meshes into the G-buffer.
//!
//! One draw per renderable entity, selected by dynamic offset into the
//! per-entity uniform buffer. Four color targets are written at once: albedo,
//! world position, world normal and emission. None of the float targets is
//! blendable, so blending stays off for the whole pass.

use cgmath::Matrix4;

use crate::data_structures::model::Material;
use crate::data_structures::texture::Texture;
use crate::pipelines::{mk_render_pipeline, vertex_desc};

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
pub const EMISSION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Per-entity GPU record: model matrix plus emission color. The alpha slot
/// carries the material mix factor (1 selects flat white, 0 the bound
/// texture).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EntityUniform {
    pub model: [[f32; 4]; 4],
    pub emission: [f32; 4],
}

impl EntityUniform {
    pub fn new(model: Matrix4<f32>, emission: [f32; 3], material: Material) -> Self {
        Self {
            model: model.into(),
            emission: [emission[0], emission[1], emission[2], material.mix_factor()],
        }
    }
}

fn gbuffer_targets() -> [Option<wgpu::ColorTargetState>; 4] {
    [COLOR_FORMAT, POSITION_FORMAT, NORMAL_FORMAT, EMISSION_FORMAT].map(|format| {
        Some(wgpu::ColorTargetState {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })
    })
}

/// Build the geometry pipeline. `wireframe` switches the polygon mode to
/// lines; everything else, targets included, stays identical so fill and
/// wireframe batches can share one render pass.
pub fn mk_geometry_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    entity_layout: &wgpu::BindGroupLayout,
    material_layout: &wgpu::BindGroupLayout,
    wireframe: bool,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Geometry Pipeline Layout"),
        bind_group_layouts: &[camera_layout, entity_layout, material_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Geometry Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("geometry.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        if wireframe { "Geometry Pipeline (wireframe)" } else { "Geometry Pipeline" },
        shader,
        &[vertex_desc()],
        &gbuffer_targets(),
        Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        if wireframe { wgpu::PolygonMode::Line } else { wgpu::PolygonMode::Fill },
        if wireframe { None } else { Some(wgpu::Face::Back) },
    )
}
