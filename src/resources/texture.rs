//! Color map loading and the material bind group layout.

use crate::data_structures::texture::Texture;
use crate::resources::Resources;

/// Layout of group 2 in the geometry pass: one color map plus its sampler.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

/// Bind a loaded color map as a material group.
pub fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(label),
    })
}

/// Load an image resource into a GPU texture. Misses and decode failures are
/// logged and reported as `None`.
pub fn load_texture(
    resources: &Resources,
    name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Option<Texture> {
    let bytes = resources.find_resource(name)?;
    match Texture::from_bytes(device, queue, &bytes, name) {
        Ok(texture) => Some(texture),
        Err(err) => {
            log::warn!("failed to decode texture {}: {}", name, err);
            None
        }
    }
}
