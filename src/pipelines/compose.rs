//! Compose pass: G-buffer plus light mask onto the surface.

pub fn mk_compose_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        entries: &[texture_entry(0), texture_entry(1), texture_entry(2)],
        label: Some("compose_bind_group_layout"),
    })
}

pub fn mk_compose_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    compose_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Compose Pipeline Layout"),
        bind_group_layouts: &[compose_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Compose Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("compose.wgsl").into()),
    };

    crate::pipelines::mk_render_pipeline(
        device,
        &layout,
        "Compose Pipeline",
        shader,
        &[],
        &[Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })],
        None,
        wgpu::PolygonMode::Fill,
        None,
    )
}
