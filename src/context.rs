//! GPU context: device, surface, render targets, pipelines and the shared
//! uniform buffers.
//!
//! [`RenderContext`] owns everything GPU-side so the scene structures stay
//! plain CPU data. Losing the surface or failing device setup is fatal and
//! surfaces as an error from [`RenderContext::new`]; everything per-frame is
//! handled in the render module.

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraUniform},
    data_structures::{arena::VertexArena, model::TextureId, scene::MAX_ENTITIES, texture::Texture},
    pipelines::{
        self, UNIFORM_STRIDE, compose, geometry, highlight,
        light::{self, LIGHT_FORMAT},
        shadow as shadow_pipeline,
    },
    resources::texture::{material_bind_group, material_layout},
    shadow::{ATLAS_SIZE, MAX_TILES},
};

/// Default depth-comparison bias applied when sampling the shadow atlas.
pub const DEFAULT_SHADOW_BIAS: f32 = 0.002;

/// The render pipelines of the deferred chain, built once at startup.
#[derive(Debug)]
pub struct Pipelines {
    pub geometry: wgpu::RenderPipeline,
    pub geometry_wireframe: wgpu::RenderPipeline,
    pub shadow: wgpu::RenderPipeline,
    pub light: wgpu::RenderPipeline,
    pub compose: wgpu::RenderPipeline,
    pub highlight_mask: wgpu::RenderPipeline,
    pub outline: wgpu::RenderPipeline,
}

/// Surface-sized intermediate targets, recreated on every resize.
#[derive(Debug)]
pub struct FrameTargets {
    pub color: Texture,
    pub position: Texture,
    pub normal: Texture,
    pub emission: Texture,
    pub light: Texture,
    pub depth: Texture,
    pub gbuffer_bind_group: wgpu::BindGroup,
    pub compose_bind_group: wgpu::BindGroup,
}

impl FrameTargets {
    fn new(
        device: &wgpu::Device,
        size: [u32; 2],
        gbuffer_layout: &wgpu::BindGroupLayout,
        compose_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let color = Texture::create_render_target(device, size, geometry::COLOR_FORMAT, "g_color");
        let position =
            Texture::create_render_target(device, size, geometry::POSITION_FORMAT, "g_position");
        let normal =
            Texture::create_render_target(device, size, geometry::NORMAL_FORMAT, "g_normal");
        let emission =
            Texture::create_render_target(device, size, geometry::EMISSION_FORMAT, "g_emission");
        let light = Texture::create_render_target(device, size, LIGHT_FORMAT, "light_mask");
        let depth = Texture::create_depth_texture(device, size, "depth_texture");

        let gbuffer_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: gbuffer_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&position.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
            ],
            label: Some("gbuffer_bind_group"),
        });

        let compose_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: compose_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&light.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&emission.view),
                },
            ],
            label: Some("compose_bind_group"),
        });

        Self {
            color,
            position,
            normal,
            emission,
            light,
            depth,
            gbuffer_bind_group,
            compose_bind_group,
        }
    }
}

#[derive(Debug)]
pub struct RenderContext {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    pub pipelines: Pipelines,
    pub targets: FrameTargets,
    pub shadow_atlas: Texture,
    pub atlas_bind_group: wgpu::BindGroup,
    pub highlight_mask: Texture,
    pub outline_bind_group: wgpu::BindGroup,

    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub entity_buffer: wgpu::Buffer,
    pub entity_bind_group: wgpu::BindGroup,
    pub tile_buffer: wgpu::Buffer,
    pub tile_vp_bind_group: wgpu::BindGroup,
    pub light_tile_bind_group: wgpu::BindGroup,

    material_layout: wgpu::BindGroupLayout,
    material_bind_groups: Vec<wgpu::BindGroup>,
    default_sampler: wgpu::Sampler,
    gbuffer_layout: wgpu::BindGroupLayout,
    compose_layout: wgpu::BindGroupLayout,

    pub vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: usize,

    /// Depth comparison bias of the shadow lookup, editable at runtime to
    /// trade acne against peter-panning.
    pub shadow_bias: f32,
}

impl RenderContext {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                // Line polygon mode backs the wireframe draw style.
                required_features: wgpu::Features::POLYGON_MODE_LINE,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Bind group layouts shared across passes.
        let camera_layout = pipelines::mk_uniform_layout(
            &device,
            wgpu::ShaderStages::VERTEX,
            false,
            "camera_bind_group_layout",
        );
        let entity_layout = pipelines::mk_uniform_layout(
            &device,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            true,
            "entity_bind_group_layout",
        );
        let tile_vp_layout = pipelines::mk_uniform_layout(
            &device,
            wgpu::ShaderStages::VERTEX,
            true,
            "tile_vp_bind_group_layout",
        );
        let light_tile_layout = pipelines::mk_uniform_layout(
            &device,
            wgpu::ShaderStages::FRAGMENT,
            true,
            "light_tile_bind_group_layout",
        );
        let material_layout = material_layout(&device);
        let gbuffer_layout = light::mk_gbuffer_layout(&device);
        let atlas_layout = light::mk_atlas_layout(&device);
        let compose_layout = compose::mk_compose_layout(&device);
        let outline_layout = highlight::mk_outline_layout(&device);

        let pipelines = Pipelines {
            geometry: geometry::mk_geometry_pipeline(
                &device,
                &camera_layout,
                &entity_layout,
                &material_layout,
                false,
            ),
            geometry_wireframe: geometry::mk_geometry_pipeline(
                &device,
                &camera_layout,
                &entity_layout,
                &material_layout,
                true,
            ),
            shadow: shadow_pipeline::mk_shadow_pipeline(&device, &tile_vp_layout, &entity_layout),
            light: light::mk_light_pipeline(
                &device,
                &gbuffer_layout,
                &atlas_layout,
                &light_tile_layout,
            ),
            compose: compose::mk_compose_pipeline(&device, config.format, &compose_layout),
            highlight_mask: highlight::mk_mask_pipeline(&device, &camera_layout, &entity_layout),
            outline: highlight::mk_outline_pipeline(&device, config.format, &outline_layout),
        };

        let targets = FrameTargets::new(
            &device,
            [config.width, config.height],
            &gbuffer_layout,
            &compose_layout,
        );

        let shadow_atlas = Texture::create_shadow_atlas(&device, ATLAS_SIZE, "shadow_atlas");
        let atlas_sampler = shadow_atlas
            .sampler
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("shadow atlas created without a sampler"))?;
        let atlas_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &atlas_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&shadow_atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(atlas_sampler),
                },
            ],
            label: Some("shadow_atlas_bind_group"),
        });

        let highlight_mask = Texture::create_render_target(
            &device,
            [highlight::MASK_SIZE, highlight::MASK_SIZE],
            highlight::MASK_FORMAT,
            "highlight_mask",
        );
        let outline_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &outline_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&highlight_mask.view),
            }],
            label: Some("outline_bind_group"),
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::from_camera(
                &Camera::default(),
                config.width,
                config.height,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let entity_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Entity Uniform Buffer"),
            size: MAX_ENTITIES as u64 * UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let entity_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &entity_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &entity_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(
                        std::mem::size_of::<geometry::EntityUniform>() as u64
                    ),
                }),
            }],
            label: Some("entity_bind_group"),
        });

        // One tile buffer, two views: the shadow pass binds just the leading
        // view-projection matrix, the light pass the full record.
        let tile_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Tile Uniform Buffer"),
            size: MAX_TILES as u64 * UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let tile_vp_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &tile_vp_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &tile_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<[[f32; 4]; 4]>() as u64),
                }),
            }],
            label: Some("tile_vp_bind_group"),
        });
        let light_tile_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &light_tile_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &tile_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(
                        std::mem::size_of::<light::LightTileUniform>() as u64
                    ),
                }),
            }],
            label: Some("light_tile_bind_group"),
        });

        let default_sampler = crate::data_structures::texture::create_default_sampler(&device);
        // Texture id 0 is the flat white fallback every untextured material
        // binds.
        let white = Texture::create_white(&device, &queue)?;
        let material_bind_groups = vec![material_bind_group(
            &device,
            &material_layout,
            &white,
            white.sampler.as_ref().unwrap_or(&default_sampler),
            "material white",
        )];

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipelines,
            targets,
            shadow_atlas,
            atlas_bind_group,
            highlight_mask,
            outline_bind_group,
            camera_buffer,
            camera_bind_group,
            entity_buffer,
            entity_bind_group,
            tile_buffer,
            tile_vp_bind_group,
            light_tile_bind_group,
            material_layout,
            material_bind_groups,
            default_sampler,
            gbuffer_layout,
            compose_layout,
            vertex_buffer: None,
            vertex_count: 0,
            shadow_bias: DEFAULT_SHADOW_BIAS,
        })
    }

    /// Blocking wrapper around [`new`](Self::new) for callers without an
    /// async runtime; GPU setup happens once at startup anyway.
    pub fn new_blocking(window: Arc<Window>) -> anyhow::Result<Self> {
        pollster::block_on(Self::new(window))
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigure the surface and rebuild the surface-sized targets.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.targets = FrameTargets::new(
            &self.device,
            [width, height],
            &self.gbuffer_layout,
            &self.compose_layout,
        );
    }

    /// Register a loaded color map and return its material texture id.
    pub fn add_texture(&mut self, texture: &Texture, label: &str) -> TextureId {
        let id = self.material_bind_groups.len();
        self.material_bind_groups.push(material_bind_group(
            &self.device,
            &self.material_layout,
            texture,
            texture.sampler.as_ref().unwrap_or(&self.default_sampler),
            label,
        ));
        id
    }

    /// Material bind group for a texture id; unknown ids fall back to the
    /// white material.
    pub fn material(&self, id: TextureId) -> &wgpu::BindGroup {
        self.material_bind_groups.get(id).unwrap_or_else(|| {
            log::warn!("unknown texture id {}, using white material", id);
            &self.material_bind_groups[0]
        })
    }

    pub fn write_camera(&self, camera: &Camera) {
        let uniform = CameraUniform::from_camera(camera, self.config.width, self.config.height);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Re-upload the interleaved vertex buffer after the arena changed.
    /// Cheap when nothing was appended since the last call.
    pub fn update_vertex_buffers(&mut self, arena: &VertexArena) {
        if arena.len() == self.vertex_count {
            return;
        }
        let data = arena.interleaved();
        self.vertex_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Arena Vertex Buffer"),
                contents: bytemuck::cast_slice(&data),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.vertex_count = arena.len();
        log::debug!("vertex buffer rebuilt with {} vertices", arena.len());
    }
}
