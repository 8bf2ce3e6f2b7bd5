//! Frame rendering: the full deferred chain in one command encoder.
//!
//! Pass order per frame: geometry into the G-buffer, shadow depth into the
//! atlas, per-tile light accumulation, compose onto the surface, then the
//! optional selection outline. Surface loss is reported to the caller, who
//! decides between reconfigure and shutdown; everything else in here cannot
//! fail.

use std::iter;

use cgmath::Vector3;

use crate::{
    context::RenderContext,
    data_structures::{
        arena::VertexArena,
        model::{Material, Model, ModelRegistry},
        scene::SceneTable,
    },
    pipelines::{UNIFORM_STRIDE, geometry::EntityUniform, light::LightTileUniform},
    shadow::{ATLAS_SIZE, MAX_SHADOW_LIGHTS, shadow_tile},
};

struct SceneLight {
    position: Vector3<f32>,
    color: Vector3<f32>,
}

pub fn render_frame(
    ctx: &mut RenderContext,
    scene: &SceneTable,
    registry: &ModelRegistry,
    arena: &VertexArena,
) -> Result<(), wgpu::SurfaceError> {
    ctx.update_vertex_buffers(arena);

    write_entity_uniforms(ctx, scene, registry);
    let lights = gather_lights(scene, registry);
    write_tile_uniforms(ctx, &lights);

    let output = ctx.surface.get_current_texture()?;
    let surface_view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

    geometry_pass(ctx, scene, registry, &mut encoder);
    shadow_pass(ctx, scene, registry, lights.len(), &mut encoder);
    light_pass(ctx, lights.len(), &mut encoder);
    compose_pass(ctx, &surface_view, &mut encoder);
    highlight_passes(ctx, scene, registry, &surface_view, &mut encoder);

    ctx.queue.submit(iter::once(encoder.finish()));
    output.present();
    Ok(())
}

/// Upload one [`EntityUniform`] per live entity at its dynamic-offset slot.
fn write_entity_uniforms(ctx: &RenderContext, scene: &SceneTable, registry: &ModelRegistry) {
    let count = scene.entity_count();
    if count == 0 {
        return;
    }

    let stride = UNIFORM_STRIDE as usize;
    let mut data = vec![0u8; count * stride];
    for entity in 0..count {
        let Some(transform) = scene.transform(entity) else {
            continue;
        };
        let (emission, material) = scene
            .model_of(entity)
            .and_then(|id| registry.get(id))
            .map(|m| (m.emission.into(), m.material))
            .unwrap_or(([0.0; 3], Material::Untextured));

        let uniform = EntityUniform::new(transform.matrix(), emission, material);
        let bytes = bytemuck::bytes_of(&uniform);
        data[entity * stride..entity * stride + bytes.len()].copy_from_slice(bytes);
    }
    ctx.queue.write_buffer(&ctx.entity_buffer, 0, &data);
}

/// Collect shadow-casting lights in role-list order, capped at the atlas
/// capacity. Lights past the cap keep their emissive look but cast nothing.
fn gather_lights(scene: &SceneTable, registry: &ModelRegistry) -> Vec<SceneLight> {
    let mut lights = Vec::new();
    for &entity in scene.lights() {
        let Some(transform) = scene.transform(entity) else {
            continue;
        };
        let Some(model) = scene.model_of(entity).and_then(|id| registry.get(id)) else {
            continue;
        };
        if lights.len() >= MAX_SHADOW_LIGHTS {
            log::warn!(
                "shadow atlas full, entity {} lights without casting shadows",
                entity
            );
            continue;
        }
        lights.push(SceneLight {
            position: transform.pos,
            color: model.emission,
        });
    }
    lights
}

/// Upload one [`LightTileUniform`] per scheduled cube face.
fn write_tile_uniforms(ctx: &RenderContext, lights: &[SceneLight]) {
    if lights.is_empty() {
        return;
    }

    let stride = UNIFORM_STRIDE as usize;
    let mut data = vec![0u8; lights.len() * 6 * stride];
    for (rank, light) in lights.iter().enumerate() {
        for face in 0..6 {
            let tile = shadow_tile(light.position, rank, face);
            let uniform = LightTileUniform::new(
                &tile,
                light.position,
                light.color,
                ATLAS_SIZE,
                ctx.shadow_bias,
            );
            let bytes = bytemuck::bytes_of(&uniform);
            let slot = (rank * 6 + face) * stride;
            data[slot..slot + bytes.len()].copy_from_slice(bytes);
        }
    }
    ctx.queue.write_buffer(&ctx.tile_buffer, 0, &data);
}

fn entity_offset(entity: usize) -> u32 {
    (entity as u64 * UNIFORM_STRIDE) as u32
}

fn draw_entity(render_pass: &mut wgpu::RenderPass<'_>, model: &Model) {
    render_pass.draw(model.offset..model.offset + model.len, 0..1);
}

fn geometry_pass(
    ctx: &RenderContext,
    scene: &SceneTable,
    registry: &ModelRegistry,
    encoder: &mut wgpu::CommandEncoder,
) {
    let clear = |view| {
        Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })
    };

    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Geometry Pass"),
        color_attachments: &[
            clear(&ctx.targets.color.view),
            clear(&ctx.targets.position.view),
            clear(&ctx.targets.normal.view),
            clear(&ctx.targets.emission.view),
        ],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &ctx.targets.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    let Some(vertex_buffer) = ctx.vertex_buffer.as_ref() else {
        return;
    };
    render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
    render_pass.set_bind_group(0, &ctx.camera_bind_group, &[]);

    // Fill first, then the wireframe batch, so the pipeline switches at most
    // once per frame.
    for wireframe in [false, true] {
        let pipeline = if wireframe {
            &ctx.pipelines.geometry_wireframe
        } else {
            &ctx.pipelines.geometry
        };
        render_pass.set_pipeline(pipeline);

        for &entity in scene.renderable() {
            let Some(model) = scene.model_of(entity).and_then(|id| registry.get(id)) else {
                continue;
            };
            if model.wireframe != wireframe {
                continue;
            }
            let texture = match model.material {
                Material::Untextured => 0,
                Material::Textured(id) => id,
            };
            render_pass.set_bind_group(1, &ctx.entity_bind_group, &[entity_offset(entity)]);
            render_pass.set_bind_group(2, ctx.material(texture), &[]);
            draw_entity(&mut render_pass, model);
        }
    }
}

/// All cube faces of all lights into the atlas: one render pass, one
/// viewport switch per tile. Wireframe models don't cast shadows.
fn shadow_pass(
    ctx: &RenderContext,
    scene: &SceneTable,
    registry: &ModelRegistry,
    light_count: usize,
    encoder: &mut wgpu::CommandEncoder,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Shadow Pass"),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &ctx.shadow_atlas.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    let Some(vertex_buffer) = ctx.vertex_buffer.as_ref() else {
        return;
    };
    render_pass.set_pipeline(&ctx.pipelines.shadow);
    render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));

    for tile_index in 0..light_count * 6 {
        let rect = crate::shadow::tile_rect(tile_index);
        render_pass.set_viewport(
            rect.x as f32,
            rect.y as f32,
            rect.size as f32,
            rect.size as f32,
            0.0,
            1.0,
        );
        render_pass.set_bind_group(
            0,
            &ctx.tile_vp_bind_group,
            &[(tile_index as u64 * UNIFORM_STRIDE) as u32],
        );

        for &entity in scene.renderable() {
            let Some(model) = scene.model_of(entity).and_then(|id| registry.get(id)) else {
                continue;
            };
            if model.wireframe {
                continue;
            }
            render_pass.set_bind_group(1, &ctx.entity_bind_group, &[entity_offset(entity)]);
            draw_entity(&mut render_pass, model);
        }
    }
}

/// One additive full-screen triangle per scheduled tile into the HDR light
/// mask.
fn light_pass(ctx: &RenderContext, light_count: usize, encoder: &mut wgpu::CommandEncoder) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Light Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: &ctx.targets.light.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    render_pass.set_pipeline(&ctx.pipelines.light);
    render_pass.set_bind_group(0, &ctx.targets.gbuffer_bind_group, &[]);
    render_pass.set_bind_group(1, &ctx.atlas_bind_group, &[]);

    for tile_index in 0..light_count * 6 {
        render_pass.set_bind_group(
            2,
            &ctx.light_tile_bind_group,
            &[(tile_index as u64 * UNIFORM_STRIDE) as u32],
        );
        render_pass.draw(0..3, 0..1);
    }
}

fn compose_pass(
    ctx: &RenderContext,
    surface_view: &wgpu::TextureView,
    encoder: &mut wgpu::CommandEncoder,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Compose Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: surface_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    render_pass.set_pipeline(&ctx.pipelines.compose);
    render_pass.set_bind_group(0, &ctx.targets.compose_bind_group, &[]);
    render_pass.draw(0..3, 0..1);
}

/// Silhouette mask plus outline overlay for the highlighted entity, if any.
fn highlight_passes(
    ctx: &RenderContext,
    scene: &SceneTable,
    registry: &ModelRegistry,
    surface_view: &wgpu::TextureView,
    encoder: &mut wgpu::CommandEncoder,
) {
    let Some(entity) = scene.highlighted_entity else {
        return;
    };
    let Some(model) = scene.model_of(entity).and_then(|id| registry.get(id)) else {
        return;
    };
    let Some(vertex_buffer) = ctx.vertex_buffer.as_ref() else {
        return;
    };

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Highlight Mask Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &ctx.highlight_mask.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&ctx.pipelines.highlight_mask);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_bind_group(0, &ctx.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &ctx.entity_bind_group, &[entity_offset(entity)]);
        draw_entity(&mut render_pass, model);
    }

    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Outline Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: surface_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    render_pass.set_pipeline(&ctx.pipelines.outline);
    render_pass.set_bind_group(0, &ctx.outline_bind_group, &[]);
    render_pass.draw(0..3, 0..1);
}
