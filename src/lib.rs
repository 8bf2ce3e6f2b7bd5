//! scenery-ngin
//!
//! A scene viewer and editor core built on a deferred wgpu render chain. The
//! crate keeps scene state as plain flat tables (a shared vertex arena, a
//! model registry, an entity table with role-index lists) and renders them
//! with per-light cube shadow maps packed into one atlas texture.
//!
//! High-level modules
//! - `camera`: fly camera pose and view/projection uniforms
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene data (vertex arena, models, entities, textures)
//! - `pick`: CPU ray picking against the scene geometry
//! - `pipelines`: the deferred passes (geometry, shadow, light, compose, highlight)
//! - `render`: per-frame pass recording
//! - `resources`: mesh/texture/shader loading from the resource directory
//! - `scene_file`: JSON scene persistence
//! - `shadow`: cube-shadow atlas scheduling
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod pick;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene_file;
pub mod shadow;

// Re-exports commonly used types for convenience in downstream code.
pub use winit::dpi::PhysicalPosition;
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
pub use wgpu::*;
