//! Engine data structures: vertex storage, models, the scene table and
//! transforms.
//!
//! - `arena` is the shared growable vertex store all models live in
//! - `model` contains the loaded model table and material settings
//! - `scene` is the flat entity table with role-index lists
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `transform` holds per-entity position/rotation/scale with a cached matrix

pub mod arena;
pub mod model;
pub mod scene;
pub mod texture;
pub mod transform;
