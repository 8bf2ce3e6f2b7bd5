//! Loading of meshes, textures and shader sources from the resource
//! directory.

use std::path::{Path, PathBuf};

use crate::data_structures::model::MAX_MODELS;
use crate::resources::mesh::MeshData;

pub mod mesh;
pub mod texture;

/// Filesystem-backed resource lookup rooted at one directory.
#[derive(Debug, Clone)]
pub struct Resources {
    root: PathBuf,
}

impl Resources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a resource file by name. Misses are logged and reported as
    /// `None`; a missing texture or mesh should not take the process down.
    pub fn find_resource(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.root.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("resource {} not found: {}", path.display(), err);
                None
            }
        }
    }

    /// Load and parse an OBJ resource.
    pub fn load_mesh(&self, name: &str) -> Option<MeshData> {
        let bytes = self.find_resource(name)?;
        match mesh::parse_wavefront(&bytes) {
            Ok(data) => Some(data),
            Err(err) => {
                log::warn!("failed to parse {}: {}", name, err);
                None
            }
        }
    }

    /// List the OBJ filenames under the resource root, capped at the model
    /// table size since anything past that could not be loaded anyway.
    pub fn list_obj_files(&self) -> Vec<String> {
        let mut names = Vec::new();
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("cannot list resources in {}: {}", self.root.display(), err);
                return names;
            }
        };
        for entry in entries.flatten() {
            if names.len() >= MAX_MODELS {
                log::warn!("more than {} obj files, truncating listing", MAX_MODELS);
                break;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("obj") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        names
    }
}

/// Extract one named section from a concatenated shader source.
///
/// Sections are introduced by `#shader <name>` lines and run until the next
/// `#shader` line or end of input. Returns `None` (logged) when the name is
/// absent.
pub fn find_shader_source<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let mut start = None;
    for (offset, line) in source.lines().map(|l| (l.as_ptr() as usize - source.as_ptr() as usize, l)) {
        if let Some(section) = line.trim_start().strip_prefix("#shader") {
            if let Some(found) = start {
                return Some(&source[found..offset]);
            }
            if section.trim() == name {
                start = Some(offset + line.len());
            }
        }
    }
    match start {
        Some(found) => Some(&source[found..]),
        None => {
            log::warn!("shader section {} not found", name);
            None
        }
    }
}
