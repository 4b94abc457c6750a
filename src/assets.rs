//! Static room resources — terrain maps and metadata compiled into the binary.
//!
//! Each room has a `static/map/{key}/map.txt` terrain file and an optional
//! `static/map/{key}/meta.json` with NPCs, portals and areas. The core only
//! sees them through [`ResourceSource`], so hosts can serve rooms from
//! elsewhere.

use thiserror::Error;

use crate::game::terrain::GridError;

#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[error("no {resource} resource for room '{room}'")]
    NotFound {
        resource: &'static str,
        room: String,
    },
    #[error("invalid terrain for room '{room}': {source}")]
    Grid {
        room: String,
        #[source]
        source: GridError,
    },
    #[error("invalid metadata for room '{room}': {source}")]
    Metadata {
        room: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only source of per-room resources.
pub trait ResourceSource: Send + Sync {
    /// Terrain text for a room, one row per line.
    fn load_grid(&self, room: &str) -> Result<String, ResourceLoadError>;

    /// Metadata JSON for a room. `Ok(None)` when the room has none.
    fn load_metadata(&self, room: &str) -> Result<Option<String>, ResourceLoadError>;
}

/// Resources shipped inside the binary via `include_str!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedResources;

fn embedded_grid(room: &str) -> Option<&'static str> {
    match room {
        "euniciar" => Some(include_str!("../static/map/euniciar/map.txt")),
        "patricolia" => Some(include_str!("../static/map/patricolia/map.txt")),
        _ => None,
    }
}

fn embedded_metadata(room: &str) -> Option<&'static str> {
    match room {
        "euniciar" => Some(include_str!("../static/map/euniciar/meta.json")),
        "patricolia" => Some(include_str!("../static/map/patricolia/meta.json")),
        _ => None,
    }
}

impl ResourceSource for EmbeddedResources {
    fn load_grid(&self, room: &str) -> Result<String, ResourceLoadError> {
        embedded_grid(room)
            .map(str::to_string)
            .ok_or_else(|| ResourceLoadError::NotFound {
                resource: "map",
                room: room.to_string(),
            })
    }

    fn load_metadata(&self, room: &str) -> Result<Option<String>, ResourceLoadError> {
        Ok(embedded_metadata(room).map(str::to_string))
    }
}
