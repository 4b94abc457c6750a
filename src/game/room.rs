//! Rooms — the static registry of room identifiers and the loaded room that
//! pairs a registry entry with its terrain and metadata.
//!
//! Resolution is two-phase: [`RoomRegistry::resolve`] yields a [`RoomDef`],
//! then [`Room::load`] attaches the terrain grid. A [`Room`] therefore always
//! has a grid.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::assets::{ResourceLoadError, ResourceSource};
use crate::config::ConfigError;
use crate::game::terrain::{TerrainGrid, TileTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Npc {
    pub name: String,
    pub loc: Location,
    /// Sprite reference.
    pub img: String,
    #[serde(default)]
    pub interaction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Encounter {
    pub rate: f32,
    pub name: String,
}

/// Exit to another room. Declared only; nothing here moves the player through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Portal {
    pub name: String,
    pub loc: Location,
    /// Destination room key.
    pub map: String,
    pub dest_loc: Location,
    #[serde(default)]
    pub img: String,
}

/// Named encounter zone. Declared only; encounters are never rolled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Area {
    pub name: String,
    #[serde(default, alias = "Rectanges")]
    pub rectangles: Vec<Vec<Location>>,
    #[serde(default)]
    pub encounters: Vec<Encounter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RoomMetadata {
    pub npcs: Vec<Npc>,
    pub portals: Vec<Portal>,
    pub areas: Vec<Area>,
}

/// Registry entry: the identifiers and display name of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDef {
    /// Stable string key, also the resource directory name.
    pub key: String,
    /// Small integer id used by the legacy session format.
    pub index: u32,
    pub name: String,
}

impl RoomDef {
    pub fn new(key: &str, index: u32, name: &str) -> Self {
        Self {
            key: key.to_string(),
            index,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomLookupError {
    #[error("unknown room key '{0}'")]
    UnknownKey(String),
    /// Signed so out-of-range persisted indices can be reported as-is.
    #[error("unknown room index {0}")]
    UnknownIndex(i64),
}

/// Immutable catalog of rooms, built once from configuration.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: Vec<RoomDef>,
    default: usize,
}

impl RoomRegistry {
    /// Build a registry. `default_key` of `None` picks the first room.
    pub fn new(rooms: Vec<RoomDef>, default_key: Option<&str>) -> Result<Self, ConfigError> {
        if rooms.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }
        for (i, room) in rooms.iter().enumerate() {
            let earlier = &rooms[..i];
            if earlier.iter().any(|r| r.key == room.key) {
                return Err(ConfigError::DuplicateRoomKey(room.key.clone()));
            }
            if earlier.iter().any(|r| r.index == room.index) {
                return Err(ConfigError::DuplicateRoomIndex(room.index));
            }
        }
        let default = match default_key {
            Some(key) => rooms
                .iter()
                .position(|r| r.key == key)
                .ok_or_else(|| ConfigError::UnknownDefaultRoom(key.to_string()))?,
            None => 0,
        };
        Ok(Self { rooms, default })
    }

    pub fn resolve(&self, key: &str) -> Result<&RoomDef, RoomLookupError> {
        self.rooms
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| RoomLookupError::UnknownKey(key.to_string()))
    }

    pub fn resolve_index(&self, index: u32) -> Result<&RoomDef, RoomLookupError> {
        self.rooms
            .iter()
            .find(|r| r.index == index)
            .ok_or(RoomLookupError::UnknownIndex(index.into()))
    }

    pub fn default_room(&self) -> &RoomDef {
        &self.rooms[self.default]
    }

    pub fn rooms(&self) -> &[RoomDef] {
        &self.rooms
    }
}

/// A resolved room with its terrain attached.
#[derive(Debug, Clone)]
pub struct Room {
    def: RoomDef,
    grid: TerrainGrid,
    meta: RoomMetadata,
}

impl Room {
    /// Attach terrain and metadata to a resolved room.
    ///
    /// A missing or invalid map is an error. Missing metadata means an empty
    /// room; malformed metadata is an error.
    pub fn load(def: &RoomDef, resources: &dyn ResourceSource) -> Result<Self, ResourceLoadError> {
        let text = resources.load_grid(&def.key)?;
        let grid = TerrainGrid::parse(&text).map_err(|source| ResourceLoadError::Grid {
            room: def.key.clone(),
            source,
        })?;
        let meta: RoomMetadata = match resources.load_metadata(&def.key)? {
            Some(json) => serde_json::from_str(&json).map_err(|source| ResourceLoadError::Metadata {
                room: def.key.clone(),
                source,
            })?,
            None => RoomMetadata::default(),
        };
        debug!(
            room = %def.key,
            width = grid.width(),
            height = grid.height(),
            npcs = meta.npcs.len(),
            "room_loaded"
        );
        Ok(Self::from_parts(def.clone(), grid, meta))
    }

    pub fn from_parts(def: RoomDef, grid: TerrainGrid, meta: RoomMetadata) -> Self {
        Self { def, grid, meta }
    }

    pub fn def(&self) -> &RoomDef {
        &self.def
    }

    pub fn key(&self) -> &str {
        &self.def.key
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    pub fn metadata(&self) -> &RoomMetadata {
        &self.meta
    }

    pub fn tile_symbol(&self, x: i32, y: i32) -> char {
        self.grid.lookup(x, y)
    }

    pub fn tile_class<'t>(&self, x: i32, y: i32, tiles: &'t TileTable) -> &'t str {
        tiles.class_of(self.tile_symbol(x, y))
    }

    pub fn tile_color<'t>(&self, x: i32, y: i32, tiles: &'t TileTable) -> &'t str {
        tiles.color_of(self.tile_symbol(x, y))
    }

    pub fn npc_at(&self, x: i32, y: i32) -> Option<&Npc> {
        self.meta.npcs.iter().find(|n| n.loc.x == x && n.loc.y == y)
    }

    pub fn npc_here(&self, x: i32, y: i32) -> bool {
        self.npc_at(x, y).is_some()
    }

    /// Sprite of the NPC standing at `(x, y)`, or `""`.
    pub fn npc_img(&self, x: i32, y: i32) -> &str {
        self.npc_at(x, y).map(|n| n.img.as_str()).unwrap_or("")
    }
}
