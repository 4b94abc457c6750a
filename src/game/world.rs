//! The world — configuration, room registry, tile table and resource source,
//! built once and shared read-only by every request.

use std::sync::OnceLock;

use tracing::info;

use crate::assets::{EmbeddedResources, ResourceLoadError, ResourceSource};
use crate::config::{ConfigError, WorldConfig};
use crate::game::codec::SessionCodec;
use crate::game::movement::MovementEngine;
use crate::game::room::{Room, RoomDef, RoomRegistry};
use crate::game::terrain::TileTable;

static WORLD: OnceLock<World> = OnceLock::new();

pub struct World {
    config: WorldConfig,
    registry: RoomRegistry,
    tiles: TileTable,
    resources: Box<dyn ResourceSource>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Build a world backed by the embedded room resources.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        Self::with_resources(config, EmbeddedResources)
    }

    pub fn with_resources(
        config: WorldConfig,
        resources: impl ResourceSource + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = RoomRegistry::new(config.rooms.clone(), config.default_room.as_deref())?;
        let tiles = TileTable::new(config.tiles.clone());
        Ok(Self {
            config,
            registry,
            tiles,
            resources: Box::new(resources),
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn tiles(&self) -> &TileTable {
        &self.tiles
    }

    pub fn resources(&self) -> &dyn ResourceSource {
        self.resources.as_ref()
    }

    /// Codec writing the configured session format.
    pub fn codec(&self) -> SessionCodec<'_> {
        SessionCodec::new(&self.registry, self.config.session_format)
    }

    pub fn load_room(&self, def: &RoomDef) -> Result<Room, ResourceLoadError> {
        Room::load(def, self.resources())
    }

    pub fn movement<'a>(&'a self, room: &'a Room) -> MovementEngine<'a> {
        MovementEngine::new(room.grid(), &self.tiles, self.config.unknown_tile_policy)
    }
}

/// Install a custom world. Fails once a world exists.
pub fn install(config: WorldConfig) -> Result<&'static World, ConfigError> {
    let world = World::new(config)?;
    WORLD
        .set(world)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    let world = current()?;
    info!(
        rooms = world.registry.rooms().len(),
        default_room = %world.registry.default_room().key,
        "world_installed"
    );
    Ok(world)
}

/// The shared world, built from the default config on first use.
pub fn current() -> Result<&'static World, ConfigError> {
    if let Some(world) = WORLD.get() {
        return Ok(world);
    }
    let world = World::new(WorldConfig::default())?;
    Ok(WORLD.get_or_init(|| world))
}
