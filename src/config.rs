//! World configuration — the room catalog, tile table, view radius, session
//! format and cookie attributes.
//!
//! The defaults are the compiled-in catalog. A host may replace them once, at
//! startup, by handing a JSON document to [`crate::init_world`]; every field
//! is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::codec::SessionFormat;
use crate::game::room::RoomDef;
use crate::game::terrain::{DEFAULT_UNKNOWN_TILE_POLICY, TileInfo, TileTable, UnknownTilePolicy};

/// Half-width of the visible window around the player (2 → 5×5 tiles).
pub const DEFAULT_VIEW_RADIUS: i32 = 2;

/// Largest accepted view radius (65×65 tiles).
pub const MAX_VIEW_RADIUS: i32 = 32;

/// One week, in seconds.
pub const DEFAULT_COOKIE_MAX_AGE: u32 = 3600 * 24 * 7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("room registry is empty")]
    EmptyRegistry,
    #[error("duplicate room key '{0}'")]
    DuplicateRoomKey(String),
    #[error("duplicate room index {0}")]
    DuplicateRoomIndex(u32),
    #[error("default room '{0}' is not in the registry")]
    UnknownDefaultRoom(String),
    #[error("view radius must not be negative, got {0}")]
    NegativeViewRadius(i32),
    #[error("view radius {0} exceeds the maximum of {MAX_VIEW_RADIUS}")]
    ViewRadiusTooLarge(i32),
    #[error("invalid world config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("world is already initialized")]
    AlreadyInitialized,
}

/// Attributes of the session cookie written back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    pub max_age: u32,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "game".to_string(),
            max_age: DEFAULT_COOKIE_MAX_AGE,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
        }
    }
}

impl CookieConfig {
    /// Format a `Set-Cookie` header value carrying `value`.
    pub fn set_cookie(&self, value: &str) -> String {
        let mut h = format!("{}={}; Max-Age={}; Path={}", self.name, value, self.max_age, self.path);
        if let Some(domain) = &self.domain {
            h.push_str("; Domain=");
            h.push_str(domain);
        }
        if self.secure {
            h.push_str("; Secure");
        }
        if self.http_only {
            h.push_str("; HttpOnly");
        }
        h
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Room catalog, in registry order.
    pub rooms: Vec<RoomDef>,
    /// Key of the room fresh sessions start in. `None` → first room.
    pub default_room: Option<String>,
    pub view_radius: i32,
    pub unknown_tile_policy: UnknownTilePolicy,
    /// Format used when writing sessions. Both formats are always readable.
    pub session_format: SessionFormat,
    pub cookie: CookieConfig,
    pub tiles: Vec<TileInfo>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            rooms: vec![
                RoomDef::new("euniciar", 0, "Continent of Euniciar"),
                RoomDef::new("patricolia", 1, "Land of Patricolia"),
            ],
            default_room: None,
            view_radius: DEFAULT_VIEW_RADIUS,
            unknown_tile_policy: DEFAULT_UNKNOWN_TILE_POLICY,
            session_format: SessionFormat::Keyed,
            cookie: CookieConfig::default(),
            tiles: TileTable::default().entries().to_vec(),
        }
    }
}

impl WorldConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the bounds the registry doesn't cover.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_radius < 0 {
            return Err(ConfigError::NegativeViewRadius(self.view_radius));
        }
        if self.view_radius > MAX_VIEW_RADIUS {
            return Err(ConfigError::ViewRadiusTooLarge(self.view_radius));
        }
        Ok(())
    }
}
