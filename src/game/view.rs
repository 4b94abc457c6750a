//! Viewport — the window of tiles around the player handed to the renderer.

use serde::Serialize;

use crate::game::movement::Position;
use crate::game::room::Room;
use crate::game::terrain::{TileTable, UnknownTilePolicy};

pub const STATUS_BLURB: &str = "Status: All good!";

/// `coord - radius ..= coord + radius`.
pub fn map_range(coord: i32, radius: i32) -> Vec<i32> {
    (coord.saturating_sub(radius)..=coord.saturating_add(radius)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NpcView {
    pub name: String,
    pub img: String,
    pub interaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub x: i32,
    pub y: i32,
    pub symbol: char,
    pub class: String,
    pub color: String,
    pub passable: bool,
    /// The player stands here.
    pub player: bool,
    pub npc: Option<NpcView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub room_key: String,
    pub room_name: String,
    pub position: Position,
    pub status: &'static str,
    pub xs: Vec<i32>,
    pub ys: Vec<i32>,
    /// Row-major: `rows[i][j]` is the tile at `(xs[j], ys[i])`.
    pub rows: Vec<Vec<TileView>>,
}

impl View {
    pub fn build(
        room: &Room,
        position: Position,
        radius: i32,
        tiles: &TileTable,
        unknown: UnknownTilePolicy,
    ) -> Self {
        let xs = map_range(position.x, radius);
        let ys = map_range(position.y, radius);
        let rows = ys
            .iter()
            .map(|&y| {
                xs.iter()
                    .map(|&x| {
                        let symbol = room.tile_symbol(x, y);
                        TileView {
                            x,
                            y,
                            symbol,
                            class: tiles.class_of(symbol).to_string(),
                            color: tiles.color_of(symbol).to_string(),
                            passable: tiles.is_passable(symbol, unknown),
                            player: x == position.x && y == position.y,
                            npc: room.npc_at(x, y).map(|n| NpcView {
                                name: n.name.clone(),
                                img: n.img.clone(),
                                interaction: n.interaction.clone(),
                            }),
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            room_key: room.key().to_string(),
            room_name: room.name().to_string(),
            position,
            status: STATUS_BLURB,
            xs,
            ys,
            rows,
        }
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&TileView> {
        self.rows.iter().flatten().find(|t| t.x == x && t.y == y)
    }
}
