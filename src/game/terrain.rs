//! Terrain grid — the per-room tile array and its center-relative lookup.
//!
//! Coordinates handed to [`TerrainGrid::lookup`] are offsets from the grid's
//! own center, not raw array indices. The player's position is stored in the
//! same frame, so `(0, 0)` is always the middle tile of the room.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbol returned for any lookup that falls off the grid.
pub const OUT_OF_BOUNDS: char = 'Q';

/// Semantic terrain kind behind a tile symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainKind {
    Desert,
    Mountain,
    Water,
    Grass,
    /// Out-of-bounds sentinel.
    Abyss,
}

impl TerrainKind {
    pub fn is_passable(self) -> bool {
        matches!(self, TerrainKind::Desert | TerrainKind::Grass)
    }
}

/// What to do with a tile symbol that has no entry in the [`TileTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTilePolicy {
    Passable,
    Impassable,
}

/// Unmapped symbols are walkable unless configured otherwise.
pub const DEFAULT_UNKNOWN_TILE_POLICY: UnknownTilePolicy = UnknownTilePolicy::Passable;

/// One row of the tile lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileInfo {
    pub symbol: char,
    pub kind: TerrainKind,
    /// CSS class used by the renderer.
    pub class: String,
    pub color: String,
}

impl TileInfo {
    fn new(symbol: char, kind: TerrainKind, class: &str, color: &str) -> Self {
        Self {
            symbol,
            kind,
            class: class.to_string(),
            color: color.to_string(),
        }
    }
}

/// Symbol → terrain/presentation table. Built once with the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTable {
    entries: Vec<TileInfo>,
}

impl Default for TileTable {
    fn default() -> Self {
        Self::new(vec![
            TileInfo::new('.', TerrainKind::Desert, "desert", "#FFE4B5"),
            TileInfo::new('^', TerrainKind::Mountain, "mountain", "#444444"),
            TileInfo::new('~', TerrainKind::Water, "water", "#4682B4"),
            TileInfo::new('#', TerrainKind::Grass, "grass", "#9ACD32"),
            TileInfo::new(OUT_OF_BOUNDS, TerrainKind::Abyss, "abyss", "#000000"),
        ])
    }
}

impl TileTable {
    pub fn new(entries: Vec<TileInfo>) -> Self {
        Self { entries }
    }

    pub fn get(&self, symbol: char) -> Option<&TileInfo> {
        self.entries.iter().find(|t| t.symbol == symbol)
    }

    pub fn entries(&self) -> &[TileInfo] {
        &self.entries
    }

    /// Whether a tile may be entered, applying `policy` to unmapped symbols.
    /// [`OUT_OF_BOUNDS`] is never enterable, whatever the table says.
    pub fn is_passable(&self, symbol: char, policy: UnknownTilePolicy) -> bool {
        if symbol == OUT_OF_BOUNDS {
            return false;
        }
        match self.get(symbol) {
            Some(info) => info.kind.is_passable(),
            None => policy == UnknownTilePolicy::Passable,
        }
    }

    /// Display class for a symbol; `"unknown"` when unmapped.
    pub fn class_of(&self, symbol: char) -> &str {
        self.get(symbol).map(|t| t.class.as_str()).unwrap_or("unknown")
    }

    /// Display color for a symbol; empty when unmapped.
    pub fn color_of(&self, symbol: char) -> &str {
        self.get(symbol).map(|t| t.color.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("terrain grid has no rows")]
    Empty,
    #[error("terrain row {row} has {found} tiles, expected {expected}")]
    Jagged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Rectangular tile grid. Rows are guaranteed equal length and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainGrid {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl TerrainGrid {
    /// Build a grid from rows, rejecting empty or jagged input.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let rows: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
        let width = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(GridError::Empty),
        };
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Jagged {
                    row: i,
                    expected: width,
                    found: row.len(),
                });
            }
        }
        Ok(Self { rows, width })
    }

    /// Parse a map resource: one row per line, trailing blank lines dropped.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        Self::from_rows(&lines)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|r| r.iter().collect())
    }

    /// Tile symbol at an offset from the grid center.
    ///
    /// Negative indices clamp to 0; indices past the far edge yield
    /// [`OUT_OF_BOUNDS`]. Never fails.
    pub fn lookup(&self, dx: i32, dy: i32) -> char {
        let ix = (self.width / 2) as i64 + dx as i64;
        let iy = (self.height() / 2) as i64 + dy as i64;
        let ix = ix.max(0) as usize;
        let iy = iy.max(0) as usize;
        if ix >= self.width || iy >= self.height() {
            return OUT_OF_BOUNDS;
        }
        self.rows[iy][ix]
    }

    /// Classified tile at an offset, if the symbol is in `table`.
    pub fn tile<'t>(&self, dx: i32, dy: i32, table: &'t TileTable) -> Option<&'t TileInfo> {
        table.get(self.lookup(dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TerrainGrid {
        TerrainGrid::from_rows(&["#####", "#...#", "#.^.#", "#...#", "#####"]).unwrap()
    }

    #[test]
    fn center_is_origin() {
        let g = sample();
        assert_eq!(g.lookup(0, 0), '^');
        assert_eq!(g.lookup(0, -1), '.');
        assert_eq!(g.lookup(-1, 0), '.');
        assert_eq!(g.lookup(2, 2), '#');
    }

    #[test]
    fn negative_indices_clamp_to_zero() {
        let g = TerrainGrid::from_rows(&["ab.", "cd.", "..."]).unwrap();
        // center is (1,1); dx=-5 → index -4 → clamped to column 0
        assert_eq!(g.lookup(-5, -1), 'a');
        assert_eq!(g.lookup(0, -9), 'b');
        assert_eq!(g.lookup(-9, -9), 'a');
    }

    #[test]
    fn far_edge_returns_sentinel() {
        let g = sample();
        assert_eq!(g.lookup(3, 0), OUT_OF_BOUNDS);
        assert_eq!(g.lookup(0, 3), OUT_OF_BOUNDS);
        assert_eq!(g.lookup(i32::MAX, 0), OUT_OF_BOUNDS);
        // low side never yields the sentinel
        assert_eq!(g.lookup(i32::MIN, 0), '#');
    }

    #[test]
    fn even_sized_grid_center_floors() {
        let g = TerrainGrid::from_rows(&["abcd", "efgh"]).unwrap();
        assert_eq!(g.lookup(0, 0), 'g');
        assert_eq!(g.lookup(1, 0), 'h');
        assert_eq!(g.lookup(2, 0), OUT_OF_BOUNDS);
    }

    #[test]
    fn rejects_jagged_rows() {
        let err = TerrainGrid::from_rows(&["...", "..", "..."]).unwrap_err();
        assert_eq!(
            err,
            GridError::Jagged {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn rejects_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(TerrainGrid::from_rows(&empty), Err(GridError::Empty));
        assert_eq!(TerrainGrid::parse("\n\n"), Err(GridError::Empty));
    }

    #[test]
    fn parse_drops_trailing_newline() {
        let g = TerrainGrid::parse("..#\r\n.^.\n~..\n").unwrap();
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 3);
        assert_eq!(g.rows().collect::<Vec<_>>(), vec!["..#", ".^.", "~.."]);
    }

    #[test]
    fn table_classifies_symbols() {
        let table = TileTable::default();
        assert_eq!(table.class_of('.'), "desert");
        assert_eq!(table.color_of('~'), "#4682B4");
        assert_eq!(table.class_of('Q'), "abyss");
        assert_eq!(table.class_of('X'), "unknown");
        assert_eq!(table.color_of('X'), "");
        assert!(table.is_passable('#', DEFAULT_UNKNOWN_TILE_POLICY));
        assert!(!table.is_passable('^', DEFAULT_UNKNOWN_TILE_POLICY));
        assert!(!table.is_passable(OUT_OF_BOUNDS, DEFAULT_UNKNOWN_TILE_POLICY));
        assert!(table.is_passable('X', UnknownTilePolicy::Passable));
        assert!(!table.is_passable('X', UnknownTilePolicy::Impassable));
    }

    #[test]
    fn sentinel_is_never_passable() {
        let walkable_abyss = TileTable::new(vec![TileInfo::new(
            OUT_OF_BOUNDS,
            TerrainKind::Grass,
            "grass",
            "#9ACD32",
        )]);
        assert!(!walkable_abyss.is_passable(OUT_OF_BOUNDS, UnknownTilePolicy::Passable));
        let without_abyss = TileTable::new(Vec::new());
        assert!(!without_abyss.is_passable(OUT_OF_BOUNDS, UnknownTilePolicy::Passable));
        assert!(without_abyss.is_passable('.', UnknownTilePolicy::Passable));
    }

    #[test]
    fn tile_classifies_lookup() {
        let g = sample();
        let table = TileTable::default();
        assert_eq!(g.tile(0, 0, &table).map(|t| t.kind), Some(TerrainKind::Mountain));
        assert_eq!(g.tile(9, 9, &table).map(|t| t.kind), Some(TerrainKind::Abyss));
    }
}
