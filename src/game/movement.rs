//! Movement — one-step directional moves validated against the terrain.
//!
//! A request carries at most one vertical and one horizontal component. Each
//! component is checked against the tile one step away from the *pre-move*
//! position and applied independently, so a request can move diagonally.

use serde::{Deserialize, Serialize};

use crate::game::terrain::{TerrainGrid, TileTable, UnknownTilePolicy};

/// Player position in grid-center coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// One unit in `direction`, or `None` if that leaves the `i32` range.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Up decreases y, right increases x.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// Directions requested for a single turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveRequest {
    pub vertical: Option<Direction>,
    pub horizontal: Option<Direction>,
}

impl MoveRequest {
    /// Build from raw query flags. Up beats down and left beats right.
    pub fn from_flags(up: bool, down: bool, left: bool, right: bool) -> Self {
        let vertical = if up {
            Some(Direction::Up)
        } else if down {
            Some(Direction::Down)
        } else {
            None
        };
        let horizontal = if left {
            Some(Direction::Left)
        } else if right {
            Some(Direction::Right)
        } else {
            None
        };
        Self {
            vertical,
            horizontal,
        }
    }

    pub fn single(direction: Direction) -> Self {
        if direction.is_vertical() {
            Self {
                vertical: Some(direction),
                horizontal: None,
            }
        } else {
            Self {
                vertical: None,
                horizontal: Some(direction),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertical.is_none() && self.horizontal.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResult {
    NotRequested,
    Applied,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub position: Position,
    pub vertical: StepResult,
    pub horizontal: StepResult,
}

impl MoveOutcome {
    pub fn moved(&self) -> bool {
        self.vertical == StepResult::Applied || self.horizontal == StepResult::Applied
    }
}

/// Passability rules bound to one room's terrain.
#[derive(Debug, Clone, Copy)]
pub struct MovementEngine<'a> {
    grid: &'a TerrainGrid,
    tiles: &'a TileTable,
    unknown: UnknownTilePolicy,
}

impl<'a> MovementEngine<'a> {
    pub fn new(grid: &'a TerrainGrid, tiles: &'a TileTable, unknown: UnknownTilePolicy) -> Self {
        Self {
            grid,
            tiles,
            unknown,
        }
    }

    /// Whether the tile one step from `from` in `direction` may be entered.
    /// A step that would overflow the coordinate range is never allowed.
    pub fn can_move(&self, from: Position, direction: Direction) -> bool {
        from.step(direction).is_some_and(|dest| {
            self.tiles
                .is_passable(self.grid.lookup(dest.x, dest.y), self.unknown)
        })
    }

    /// Apply a request. Both axes are judged from `from`, then combined.
    pub fn apply_move(&self, from: Position, request: &MoveRequest) -> MoveOutcome {
        let mut position = from;
        let vertical = self.judge(from, request.vertical);
        if let (StepResult::Applied, Some(dest)) =
            (vertical, request.vertical.and_then(|d| from.step(d)))
        {
            position.y = dest.y;
        }
        let horizontal = self.judge(from, request.horizontal);
        if let (StepResult::Applied, Some(dest)) =
            (horizontal, request.horizontal.and_then(|d| from.step(d)))
        {
            position.x = dest.x;
        }
        MoveOutcome {
            position,
            vertical,
            horizontal,
        }
    }

    fn judge(&self, from: Position, direction: Option<Direction>) -> StepResult {
        match direction {
            None => StepResult::NotRequested,
            Some(d) if self.can_move(from, d) => StepResult::Applied,
            Some(_) => StepResult::Blocked,
        }
    }
}
