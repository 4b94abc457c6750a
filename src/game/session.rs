//! Session state — the player's position and room, persisted between requests.
//!
//! Nothing is kept in memory across requests: every turn decodes the
//! persisted value, loads the room, applies at most one move request,
//! re-encodes, and builds the view. A missing or unreadable value is replaced
//! by a fresh state; only resource failures reach the caller.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::assets::ResourceLoadError;
use crate::game::codec::{DecodeError, EncodeError, SessionCodec};
use crate::game::movement::{MoveOutcome, MoveRequest, Position};
use crate::game::room::RoomRegistry;
use crate::game::view::View;
use crate::game::world::World;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub position: Position,
    /// Registry key of the current room.
    pub room: String,
}

impl SessionState {
    pub fn new(position: Position, room: &str) -> Self {
        Self {
            position,
            room: room.to_string(),
        }
    }

    /// Origin of the registry's default room.
    pub fn fresh(registry: &RoomRegistry) -> Self {
        Self::new(Position::ORIGIN, &registry.default_room().key)
    }

    /// Decode a persisted value, falling back to a fresh state.
    ///
    /// `reset` discards whatever was persisted.
    pub fn restore(raw: Option<&str>, reset: bool, codec: &SessionCodec<'_>) -> Restored {
        let fresh = |reason| Restored {
            state: SessionState::fresh(codec.registry()),
            fresh: Some(reason),
        };
        if reset {
            return fresh(FreshReason::Reset);
        }
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return fresh(FreshReason::Missing);
        };
        match codec.decode(raw) {
            Ok(state) => Restored { state, fresh: None },
            Err(error) => {
                warn!(error = %error, "session_decode_failed");
                fresh(FreshReason::Corrupt(error))
            }
        }
    }
}

/// Why a fresh state replaced the persisted one.
#[derive(Debug)]
pub enum FreshReason {
    Missing,
    Reset,
    Corrupt(DecodeError),
}

impl FreshReason {
    pub fn label(&self) -> &'static str {
        match self {
            FreshReason::Missing => "missing",
            FreshReason::Reset => "reset",
            FreshReason::Corrupt(_) => "corrupt",
        }
    }
}

#[derive(Debug)]
pub struct Restored {
    pub state: SessionState,
    pub fresh: Option<FreshReason>,
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Resource(#[from] ResourceLoadError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// One request's worth of input.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    /// Persisted session value, if the client sent one.
    pub persisted: Option<String>,
    pub reset: bool,
    pub movement: MoveRequest,
}

#[derive(Debug)]
pub struct Turn {
    pub state: SessionState,
    pub outcome: MoveOutcome,
    /// Encoded state to write back.
    pub persisted: String,
    pub fresh: Option<FreshReason>,
    pub view: View,
}

/// Load state, resolve the room, apply the move, re-encode, build the view.
pub fn play_turn(world: &World, request: &TurnRequest) -> Result<Turn, TurnError> {
    let codec = world.codec();
    let Restored { mut state, fresh } =
        SessionState::restore(request.persisted.as_deref(), request.reset, &codec);

    let def = match world.registry().resolve(&state.room) {
        Ok(def) => def,
        Err(error) => {
            warn!(error = %error, "session_room_unknown");
            state = SessionState::fresh(world.registry());
            world.registry().default_room()
        }
    };
    let room = world.load_room(def)?;

    let outcome = world.movement(&room).apply_move(state.position, &request.movement);
    state.position = outcome.position;
    debug!(
        room = %state.room,
        x = state.position.x,
        y = state.position.y,
        moved = outcome.moved(),
        "turn_applied"
    );

    let persisted = codec.encode(&state)?;
    let view = View::build(
        &room,
        state.position,
        world.config().view_radius,
        world.tiles(),
        world.config().unknown_tile_policy,
    );
    Ok(Turn {
        state,
        outcome,
        persisted,
        fresh,
        view,
    })
}
