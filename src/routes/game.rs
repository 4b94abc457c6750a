//! `/quest/*` routes — the game page, the room list, and a liveness ping.
//!
//! Responses are JSON documents for the page renderer. The game route also
//! returns the `Set-Cookie` value the host must send back to the client.

use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::game::movement::{MoveOutcome, MoveRequest};
use crate::game::session::{TurnRequest, play_turn};
use crate::game::view::View;
use crate::game::world::{self, World};
use crate::routes::util::{get_param, has_param, parse_cookie_header, parse_query};

pub const PAGE_TITLE: &str = "Game Page";

#[derive(Debug, Serialize)]
struct GameResponse {
    title: &'static str,
    set_cookie: String,
    /// Why the session was started over, if it was.
    recovered: Option<&'static str>,
    moved: bool,
    outcome: MoveOutcome,
    view: View,
}

#[derive(Debug, Serialize)]
struct RoomEntry<'a> {
    index: u32,
    key: &'a str,
    name: &'a str,
}

pub fn error_json(message: &str) -> String {
    json!({ "error": message }).to_string()
}

// ── GET /quest/ping ────────────────────────────────────────────────

pub fn handle_ping_get(_query: &str) -> String {
    json!({ "message": "pong" }).to_string()
}

// ── GET /quest/game ────────────────────────────────────────────────

/// Handle GET /quest/game?up|down|left|right|reset
/// `cookie` is the raw `Cookie` request header.
pub fn handle_game_get(query: &str, cookie: &str) -> String {
    match world::current() {
        Ok(world) => render_turn(world, query, cookie),
        Err(e) => error_json(&e.to_string()),
    }
}

/// Build the turn from request inputs and render the response.
pub fn render_turn(world: &World, query: &str, cookie: &str) -> String {
    let params = parse_query(query);
    let cookies = parse_cookie_header(cookie);
    let cookie_config = &world.config().cookie;

    let request = TurnRequest {
        persisted: get_param(&cookies, &cookie_config.name).map(str::to_string),
        reset: has_param(&params, "reset"),
        movement: MoveRequest::from_flags(
            has_param(&params, "up"),
            has_param(&params, "down"),
            has_param(&params, "left"),
            has_param(&params, "right"),
        ),
    };

    match play_turn(world, &request) {
        Ok(turn) => {
            let response = GameResponse {
                title: PAGE_TITLE,
                set_cookie: cookie_config.set_cookie(&turn.persisted),
                recovered: turn.fresh.as_ref().map(|r| r.label()),
                moved: turn.outcome.moved(),
                outcome: turn.outcome,
                view: turn.view,
            };
            serde_json::to_string(&response).unwrap_or_else(|e| error_json(&e.to_string()))
        }
        Err(e) => {
            warn!(error = %e, "turn_failed");
            error_json(&e.to_string())
        }
    }
}

// ── GET /quest/rooms ───────────────────────────────────────────────

pub fn handle_rooms_get(_query: &str) -> String {
    match world::current() {
        Ok(world) => render_rooms(world),
        Err(e) => error_json(&e.to_string()),
    }
}

fn render_rooms(world: &World) -> String {
    let rooms: Vec<RoomEntry<'_>> = world
        .registry()
        .rooms()
        .iter()
        .map(|r| RoomEntry {
            index: r.index,
            key: &r.key,
            name: &r.name,
        })
        .collect();
    serde_json::to_string(&rooms).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ResourceLoadError, ResourceSource};
    use crate::config::WorldConfig;
    use crate::game::codec::SessionFormat;
    use serde_json::Value;

    fn legacy_world() -> World {
        World::new(WorldConfig {
            session_format: SessionFormat::Legacy,
            ..WorldConfig::default()
        })
        .unwrap()
    }

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn ping_pongs() {
        assert_eq!(parse(&handle_ping_get(""))["message"], "pong");
    }

    #[test]
    fn first_visit_sets_cookie() {
        let v = parse(&render_turn(&legacy_world(), "", ""));
        assert_eq!(v["title"], "Game Page");
        assert_eq!(v["recovered"], "missing");
        let cookie = v["set_cookie"].as_str().unwrap();
        assert!(cookie.starts_with("game=0,0,0;"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn move_up_from_cookie() {
        let v = parse(&render_turn(&legacy_world(), "?up", "game=0,0,0"));
        assert_eq!(v["moved"], true);
        assert!(v["recovered"].is_null());
        assert_eq!(v["view"]["position"]["y"], -1);
        assert!(v["set_cookie"].as_str().unwrap().starts_with("game=0,-1,0;"));
        assert_eq!(v["view"]["xs"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn reset_flag_overrides_cookie() {
        let v = parse(&render_turn(&legacy_world(), "?reset=1", "game=3,3,1"));
        assert_eq!(v["recovered"], "reset");
        assert_eq!(v["view"]["room_key"], "euniciar");
        assert_eq!(v["view"]["position"]["x"], 0);
    }

    #[test]
    fn corrupt_cookie_recovers() {
        let v = parse(&render_turn(&legacy_world(), "", "game=oops"));
        assert_eq!(v["recovered"], "corrupt");
        assert!(v["set_cookie"].as_str().unwrap().starts_with("game=0,0,0;"));
    }

    #[test]
    fn keyed_cookie_roundtrips_through_route() {
        let world = World::new(WorldConfig::default()).unwrap();
        let first = parse(&render_turn(&world, "?left", ""));
        let header = first["set_cookie"].as_str().unwrap();
        let value = header.split(';').next().unwrap();
        let second = parse(&render_turn(&world, "", value));
        assert!(second["recovered"].is_null());
        assert_eq!(second["view"]["position"], first["view"]["position"]);
    }

    #[test]
    fn resource_failure_is_reported() {
        struct Missing;
        impl ResourceSource for Missing {
            fn load_grid(&self, room: &str) -> Result<String, ResourceLoadError> {
                Err(ResourceLoadError::NotFound {
                    resource: "map",
                    room: room.to_string(),
                })
            }
            fn load_metadata(&self, _room: &str) -> Result<Option<String>, ResourceLoadError> {
                Ok(None)
            }
        }
        let world = World::with_resources(WorldConfig::default(), Missing).unwrap();
        let v = parse(&render_turn(&world, "", ""));
        assert!(v["error"].as_str().unwrap().contains("euniciar"));
    }

    #[test]
    fn rooms_are_listed() {
        let v = parse(&render_rooms(&legacy_world()));
        let rooms = v.as_array().unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[1]["key"], "patricolia");
        assert_eq!(rooms[1]["index"], 1);
    }
}
