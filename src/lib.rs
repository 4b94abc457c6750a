//! Quest in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, cookie)` for the host bridge
//! to call, and `init_world(config_json)` to replace the built-in world
//! before the first request. Uses `matchit` for URL routing.
//!
//! The server holds no per-player state: the player's position and room
//! travel in the `game` cookie and are re-read on every request.

use wasm_bindgen::prelude::*;

pub mod assets;
pub mod config;
pub mod game;
pub mod routes;

use routes::game::error_json;

/// Process an HTTP-like request and return a JSON body.
///
/// # Arguments
/// * `method` — HTTP method (e.g., "GET")
/// * `path`   — URL path (e.g., "/quest/game")
/// * `query`  — Query string (e.g., "?up&right")
/// * `cookie` — Raw `Cookie` request header. Empty when the client sent none.
///
/// # Returns
/// A JSON document. The game route includes a `set_cookie` value that the
/// host must send back as the `Set-Cookie` header.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, cookie: &str) -> String {
    let mut router = matchit::Router::new();

    router.insert("/quest/ping", "ping").ok();
    router.insert("/quest/game", "game").ok();
    router.insert("/quest/", "game").ok();
    router.insert("/quest/rooms", "rooms").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("ping", "GET") => routes::game::handle_ping_get(query),
            ("game", "GET") => routes::game::handle_game_get(query, cookie),
            ("rooms", "GET") => routes::game::handle_rooms_get(query),
            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

/// Install a world config (JSON) before the first request.
///
/// Fields left out keep their built-in defaults. Fails on malformed JSON, an
/// invalid catalog, or when a world is already in use.
#[wasm_bindgen]
pub fn init_world(config_json: &str) -> Result<(), String> {
    let config = config::WorldConfig::from_json(config_json).map_err(|e| e.to_string())?;
    game::world::install(config).map(|_| ()).map_err(|e| e.to_string())
}

fn not_found() -> String {
    error_json("404 — route not found")
}

fn method_not_allowed() -> String {
    error_json("405 — method not allowed")
}
