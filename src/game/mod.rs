//! Game core — terrain, rooms, movement, and the per-request session cycle.
//!
//! Every request rebuilds its state from the persisted session value; only
//! the [`world::World`] (registry, tile table, resources) outlives a request.

pub mod codec;
pub mod movement;
pub mod room;
pub mod session;
pub mod terrain;
pub mod view;
pub mod world;
