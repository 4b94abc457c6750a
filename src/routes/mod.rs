//! Route handlers. Each returns the response body as a `String`.

pub mod game;
pub mod util;
