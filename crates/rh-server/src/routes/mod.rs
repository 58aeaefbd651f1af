//! Route handlers for the HTTP API.

pub mod contents;
pub mod health;
pub mod movies;
pub mod stream;
pub mod streaming_helpers;
pub mod tv_shows;
pub mod videos;
