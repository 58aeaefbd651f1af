//! rh-core: shared types, IDs, errors, configuration, and the content domain.
//!
//! Every other rh-* crate depends on this one. It holds the typed
//! identifiers, the unified error type, the JSON configuration, and the
//! content aggregate (content, movie, tv show, episode, video, thumbnail)
//! together with the rules each entity enforces on construction.

pub mod config;
pub mod domain;
pub mod error;
pub mod ids;

// Re-export the most commonly used items at the crate root.
pub use domain::DomainError;
pub use error::{Error, Result};
pub use ids::*;
