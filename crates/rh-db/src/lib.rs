//! rh-db: persistence for the content aggregate.
//!
//! SQLite storage with connection pooling, embedded migrations, row models,
//! and query modules. Every aggregate write runs in a single transaction.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
