//! Database query modules.

pub mod contents;
pub mod episodes;
pub mod thumbnails;
pub mod videos;

use rh_core::Error;
use rusqlite::ffi;

/// Translate a rusqlite error, surfacing key collisions as [`Error::Conflict`].
pub(crate) fn db_err(e: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = e {
        if matches!(
            failure.extended_code,
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ) {
            return Error::Conflict("a record with the same key already exists".into());
        }
    }
    Error::database(e)
}

/// Whether `e` is a UNIQUE violation whose message names `column`.
pub(crate) fn unique_violation_on(e: &rusqlite::Error, column: &str) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(failure, Some(msg)) => {
            failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE && msg.contains(column)
        }
        _ => false,
    }
}
