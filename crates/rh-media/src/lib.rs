//! rh-media: upload staging, content sniffing, and local blob storage.
//!
//! - [`sniff`] -- magic-byte MIME detection over the first 512 bytes and
//!   per-purpose allow-lists ([`AssetKind`]).
//! - [`spool`] -- spools an incoming upload to a temp file while keeping
//!   the sniffing prefix in memory.
//! - [`blob`] -- writes accepted files under `<root>/upload/...` and maps
//!   locators back to paths.

pub mod blob;
pub mod sniff;
pub mod spool;

pub use blob::{BlobFolder, BlobStore, StoredBlob};
pub use sniff::{sniff, AssetKind, SNIFF_LEN};
pub use spool::Spool;
