// File I/O and persistence

pub mod sheet;
pub mod store;
pub mod upload;

pub use store::SqliteStore;
pub use upload::UploadGuard;

/// Store schema version.
/// Increment when the schema changes in a way old versions can't read.
pub const SCHEMA_VERSION: u32 = 2;
