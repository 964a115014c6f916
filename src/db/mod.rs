//! Account storage.
//!
//! - **traits**: the `DatabaseClient` seam the rest of the crate talks to
//! - **turso**: libsql implementation (in-memory SQLite, local file, or remote Turso)
//!
//! Enable remote Turso support via Cargo features:
//! ```toml
//! accounts-server = { version = "*", features = ["turso"] }
//! ```

#![allow(missing_docs)]

pub mod traits;
pub mod turso;

pub use traits::{DatabaseClient, DatabaseProvider};
pub use turso::TursoClient;
