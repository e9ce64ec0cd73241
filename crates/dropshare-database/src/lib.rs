//! # dropshare-database
//!
//! Metadata store for share records. The [`ShareStore`] trait is the only
//! thing the lifecycle manager and the reaper see; two backends implement it:
//! a JSON-file store for single-process deployments and a PostgreSQL store.

pub mod connection;
pub mod migration;
pub mod store;
pub mod stores;

pub use connection::DatabasePool;
pub use store::{ShareStore, connect_store};
pub use stores::json::JsonShareStore;
pub use stores::postgres::PgShareStore;
