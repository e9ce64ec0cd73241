//! # dropshare-entity
//!
//! Domain entity models for DropShare. Every struct in this crate is either
//! a persisted record or a value object handed across crate boundaries.
//! All entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod share;

pub use share::{
    CounterUpdate, FileEntry, FileView, PolicyState, ShareRecord, ShareSummary, ShareView,
};
