//! Shared identifier types.

pub mod id;

pub use id::ShareId;
