//! # dropshare-core
//!
//! Core crate for DropShare. Contains the unified error system,
//! configuration schemas, the share identifier type, and the storage
//! provider trait implemented by `dropshare-storage`.
//!
//! This crate has **no** internal dependencies on other DropShare crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::ShareId;
