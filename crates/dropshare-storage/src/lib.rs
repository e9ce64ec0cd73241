//! # dropshare-storage
//!
//! Payload storage for DropShare. Each share owns one directory under the
//! uploads root; [`layout`] decides the names inside it and
//! [`providers::local`] does the filesystem work.

pub mod layout;
pub mod providers;

pub use layout::{sanitize_file_name, share_dir, stored_file_name, stored_file_path};
pub use providers::local::{LocalStorageProvider, mime_from_path};
