//! Core traits implemented by downstream crates.

pub mod storage;

pub use storage::{ByteStream, PayloadWriter, StorageObjectMeta, StorageProvider};
