//! Custom Axum extractors.

pub mod credentials;
pub mod path;

pub use credentials::ShareCredentials;
pub use path::{parse_file_index, parse_share_id};
