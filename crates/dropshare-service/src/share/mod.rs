//! Share lifecycle management.

pub mod credentials;
pub mod format;
pub mod lifecycle;
pub mod locks;
pub mod stream;
pub mod upload;

pub use credentials::Credentials;
pub use lifecycle::{
    FileDownload, LifecycleSettings, ReapOutcome, ShareAccess, ShareLifecycleManager,
};
pub use upload::{CreateShareOptions, IncomingFile, UploadDraft};
