//! # dropshare-service
//!
//! The share lifecycle: creating shares from uploaded payloads, enforcing
//! expiry, download limits and passwords on every access, counting
//! downloads atomically, and reaping shares once they stop being valid.
//! Upload notifications are delivered from here as well.

pub mod notification;
pub mod share;

pub use notification::{NoopNotifier, ShareNotifier, TelegramNotifier, notifier_from_config};
pub use share::{
    CreateShareOptions, Credentials, FileDownload, IncomingFile, LifecycleSettings, ReapOutcome,
    ShareAccess, ShareLifecycleManager, UploadDraft,
};
