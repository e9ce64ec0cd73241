//! Share listing, inspection and manual reaping.

use chrono::Utc;
use futures::StreamExt;
use serde::Serialize;
use tabled::Tabled;

use dropshare_core::ShareId;
use dropshare_core::error::AppError;
use dropshare_entity::{PolicyState, ShareRecord, ShareView};
use dropshare_service::ReapOutcome;
use dropshare_service::share::format::{describe_expiry, format_file_size};

use crate::output::{self, OutputFormat};

/// Share display row
#[derive(Debug, Serialize, Tabled)]
struct ShareRow {
    /// Share ID
    #[tabled(rename = "ID")]
    id: String,
    /// State
    #[tabled(rename = "State")]
    state: PolicyState,
    /// File count
    #[tabled(rename = "Files")]
    files: usize,
    /// Total size
    #[tabled(rename = "Size")]
    size: String,
    /// Downloads
    #[tabled(rename = "Downloads")]
    downloads: String,
    /// Password
    #[tabled(rename = "Password")]
    password: String,
    /// Expires
    #[tabled(rename = "Expires")]
    expires: String,
}

impl ShareRow {
    fn from_record(record: &ShareRecord, state: PolicyState) -> Self {
        let limit = if record.is_unlimited() {
            "∞".to_string()
        } else {
            record.max_downloads.to_string()
        };
        Self {
            id: record.share_id.to_string(),
            state,
            files: record.files.len(),
            size: format_file_size(record.total_size_bytes()),
            downloads: format!("{}/{}", record.download_count, limit),
            password: if record.requires_password() { "yes" } else { "no" }.to_string(),
            expires: record.expires_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Inspect output: the recipient view plus the policy state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectOutput {
    state: PolicyState,
    #[serde(flatten)]
    view: ShareView,
}

/// `list`
pub async fn list(config_path: Option<&str>, format: OutputFormat) -> Result<(), AppError> {
    let components = super::connect(config_path).await?;
    let store = components.state.lifecycle.store();
    let now = Utc::now();

    let mut rows = Vec::new();
    let mut records = store.list_all();
    while let Some(record) = records.next().await {
        match record {
            Ok(record) => rows.push(ShareRow::from_record(&record, record.policy_state(now))),
            Err(e) => output::print_error(&format!("Unreadable record: {e}")),
        }
    }
    rows.sort_by(|a, b| a.expires.cmp(&b.expires));

    output::print_list(&rows, format)
}

/// `inspect <id>`
pub async fn inspect(
    config_path: Option<&str>,
    id: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let id = ShareId::parse(id)?;
    let components = super::connect(config_path).await?;
    let record = components.state.lifecycle.store().load(&id).await?;

    let now = Utc::now();
    let state = record.policy_state(now);
    let view = ShareView::from_record(&record, describe_expiry(record.expires_at, now));

    let mut fields = vec![
        ("ID", view.share_id.to_string()),
        ("State", state.to_string()),
        ("Created", view.created_at.to_rfc3339()),
        ("Expires", format!("{} ({})", view.expires_at.to_rfc3339(), view.expires_in)),
        (
            "Downloads",
            match view.remaining_downloads {
                Some(left) => format!("{} of {} ({left} left)", view.download_count, view.max_downloads),
                None => format!("{} (unlimited)", view.download_count),
            },
        ),
        ("Password", if view.password_protected { "yes" } else { "no" }.to_string()),
        ("Total size", format_file_size(view.total_size_bytes)),
    ];
    for file in &view.files {
        fields.push((
            "File",
            format!(
                "[{}] {} ({}, {})",
                file.index,
                file.name,
                format_file_size(file.size_bytes),
                file.mime_type
            ),
        ));
    }

    output::print_item(&InspectOutput { state, view }, &fields, format)
}

/// `reap <id>`
pub async fn reap(config_path: Option<&str>, id: &str, force: bool) -> Result<(), AppError> {
    let id = ShareId::parse(id)?;

    if !force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Delete share {id} and all its files?"))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let components = super::connect(config_path).await?;
    match components.state.lifecycle.reap(&id).await? {
        ReapOutcome::Reaped => output::print_success(&format!("Share {id} deleted")),
        ReapOutcome::AlreadyGone => output::print_success(&format!("Share {id} did not exist")),
        ReapOutcome::Deferred => output::print_success(&format!("Share {id} queued for deletion")),
    }
    Ok(())
}
