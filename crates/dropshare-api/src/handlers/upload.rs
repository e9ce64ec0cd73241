//! Multipart share upload.

use axum::Json;
use axum::extract::{Multipart, State};
use tracing::debug;

use dropshare_core::AppError;
use dropshare_service::UploadDraft;

use crate::dto::request::UploadFormFields;
use crate::dto::response::UploadResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/upload
///
/// Parts named `files` (or `file`) are streamed straight into the share's
/// payload directory; the text parts `ttlHours`/`expiryHours`,
/// `maxDownloads` and `password` may come in any order.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let lifecycle = &state.lifecycle;
    let mut draft = lifecycle.begin_upload().await?;

    let options = match read_form(&mut multipart, &mut draft)
        .await
        .and_then(UploadFormFields::into_options)
    {
        Ok(options) => options,
        Err(e) => {
            lifecycle.discard(draft).await;
            return Err(e.into());
        }
    };

    let summary = lifecycle.create(draft, options).await?;
    Ok(Json(UploadResponse::new(
        &summary,
        state.config.server.public_base_url.as_deref(),
    )))
}

async fn read_form(
    multipart: &mut Multipart,
    draft: &mut UploadDraft,
) -> Result<UploadFormFields, AppError> {
    let mut fields = UploadFormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" | "file" => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let mime_type = field.content_type().map(str::to_string);
                draft
                    .add_file(&file_name, mime_type.as_deref(), field)
                    .await?;
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                if !fields.set(other, value) {
                    debug!(field = other, "Ignoring unknown upload form field");
                }
            }
        }
    }

    Ok(fields)
}
