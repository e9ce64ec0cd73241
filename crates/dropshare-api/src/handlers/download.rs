//! Counted file download.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use dropshare_core::AppError;

use crate::error::ApiResult;
use crate::extractors::{ShareCredentials, parse_file_index, parse_share_id};
use crate::state::AppState;

/// Characters allowed unescaped in an RFC 5987 `ext-value`.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Header with the downloads left after this one (absent when unlimited).
pub const REMAINING_DOWNLOADS_HEADER: &str = "x-remaining-downloads";

/// GET /api/download/{share_id}/{file_index}
///
/// The download is counted before the first byte is sent.
pub async fn download_file(
    State(state): State<AppState>,
    Path((share_id, file_index)): Path<(String, String)>,
    ShareCredentials(credentials): ShareCredentials,
) -> ApiResult<Response> {
    let id = parse_share_id(&share_id)?;
    let index = parse_file_index(&file_index)?;

    let download = state
        .lifecycle
        .download_file(&id, index, &credentials)
        .await?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.mime_type.as_str())
        .header(header::CONTENT_LENGTH, download.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&download.file_name),
        )
        .header(header::CACHE_CONTROL, "no-store");
    if let Some(remaining) = download.remaining_downloads {
        builder = builder.header(REMAINING_DOWNLOADS_HEADER, remaining);
    }

    let response = builder
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, ATTR_CHAR);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
