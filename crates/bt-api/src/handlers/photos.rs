//! Profile photo handlers
//!
//! Uploads arrive as JSON `{"dataUri": "data:image/png;base64,..."}`, as a
//! raw image body, or as a multipart form with one file field.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use bt_attachments::{PhotoUpload, ProfilePhoto};
use bt_core::error::TrackerError;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataUriBody {
    data_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataUriResponse {
    data_uri: String,
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
}

async fn read_upload(state: &AppState, request: Request) -> ApiResult<PhotoUpload> {
    let declared = content_type(request.headers());

    match declared.as_deref() {
        Some(ct) if ct.starts_with("multipart/form-data") => {
            let mut multipart = Multipart::from_request(request, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?
            {
                if field.file_name().is_none() && field.name() != Some("photo") {
                    continue;
                }
                let filename = field.file_name().map(str::to_string);
                let field_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                return Ok(PhotoUpload::raw(data, field_type.as_deref(), filename.as_deref()));
            }
            Err(ApiError::bad_request("multipart form has no photo field"))
        }
        Some(ct) if ct.starts_with("application/json") => {
            let body = Bytes::from_request(request, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            let parsed: DataUriBody = serde_json::from_slice(&body)
                .map_err(|e| ApiError::bad_request(format!("invalid photo body: {}", e)))?;
            Ok(PhotoUpload::DataUri(parsed.data_uri))
        }
        _ => {
            let body = Bytes::from_request(request, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(PhotoUpload::raw(body, declared.as_deref(), None))
        }
    }
}

/// PUT /api/users/me/photo
pub async fn upload_photo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    request: Request,
) -> ApiResult<Json<ProfilePhoto>> {
    let upload = read_upload(&state, request).await?;
    let photo = state
        .photos
        .upload(&user.id, upload)
        .await
        .map_err(TrackerError::from)?;
    Ok(Json(photo))
}

/// GET /api/users/me/photo
///
/// Raw image bytes, or `{"dataUri": ...}` when the client accepts JSON.
pub async fn get_photo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let wants_json = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if wants_json {
        let data_uri = state.photos.data_uri(&user.id).await.map_err(TrackerError::from)?;
        return Ok(Json(DataUriResponse { data_uri }).into_response());
    }

    let (photo, data) = state.photos.get(&user.id).await.map_err(TrackerError::from)?;
    Ok(([(CONTENT_TYPE, photo.content_type)], data).into_response())
}

/// DELETE /api/users/me/photo
pub async fn delete_photo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<StatusCode> {
    state.photos.delete(&user.id).await.map_err(TrackerError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
