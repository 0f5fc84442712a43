use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ServiceError;
use crate::logic::DealRoomService;
use crate::model::{DealRoom, DealRoomUpdate, Id, ShowcasePhoto};
use crate::store::traits::Store;

pub struct AppState<S> {
    pub store: Arc<S>,
    pub uploads_dir: PathBuf,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            uploads_dir: self.uploads_dir.clone(),
        }
    }
}

/// Envelope carried by every JSON response:
/// `{ success, data?, error?: { message, conflictId? } }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_id: Option<Id>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn empty() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            error: None,
        })
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("internal error: {self:#}");
        }
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                message: self.to_string(),
                conflict_id: self.conflict_id().cloned(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /api/projects/{project_id}/deal-room
pub async fn get_deal_room<S: Store>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<DealRoom> {
    let room = DealRoomService::get_or_create_deal_room(&*state.store, &project_id).await?;
    Ok(ApiResponse::ok(room))
}

/// PUT /api/projects/{project_id}/deal-room
pub async fn update_deal_room<S: Store>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
    Json(update): Json<DealRoomUpdate>,
) -> ApiResult<DealRoom> {
    let room = DealRoomService::update_deal_room(&*state.store, &project_id, &update).await?;
    Ok(ApiResponse::ok(room))
}

/// POST /api/projects/{project_id}/deal-room/showcase-photo
pub async fn upload_showcase_photo<S: Store>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
    mut multipart: Multipart,
) -> ApiResult<ShowcasePhoto> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::validation(format!("invalid multipart request: {e}")))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("photo").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::validation(format!("failed to read upload: {e}")))?;

        let photo = DealRoomService::attach_showcase_photo(
            &*state.store,
            &state.uploads_dir,
            &project_id,
            &original_name,
            &mime_type,
            &bytes,
        )
        .await?;
        return Ok(ApiResponse::ok(photo));
    }
    Err(ServiceError::validation("multipart field 'photo' is required"))
}

/// GET /api/projects/{project_id}/deal-room/showcase-photo
///
/// Streams the stored binary rather than the JSON envelope.
pub async fn get_showcase_photo<S: Store>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> Result<Response, ServiceError> {
    let photo = DealRoomService::showcase_photo(&*state.store, &project_id).await?;
    let bytes = tokio::fs::read(state.uploads_dir.join(&photo.filename))
        .await
        .map_err(anyhow::Error::from)?;
    Ok(([(header::CONTENT_TYPE, photo.mime_type)], bytes).into_response())
}

/// DELETE /api/projects/{project_id}/deal-room/showcase-photo
pub async fn delete_showcase_photo<S: Store>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<()> {
    DealRoomService::remove_showcase_photo(&*state.store, &state.uploads_dir, &project_id)
        .await?;
    Ok(ApiResponse::empty())
}
