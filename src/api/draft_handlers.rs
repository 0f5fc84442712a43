use axum::{
    extract::{Path, Query, State},
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};

use crate::api::handlers::{ApiResponse, ApiResult, AppState};
use crate::logic::{DealRoomService, PublishOutcome, ResolveOutcome, SaveStatus};
use crate::model::{
    ConflictRecord, ConflictStrategy, DealRoomContent, DealRoomDraft, DealRoomVersion, DraftData,
    Id,
};
use crate::store::traits::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    pub session_id: Id,
    #[serde(default)]
    pub draft_data: DraftData,
    #[serde(default)]
    pub is_auto_save: bool,
    /// Published version the client's edits are based on; lets publish detect
    /// that the canonical document moved underneath the draft.
    pub last_saved_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishDraftRequest {
    pub session_id: Id,
    pub change_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Id,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreVersionRequest {
    pub session_id: Option<Id>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveConflictRequest {
    pub strategy: Option<ConflictStrategy>,
    pub resolved_data: Option<DealRoomContent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub removed: usize,
}

/// POST /api/projects/{project_id}/deal-room/draft
pub async fn save_draft<S: Store>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<SaveDraftRequest>,
) -> ApiResult<DealRoomDraft> {
    let draft = DealRoomService::save_draft(
        &*state.store,
        &project_id,
        &req.session_id,
        req.draft_data,
        req.is_auto_save,
        req.last_saved_version,
    )
    .await?;
    Ok(ApiResponse::ok(draft))
}

/// POST /api/projects/{project_id}/deal-room/draft/publish
pub async fn publish_draft<S: Store>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<PublishDraftRequest>,
) -> ApiResult<PublishOutcome> {
    let outcome = DealRoomService::publish_draft(
        &*state.store,
        &project_id,
        &req.session_id,
        req.change_description,
    )
    .await?;
    Ok(ApiResponse::ok(outcome))
}

/// GET /api/projects/{project_id}/deal-room/save-status?sessionId=...
pub async fn save_status<S: Store>(
    Path(project_id): Path<Id>,
    Query(query): Query<SessionQuery>,
    State(state): State<AppState<S>>,
) -> ApiResult<SaveStatus> {
    let status =
        DealRoomService::save_status(&*state.store, &project_id, &query.session_id).await?;
    Ok(ApiResponse::ok(status))
}

/// GET /api/projects/{project_id}/deal-room/recover-changes?sessionId=...
///
/// `data` is null when the session has nothing unpublished to recover.
pub async fn recover_changes<S: Store>(
    Path(project_id): Path<Id>,
    Query(query): Query<SessionQuery>,
    State(state): State<AppState<S>>,
) -> ApiResult<Option<DealRoomDraft>> {
    let draft =
        DealRoomService::recover_unsaved_changes(&*state.store, &project_id, &query.session_id)
            .await?;
    Ok(Json(ApiResponse {
        success: true,
        data: Some(draft),
        error: None,
    }))
}

/// GET /api/projects/{project_id}/deal-room/versions
pub async fn list_versions<S: Store>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<Vec<DealRoomVersion>> {
    let versions = DealRoomService::list_versions(&*state.store, &project_id).await?;
    Ok(ApiResponse::ok(versions))
}

/// POST /api/projects/{project_id}/deal-room/versions/{version}/restore
pub async fn restore_version<S: Store>(
    Path((project_id, version)): Path<(Id, u64)>,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<RestoreVersionRequest>,
) -> ApiResult<PublishOutcome> {
    let outcome = DealRoomService::restore_version(
        &*state.store,
        &project_id,
        version,
        req.session_id.as_ref(),
    )
    .await?;
    Ok(ApiResponse::ok(outcome))
}

/// GET /api/projects/{project_id}/deal-room/conflicts?sessionId=...
pub async fn list_conflicts<S: Store>(
    Path(project_id): Path<Id>,
    Query(query): Query<SessionQuery>,
    State(state): State<AppState<S>>,
) -> ApiResult<Vec<ConflictRecord>> {
    let conflicts =
        DealRoomService::open_conflicts(&*state.store, &project_id, &query.session_id).await?;
    Ok(ApiResponse::ok(conflicts))
}

/// POST /api/projects/{project_id}/deal-room/conflicts/{conflict_id}/resolve
pub async fn resolve_conflict<S: Store>(
    Path((_project_id, conflict_id)): Path<(Id, Id)>,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<ResolveConflictRequest>,
) -> ApiResult<ResolveOutcome> {
    let outcome = DealRoomService::resolve_conflict(
        &*state.store,
        &conflict_id,
        req.strategy,
        req.resolved_data,
    )
    .await?;
    Ok(ApiResponse::ok(outcome))
}

/// POST /api/maintenance/cleanup-drafts
///
/// Entry point for an external scheduler; expiry is otherwise lazy.
pub async fn cleanup_drafts<S: Store>(
    State(state): State<AppState<S>>,
) -> ApiResult<CleanupResponse> {
    let removed = DealRoomService::cleanup_expired_drafts(&*state.store).await?;
    Ok(ApiResponse::ok(CleanupResponse { removed }))
}
