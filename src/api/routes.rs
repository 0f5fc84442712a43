use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::api::handlers::AppState;
use crate::api::{draft_handlers, handlers};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Canonical deal room document (created lazily on first access)
        .route(
            "/api/projects/:project_id/deal-room",
            get(handlers::get_deal_room::<S>),
        )
        .route(
            "/api/projects/:project_id/deal-room",
            put(handlers::update_deal_room::<S>),
        )
        // Showcase photo
        .route(
            "/api/projects/:project_id/deal-room/showcase-photo",
            post(handlers::upload_showcase_photo::<S>),
        )
        .route(
            "/api/projects/:project_id/deal-room/showcase-photo",
            get(handlers::get_showcase_photo::<S>),
        )
        .route(
            "/api/projects/:project_id/deal-room/showcase-photo",
            delete(handlers::delete_showcase_photo::<S>),
        )
        // Draft editing (autosave + publish)
        .route(
            "/api/projects/:project_id/deal-room/draft",
            post(draft_handlers::save_draft::<S>),
        )
        .route(
            "/api/projects/:project_id/deal-room/draft/publish",
            post(draft_handlers::publish_draft::<S>),
        )
        .route(
            "/api/projects/:project_id/deal-room/save-status",
            get(draft_handlers::save_status::<S>),
        )
        .route(
            "/api/projects/:project_id/deal-room/recover-changes",
            get(draft_handlers::recover_changes::<S>),
        )
        // Version history
        .route(
            "/api/projects/:project_id/deal-room/versions",
            get(draft_handlers::list_versions::<S>),
        )
        .route(
            "/api/projects/:project_id/deal-room/versions/:version/restore",
            post(draft_handlers::restore_version::<S>),
        )
        // Conflict resolution
        .route(
            "/api/projects/:project_id/deal-room/conflicts",
            get(draft_handlers::list_conflicts::<S>),
        )
        .route(
            "/api/projects/:project_id/deal-room/conflicts/:conflict_id/resolve",
            post(draft_handlers::resolve_conflict::<S>),
        )
        // Maintenance
        .route(
            "/api/maintenance/cleanup-drafts",
            post(draft_handlers::cleanup_drafts::<S>),
        )
}
