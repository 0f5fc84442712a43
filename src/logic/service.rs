use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ServiceError;
use crate::logic::{diff, validate};
use crate::model::{
    generate_id, ConflictRecord, ConflictStrategy, DealRoom, DealRoomContent, DealRoomDraft,
    DealRoomUpdate, DealRoomVersion, DraftData, Id, ShowcasePhoto,
};
use crate::store::traits::Store;

/// Outcome of an operation that advanced the canonical document and wrote a
/// version snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub deal_room: DealRoom,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    pub deal_room: DealRoom,
    pub version: u64,
    pub conflict: ConflictRecord,
}

/// Autosave state reported to the editor UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatus {
    pub has_draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_auto_save: Option<bool>,
    pub has_unsaved_changes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// Orchestrates deal room editing: draft autosave, optimistic-concurrency
/// publish, conflict resolution, crash recovery, and version restore.
///
/// Persistence offers no transactions, so the version counters managed here
/// are the only safeguard against concurrent editors clobbering each other —
/// and only on the publish path. The direct update path overwrites
/// unconditionally.
pub struct DealRoomService;

impl DealRoomService {
    /// Canonical document, created lazily with empty content on first access.
    pub async fn get_or_create_deal_room<S: Store>(
        store: &S,
        project_id: &Id,
    ) -> Result<DealRoom, ServiceError> {
        if let Some(room) = store.get_deal_room(project_id).await? {
            return Ok(room);
        }
        let room = DealRoom::new(project_id.clone());
        store.upsert_deal_room(room.clone()).await?;
        log::debug!("created deal room {} for project {}", room.id, project_id);
        Ok(room)
    }

    /// Direct setter path: validated, then unconditionally overwrites
    /// canonical. No version snapshot and no conflict check.
    pub async fn update_deal_room<S: Store>(
        store: &S,
        project_id: &Id,
        update: &DealRoomUpdate,
    ) -> Result<DealRoom, ServiceError> {
        validate::validate_update(update)?;
        let mut room = Self::get_or_create_deal_room(store, project_id).await?;
        update.apply_to(&mut room.content);
        room.touch();
        store.upsert_deal_room(room.clone()).await?;
        Ok(room)
    }

    /// Merge an autosave (or manual save) into the session's draft. Creates
    /// the draft on first save. `base_version`, when the client supplies it,
    /// records which published version the edits are based on so publish can
    /// detect divergence.
    ///
    /// Draft saves are not validated; drafts are provisional.
    pub async fn save_draft<S: Store>(
        store: &S,
        project_id: &Id,
        session_id: &Id,
        data: DraftData,
        is_auto_save: bool,
        base_version: Option<u64>,
    ) -> Result<DealRoomDraft, ServiceError> {
        let mut draft = store
            .get_draft(project_id, session_id)
            .await?
            .unwrap_or_else(|| DealRoomDraft::new(project_id.clone(), session_id.clone()));
        if base_version.is_some() {
            draft.last_saved_version = base_version;
        }
        draft.absorb(data, is_auto_save);
        store.upsert_draft(draft.clone()).await?;
        Ok(draft)
    }

    /// Commit the session's draft into the canonical document plus a version
    /// snapshot. If the canonical document has moved past the draft's base
    /// version and any tracked field diverged, an open conflict record is
    /// written instead and the canonical document is left untouched.
    pub async fn publish_draft<S: Store>(
        store: &S,
        project_id: &Id,
        session_id: &Id,
        change_description: Option<String>,
    ) -> Result<PublishOutcome, ServiceError> {
        let mut draft = store
            .get_draft(project_id, session_id)
            .await?
            .ok_or(ServiceError::NoDraft)?;
        let mut room = Self::get_or_create_deal_room(store, project_id).await?;
        let latest = store.latest_version(project_id).await?;

        if let (Some(base), Some(latest)) = (draft.last_saved_version, latest.as_ref()) {
            if latest.version > base {
                let fields = match store.get_version(project_id, base).await? {
                    Some(snapshot) => diff::changed_fields(&snapshot.data, &room.content),
                    None => diff::draft_changed_fields(&draft.draft_data, &room.content),
                };
                if !fields.is_empty() {
                    let conflict = ConflictRecord::new(
                        project_id.clone(),
                        session_id.clone(),
                        base,
                        latest.version,
                        draft.draft_data.clone(),
                        room.content.clone(),
                        fields,
                    );
                    let conflict_id = conflict.id.clone();
                    store.upsert_conflict(conflict).await?;
                    log::warn!(
                        "publish conflict on project {} (session {}): base v{}, server v{}, conflict {}",
                        project_id, session_id, base, latest.version, conflict_id
                    );
                    return Err(ServiceError::Conflict { conflict_id });
                }
            }
        }

        draft.draft_data.apply_to(&mut room.content);
        room.touch();
        store.upsert_deal_room(room.clone()).await?;

        let version = latest.map(|v| v.version + 1).unwrap_or(1);
        store
            .append_version(DealRoomVersion::new(
                project_id.clone(),
                version,
                room.content.clone(),
                change_description,
            ))
            .await?;

        draft.last_saved_version = Some(version);
        store.upsert_draft(draft).await?;

        log::info!("published project {} as version {}", project_id, version);
        Ok(PublishOutcome {
            deal_room: room,
            version,
        })
    }

    /// Settle an open conflict. Resolved content is the caller's explicit
    /// data when supplied, otherwise derived from the strategy. The draft
    /// survives only a `use_local` resolution; server-favoring and merged
    /// resolutions discard it so stale staged fields cannot resurface.
    pub async fn resolve_conflict<S: Store>(
        store: &S,
        conflict_id: &Id,
        strategy: Option<ConflictStrategy>,
        explicit_data: Option<DealRoomContent>,
    ) -> Result<ResolveOutcome, ServiceError> {
        let mut conflict = store
            .get_conflict(conflict_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Conflict {conflict_id}")))?;
        if conflict.is_resolved() {
            return Err(ServiceError::ConflictAlreadyResolved(conflict.id.clone()));
        }

        let resolved = match (&explicit_data, strategy) {
            (Some(data), _) => data.clone(),
            (None, Some(ConflictStrategy::UseLocal)) | (None, Some(ConflictStrategy::Merge)) => {
                diff::overlay_local(&conflict.local_data, &conflict.server_data)
            }
            (None, Some(ConflictStrategy::UseServer)) => conflict.server_data.clone(),
            (None, None) => {
                return Err(ServiceError::validation(
                    "either strategy or resolvedData is required",
                ))
            }
        };

        let project_id = conflict.project_id.clone();
        let mut room = Self::get_or_create_deal_room(store, &project_id).await?;
        room.content = resolved.clone();
        room.touch();
        store.upsert_deal_room(room.clone()).await?;

        let latest = store.latest_version(&project_id).await?;
        let version = latest.map(|v| v.version + 1).unwrap_or(1);
        let label = strategy.map(|s| s.as_str()).unwrap_or("custom");
        store
            .append_version(DealRoomVersion::new(
                project_id.clone(),
                version,
                room.content.clone(),
                Some(format!("Conflict resolved ({label})")),
            ))
            .await?;

        conflict.mark_resolved(strategy, resolved);
        store.upsert_conflict(conflict.clone()).await?;

        let session_id = conflict.session_id.clone();
        if strategy == Some(ConflictStrategy::UseLocal) {
            if let Some(mut draft) = store.get_draft(&project_id, &session_id).await? {
                draft.last_saved_version = Some(version);
                store.upsert_draft(draft).await?;
            }
        } else {
            store.delete_draft(&project_id, &session_id).await?;
        }

        log::info!(
            "resolved conflict {} on project {} with {} as version {}",
            conflict.id, project_id, label, version
        );
        Ok(ResolveOutcome {
            deal_room: room,
            version,
            conflict,
        })
    }

    /// Restore editor state after a crash or reload. Returns the draft only
    /// when it genuinely holds unpublished content.
    pub async fn recover_unsaved_changes<S: Store>(
        store: &S,
        project_id: &Id,
        session_id: &Id,
    ) -> Result<Option<DealRoomDraft>, ServiceError> {
        let draft = store.get_draft(project_id, session_id).await?;
        Ok(draft.filter(|d| d.has_unsaved_changes()))
    }

    pub async fn save_status<S: Store>(
        store: &S,
        project_id: &Id,
        session_id: &Id,
    ) -> Result<SaveStatus, ServiceError> {
        let draft = store.get_draft(project_id, session_id).await?;
        Ok(match draft {
            Some(draft) => SaveStatus {
                has_draft: true,
                draft_version: Some(draft.version),
                last_saved_version: draft.last_saved_version,
                is_auto_save: Some(draft.is_auto_save),
                has_unsaved_changes: draft.has_unsaved_changes(),
                last_saved_at: Some(draft.updated_at),
            },
            None => SaveStatus {
                has_draft: false,
                draft_version: None,
                last_saved_version: None,
                is_auto_save: None,
                has_unsaved_changes: false,
                last_saved_at: None,
            },
        })
    }

    pub async fn list_versions<S: Store>(
        store: &S,
        project_id: &Id,
    ) -> Result<Vec<DealRoomVersion>, ServiceError> {
        Ok(store.list_versions(project_id).await?)
    }

    /// Overwrite canonical with a historical snapshot and record the restore
    /// as a new version. The requesting session's draft is discarded so a
    /// stale draft cannot clobber the restored state.
    pub async fn restore_version<S: Store>(
        store: &S,
        project_id: &Id,
        version: u64,
        session_id: Option<&Id>,
    ) -> Result<PublishOutcome, ServiceError> {
        let snapshot = store
            .get_version(project_id, version)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Version {version}")))?;

        let mut room = Self::get_or_create_deal_room(store, project_id).await?;
        room.content = snapshot.data.clone();
        room.touch();
        store.upsert_deal_room(room.clone()).await?;

        let latest = store.latest_version(project_id).await?;
        let new_version = latest.map(|v| v.version + 1).unwrap_or(1);
        store
            .append_version(DealRoomVersion::new(
                project_id.clone(),
                new_version,
                room.content.clone(),
                Some(format!("Restored from version {version}")),
            ))
            .await?;

        if let Some(session_id) = session_id {
            store.delete_draft(project_id, session_id).await?;
        }

        log::info!(
            "restored project {} from version {} as version {}",
            project_id, version, new_version
        );
        Ok(PublishOutcome {
            deal_room: room,
            version: new_version,
        })
    }

    /// Store the uploaded showcase photo under the uploads directory and
    /// record its metadata on the canonical document. Unguarded direct-update
    /// path, like `update_deal_room`.
    pub async fn attach_showcase_photo<S: Store>(
        store: &S,
        uploads_dir: &Path,
        project_id: &Id,
        original_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<ShowcasePhoto, ServiceError> {
        validate::validate_photo_mime(mime_type)?;

        let mut room = Self::get_or_create_deal_room(store, project_id).await?;

        tokio::fs::create_dir_all(uploads_dir)
            .await
            .map_err(anyhow::Error::from)?;
        let filename = match Path::new(original_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", generate_id(), ext),
            None => generate_id(),
        };
        tokio::fs::write(uploads_dir.join(&filename), bytes)
            .await
            .map_err(anyhow::Error::from)?;

        let photo = ShowcasePhoto {
            filename,
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            checksum: hex::encode(Sha256::digest(bytes)),
            uploaded_at: Utc::now(),
        };

        if let Some(previous) = room.content.showcase_photo.replace(photo.clone()) {
            if let Err(e) = tokio::fs::remove_file(uploads_dir.join(&previous.filename)).await {
                log::warn!("failed to remove replaced photo {}: {}", previous.filename, e);
            }
        }
        room.touch();
        store.upsert_deal_room(room).await?;
        Ok(photo)
    }

    pub async fn showcase_photo<S: Store>(
        store: &S,
        project_id: &Id,
    ) -> Result<ShowcasePhoto, ServiceError> {
        let room = store
            .get_deal_room(project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Deal room"))?;
        room.content
            .showcase_photo
            .ok_or_else(|| ServiceError::not_found("Showcase photo"))
    }

    pub async fn remove_showcase_photo<S: Store>(
        store: &S,
        uploads_dir: &Path,
        project_id: &Id,
    ) -> Result<(), ServiceError> {
        let mut room = store
            .get_deal_room(project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Deal room"))?;
        let photo = room
            .content
            .showcase_photo
            .take()
            .ok_or_else(|| ServiceError::not_found("Showcase photo"))?;

        if let Err(e) = tokio::fs::remove_file(uploads_dir.join(&photo.filename)).await {
            log::warn!("failed to remove photo file {}: {}", photo.filename, e);
        }
        room.touch();
        store.upsert_deal_room(room).await?;
        Ok(())
    }

    pub async fn open_conflicts<S: Store>(
        store: &S,
        project_id: &Id,
        session_id: &Id,
    ) -> Result<Vec<ConflictRecord>, ServiceError> {
        Ok(store.list_open_conflicts(project_id, session_id).await?)
    }

    /// Explicit sweep for the external scheduler; expiry is otherwise
    /// enforced lazily on read.
    pub async fn cleanup_expired_drafts<S: Store>(store: &S) -> Result<usize, ServiceError> {
        let removed = store.delete_expired_drafts().await?;
        if removed > 0 {
            log::info!("cleaned up {} expired drafts", removed);
        }
        Ok(removed)
    }
}
