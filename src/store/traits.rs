use anyhow::Result;

use crate::model::{ConflictRecord, DealRoom, DealRoomDraft, DealRoomVersion, Id};

#[async_trait::async_trait]
pub trait DealRoomStore: Send + Sync {
    async fn get_deal_room(&self, project_id: &Id) -> Result<Option<DealRoom>>;
    async fn upsert_deal_room(&self, deal_room: DealRoom) -> Result<()>;
}

#[async_trait::async_trait]
pub trait DraftStore: Send + Sync {
    /// Fetch the draft for an editing session. Expired drafts are dropped on
    /// read and reported as absent.
    async fn get_draft(&self, project_id: &Id, session_id: &Id)
        -> Result<Option<DealRoomDraft>>;
    async fn upsert_draft(&self, draft: DealRoomDraft) -> Result<()>;
    async fn delete_draft(&self, project_id: &Id, session_id: &Id) -> Result<bool>;
    /// Explicit sweep entry point; returns the number of drafts removed.
    async fn delete_expired_drafts(&self) -> Result<usize>;
}

#[async_trait::async_trait]
pub trait VersionStore: Send + Sync {
    /// All retained versions for a project, newest first.
    async fn list_versions(&self, project_id: &Id) -> Result<Vec<DealRoomVersion>>;
    async fn latest_version(&self, project_id: &Id) -> Result<Option<DealRoomVersion>>;
    async fn get_version(&self, project_id: &Id, version: u64)
        -> Result<Option<DealRoomVersion>>;
    /// Append a snapshot and truncate the project's history to the retention
    /// limit, evicting the oldest entries.
    async fn append_version(&self, version: DealRoomVersion) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ConflictStore: Send + Sync {
    async fn get_conflict(&self, conflict_id: &Id) -> Result<Option<ConflictRecord>>;
    async fn upsert_conflict(&self, conflict: ConflictRecord) -> Result<()>;
    async fn list_open_conflicts(
        &self,
        project_id: &Id,
        session_id: &Id,
    ) -> Result<Vec<ConflictRecord>>;
}

pub trait Store: DealRoomStore + DraftStore + VersionStore + ConflictStore {}
impl<T: DealRoomStore + DraftStore + VersionStore + ConflictStore> Store for T {}
