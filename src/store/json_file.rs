use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;

use crate::model::{
    ConflictRecord, DealRoom, DealRoomDraft, DealRoomVersion, Id, VERSION_HISTORY_LIMIT,
};

const DEAL_ROOMS_FILE: &str = "deal_rooms.json";
const DRAFTS_FILE: &str = "deal_room_drafts.json";
const VERSIONS_FILE: &str = "deal_room_versions.json";
const CONFLICTS_FILE: &str = "deal_room_conflicts.json";

/// Flat-file persistence: one JSON array per aggregate under the data
/// directory. Every operation is a whole-file read-modify-write guarded by a
/// per-file mutex, so same-process racers serialize; cross-operation
/// correctness on the publish path still rests on the version counters.
pub struct JsonFileStore {
    data_dir: PathBuf,
    deal_rooms_lock: Mutex<()>,
    drafts_lock: Mutex<()>,
    versions_lock: Mutex<()>,
    conflicts_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
        Ok(Self {
            data_dir,
            deal_rooms_lock: Mutex::new(()),
            drafts_lock: Mutex::new(()),
            versions_lock: Mutex::new(()),
            conflicts_lock: Mutex::new(()),
        })
    }

    async fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(file);
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    async fn write_collection<T: Serialize>(&self, file: &str, items: &[T]) -> Result<()> {
        let path = self.data_dir.join(file);
        let tmp = self.data_dir.join(format!("{file}.tmp"));
        let bytes = serde_json::to_vec_pretty(items)?;
        fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::store::traits::DealRoomStore for JsonFileStore {
    async fn get_deal_room(&self, project_id: &Id) -> Result<Option<DealRoom>> {
        let _guard = self.deal_rooms_lock.lock().await;
        let rooms: Vec<DealRoom> = self.read_collection(DEAL_ROOMS_FILE).await?;
        Ok(rooms.into_iter().find(|r| &r.project_id == project_id))
    }

    async fn upsert_deal_room(&self, deal_room: DealRoom) -> Result<()> {
        let _guard = self.deal_rooms_lock.lock().await;
        let mut rooms: Vec<DealRoom> = self.read_collection(DEAL_ROOMS_FILE).await?;
        match rooms
            .iter_mut()
            .find(|r| r.project_id == deal_room.project_id)
        {
            Some(existing) => *existing = deal_room,
            None => rooms.push(deal_room),
        }
        self.write_collection(DEAL_ROOMS_FILE, &rooms).await
    }
}

#[async_trait::async_trait]
impl crate::store::traits::DraftStore for JsonFileStore {
    async fn get_draft(
        &self,
        project_id: &Id,
        session_id: &Id,
    ) -> Result<Option<DealRoomDraft>> {
        let _guard = self.drafts_lock.lock().await;
        let mut drafts: Vec<DealRoomDraft> = self.read_collection(DRAFTS_FILE).await?;
        let now = Utc::now();
        let position = drafts
            .iter()
            .position(|d| &d.project_id == project_id && &d.session_id == session_id);
        match position {
            Some(idx) if drafts[idx].is_expired(now) => {
                drafts.remove(idx);
                self.write_collection(DRAFTS_FILE, &drafts).await?;
                Ok(None)
            }
            Some(idx) => Ok(Some(drafts[idx].clone())),
            None => Ok(None),
        }
    }

    async fn upsert_draft(&self, draft: DealRoomDraft) -> Result<()> {
        let _guard = self.drafts_lock.lock().await;
        let mut drafts: Vec<DealRoomDraft> = self.read_collection(DRAFTS_FILE).await?;
        match drafts
            .iter_mut()
            .find(|d| d.project_id == draft.project_id && d.session_id == draft.session_id)
        {
            Some(existing) => *existing = draft,
            None => drafts.push(draft),
        }
        self.write_collection(DRAFTS_FILE, &drafts).await
    }

    async fn delete_draft(&self, project_id: &Id, session_id: &Id) -> Result<bool> {
        let _guard = self.drafts_lock.lock().await;
        let mut drafts: Vec<DealRoomDraft> = self.read_collection(DRAFTS_FILE).await?;
        let before = drafts.len();
        drafts.retain(|d| !(&d.project_id == project_id && &d.session_id == session_id));
        if drafts.len() == before {
            return Ok(false);
        }
        self.write_collection(DRAFTS_FILE, &drafts).await?;
        Ok(true)
    }

    async fn delete_expired_drafts(&self) -> Result<usize> {
        let _guard = self.drafts_lock.lock().await;
        let mut drafts: Vec<DealRoomDraft> = self.read_collection(DRAFTS_FILE).await?;
        let now = Utc::now();
        let before = drafts.len();
        drafts.retain(|d| !d.is_expired(now));
        let removed = before - drafts.len();
        if removed > 0 {
            self.write_collection(DRAFTS_FILE, &drafts).await?;
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl crate::store::traits::VersionStore for JsonFileStore {
    async fn list_versions(&self, project_id: &Id) -> Result<Vec<DealRoomVersion>> {
        let _guard = self.versions_lock.lock().await;
        let versions: Vec<DealRoomVersion> = self.read_collection(VERSIONS_FILE).await?;
        let mut mine: Vec<DealRoomVersion> = versions
            .into_iter()
            .filter(|v| &v.project_id == project_id)
            .collect();
        mine.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(mine)
    }

    async fn latest_version(&self, project_id: &Id) -> Result<Option<DealRoomVersion>> {
        let _guard = self.versions_lock.lock().await;
        let versions: Vec<DealRoomVersion> = self.read_collection(VERSIONS_FILE).await?;
        Ok(versions
            .into_iter()
            .filter(|v| &v.project_id == project_id)
            .max_by_key(|v| v.version))
    }

    async fn get_version(
        &self,
        project_id: &Id,
        version: u64,
    ) -> Result<Option<DealRoomVersion>> {
        let _guard = self.versions_lock.lock().await;
        let versions: Vec<DealRoomVersion> = self.read_collection(VERSIONS_FILE).await?;
        Ok(versions
            .into_iter()
            .find(|v| &v.project_id == project_id && v.version == version))
    }

    async fn append_version(&self, version: DealRoomVersion) -> Result<()> {
        let _guard = self.versions_lock.lock().await;
        let mut versions: Vec<DealRoomVersion> = self.read_collection(VERSIONS_FILE).await?;
        let project_id = version.project_id.clone();
        versions.push(version);

        let mut retained: Vec<u64> = versions
            .iter()
            .filter(|v| v.project_id == project_id)
            .map(|v| v.version)
            .collect();
        retained.sort_unstable_by(|a, b| b.cmp(a));
        retained.truncate(VERSION_HISTORY_LIMIT);
        versions.retain(|v| v.project_id != project_id || retained.contains(&v.version));

        self.write_collection(VERSIONS_FILE, &versions).await
    }
}

#[async_trait::async_trait]
impl crate::store::traits::ConflictStore for JsonFileStore {
    async fn get_conflict(&self, conflict_id: &Id) -> Result<Option<ConflictRecord>> {
        let _guard = self.conflicts_lock.lock().await;
        let conflicts: Vec<ConflictRecord> = self.read_collection(CONFLICTS_FILE).await?;
        Ok(conflicts.into_iter().find(|c| &c.id == conflict_id))
    }

    async fn upsert_conflict(&self, conflict: ConflictRecord) -> Result<()> {
        let _guard = self.conflicts_lock.lock().await;
        let mut conflicts: Vec<ConflictRecord> = self.read_collection(CONFLICTS_FILE).await?;
        match conflicts.iter_mut().find(|c| c.id == conflict.id) {
            Some(existing) => *existing = conflict,
            None => conflicts.push(conflict),
        }
        self.write_collection(CONFLICTS_FILE, &conflicts).await
    }

    async fn list_open_conflicts(
        &self,
        project_id: &Id,
        session_id: &Id,
    ) -> Result<Vec<ConflictRecord>> {
        let _guard = self.conflicts_lock.lock().await;
        let conflicts: Vec<ConflictRecord> = self.read_collection(CONFLICTS_FILE).await?;
        Ok(conflicts
            .into_iter()
            .filter(|c| {
                &c.project_id == project_id && &c.session_id == session_id && !c.is_resolved()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DealRoomContent, DraftData};
    use crate::store::traits::{DealRoomStore, DraftStore, VersionStore};
    use chrono::Duration;

    async fn store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn missing_files_read_as_empty() {
        let (_dir, store) = store().await;
        assert!(store
            .get_deal_room(&"p1".to_string())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .list_versions(&"p1".to_string())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn deal_room_roundtrip_is_unique_per_project() {
        let (_dir, store) = store().await;
        let mut room = DealRoom::new("p1");
        room.content.investment_blurb = "first".to_string();
        store.upsert_deal_room(room.clone()).await.unwrap();

        room.content.investment_blurb = "second".to_string();
        store.upsert_deal_room(room).await.unwrap();

        let loaded = store
            .get_deal_room(&"p1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.content.investment_blurb, "second");
    }

    #[tokio::test]
    async fn expired_draft_is_invisible_and_swept() {
        let (_dir, store) = store().await;
        let mut draft = DealRoomDraft::new("p1", "s1");
        draft.absorb(DraftData::default(), true);
        draft.expires_at = Utc::now() - Duration::hours(1);
        store.upsert_draft(draft).await.unwrap();

        assert!(store
            .get_draft(&"p1".to_string(), &"s1".to_string())
            .await
            .unwrap()
            .is_none());
        // Already removed by the read, so the sweep finds nothing.
        assert_eq!(store.delete_expired_drafts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn version_history_caps_at_limit_evicting_oldest() {
        let (_dir, store) = store().await;
        for n in 1..=15u64 {
            store
                .append_version(DealRoomVersion::new(
                    "p1",
                    n,
                    DealRoomContent::default(),
                    None,
                ))
                .await
                .unwrap();
        }

        let versions = store.list_versions(&"p1".to_string()).await.unwrap();
        assert_eq!(versions.len(), VERSION_HISTORY_LIMIT);
        assert_eq!(versions.first().unwrap().version, 15);
        assert_eq!(versions.last().unwrap().version, 6);

        let latest = store
            .latest_version(&"p1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.version, 15);
    }

    #[tokio::test]
    async fn truncation_is_per_project() {
        let (_dir, store) = store().await;
        for n in 1..=12u64 {
            store
                .append_version(DealRoomVersion::new(
                    "p1",
                    n,
                    DealRoomContent::default(),
                    None,
                ))
                .await
                .unwrap();
        }
        store
            .append_version(DealRoomVersion::new(
                "p2",
                1,
                DealRoomContent::default(),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(store.list_versions(&"p1".to_string()).await.unwrap().len(), 10);
        assert_eq!(store.list_versions(&"p2".to_string()).await.unwrap().len(), 1);
    }
}
