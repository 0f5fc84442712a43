use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, DealRoomContent, DealRoomLink, Id, ShowcasePhoto, DRAFT_TTL_HOURS};

/// Staged deal room fields. Every field is optional; unset fields mean "no
/// change relative to the canonical document".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_blurb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<Vec<DealRoomLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_links: Option<Vec<DealRoomLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showcase_photo: Option<ShowcasePhoto>,
}

impl DraftData {
    /// Overlay another partial payload on top of this one. Set fields in
    /// `incoming` win; unset fields keep the previously staged value.
    pub fn merge_from(&mut self, incoming: DraftData) {
        if incoming.investment_blurb.is_some() {
            self.investment_blurb = incoming.investment_blurb;
        }
        if incoming.investment_summary.is_some() {
            self.investment_summary = incoming.investment_summary;
        }
        if incoming.key_info.is_some() {
            self.key_info = incoming.key_info;
        }
        if incoming.external_links.is_some() {
            self.external_links = incoming.external_links;
        }
        if incoming.showcase_photo.is_some() {
            self.showcase_photo = incoming.showcase_photo;
        }
    }

    /// Apply the staged fields onto canonical content (partial overwrite).
    pub fn apply_to(&self, content: &mut DealRoomContent) {
        if let Some(blurb) = &self.investment_blurb {
            content.investment_blurb = blurb.clone();
        }
        if let Some(summary) = &self.investment_summary {
            content.investment_summary = summary.clone();
        }
        if let Some(key_info) = &self.key_info {
            content.key_info = key_info.clone();
        }
        if let Some(links) = &self.external_links {
            content.external_links = links.clone();
        }
        if let Some(photo) = &self.showcase_photo {
            content.showcase_photo = Some(photo.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.investment_blurb.is_none()
            && self.investment_summary.is_none()
            && self.key_info.is_none()
            && self.external_links.is_none()
            && self.showcase_photo.is_none()
    }
}

/// Per-(project, session) autosave buffer. Superseded in place on every save;
/// at most one draft exists per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRoomDraft {
    pub id: Id,
    pub project_id: Id,
    pub session_id: Id,
    pub draft_data: DraftData,
    /// Strictly increasing per (project, session); bumped on every save.
    pub version: u64,
    /// The published version number this draft was last synchronized with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved_version: Option<u64>,
    pub is_auto_save: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DealRoomDraft {
    pub fn new(project_id: impl Into<Id>, session_id: impl Into<Id>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            project_id: project_id.into(),
            session_id: session_id.into(),
            draft_data: DraftData::default(),
            version: 0,
            last_saved_version: None,
            is_auto_save: false,
            expires_at: now + Duration::hours(DRAFT_TTL_HOURS),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an incoming save into the draft: staged fields are overlaid,
    /// the draft version is bumped, and the TTL restarts.
    pub fn absorb(&mut self, data: DraftData, is_auto_save: bool) {
        let now = Utc::now();
        self.draft_data.merge_from(data);
        self.version += 1;
        self.is_auto_save = is_auto_save;
        self.expires_at = now + Duration::hours(DRAFT_TTL_HOURS);
        self.updated_at = now;
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True when the draft holds content that has not been published since
    /// its last save.
    pub fn has_unsaved_changes(&self) -> bool {
        match self.last_saved_version {
            None => true,
            Some(last) => self.version > last,
        }
    }
}
