use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, Id};

/// A named, ordered link shown on the deal room page. Used for both the
/// key-info list and the external-links list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRoomLink {
    pub name: String,
    pub url: String,
    pub order: u32,
}

/// Metadata for the uploaded showcase photo. The binary itself lives under
/// the uploads directory; `filename` is the stored name on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcasePhoto {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

/// The editable content of a deal room. This is what drafts stage, what
/// version snapshots capture, and what conflict resolution operates on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRoomContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showcase_photo: Option<ShowcasePhoto>,
    #[serde(default)]
    pub investment_blurb: String,
    #[serde(default)]
    pub investment_summary: String,
    #[serde(default)]
    pub key_info: Vec<DealRoomLink>,
    #[serde(default)]
    pub external_links: Vec<DealRoomLink>,
}

/// The canonical published deal room document. One per project, created
/// lazily on first access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRoom {
    pub id: Id,
    pub project_id: Id,
    #[serde(flatten)]
    pub content: DealRoomContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DealRoom {
    pub fn new(project_id: impl Into<Id>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            project_id: project_id.into(),
            content: DealRoomContent::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial update payload for the direct (unguarded) update path. Unset
/// fields leave the canonical value unchanged. The showcase photo is managed
/// through its own upload/delete endpoints and is not updatable here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRoomUpdate {
    pub investment_blurb: Option<String>,
    pub investment_summary: Option<String>,
    pub key_info: Option<Vec<DealRoomLink>>,
    pub external_links: Option<Vec<DealRoomLink>>,
}

impl DealRoomUpdate {
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_room_serializes_content_flat() {
        let mut room = DealRoom::new("proj-1");
        room.content.investment_blurb = "Great deal".to_string();

        let json = serde_json::to_value(&room).unwrap();
        assert_eq!(json["projectId"], "proj-1");
        assert_eq!(json["investmentBlurb"], "Great deal");
        // No nested "content" object on the wire
        assert!(json.get("content").is_none());
    }

    #[test]
    fn partial_update_leaves_unset_fields() {
        let mut content = DealRoomContent {
            investment_blurb: "old blurb".to_string(),
            investment_summary: "old summary".to_string(),
            ..Default::default()
        };
        let update = DealRoomUpdate {
            investment_blurb: Some("new blurb".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut content);
        assert_eq!(content.investment_blurb, "new blurb");
        assert_eq!(content.investment_summary, "old summary");
    }
}
