use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, DealRoomContent, Id};

/// Immutable historical snapshot of a deal room's full content. Numbered per
/// project; numbers survive history truncation and are never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRoomVersion {
    pub id: Id,
    pub project_id: Id,
    pub version: u64,
    pub data: DealRoomContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DealRoomVersion {
    pub fn new(
        project_id: impl Into<Id>,
        version: u64,
        data: DealRoomContent,
        change_description: Option<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            project_id: project_id.into(),
            version,
            data,
            change_description,
            created_at: Utc::now(),
        }
    }
}
