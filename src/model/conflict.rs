use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, DealRoomContent, DraftData, Id};

/// How a detected publish conflict should be settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// The editing session's staged fields win.
    UseLocal,
    /// The canonical document as it stood at detection time wins.
    UseServer,
    /// Field-by-field merge; local wins on any field it staged.
    Merge,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::UseLocal => "use_local",
            ConflictStrategy::UseServer => "use_server",
            ConflictStrategy::Merge => "merge",
        }
    }
}

/// Record of a divergence detected at publish time between a draft's base
/// state and the canonical document. Open while `resolved_at` is unset;
/// immutable once resolved except for the resolution fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    pub id: Id,
    pub project_id: Id,
    pub session_id: Id,
    /// Published version the draft was based on.
    pub local_version: u64,
    /// Published version the canonical document had moved to.
    pub server_version: u64,
    pub local_data: DraftData,
    pub server_data: DealRoomContent,
    pub conflict_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ConflictStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_data: Option<DealRoomContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ConflictRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        project_id: impl Into<Id>,
        session_id: impl Into<Id>,
        local_version: u64,
        server_version: u64,
        local_data: DraftData,
        server_data: DealRoomContent,
        conflict_fields: Vec<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            project_id: project_id.into(),
            session_id: session_id.into(),
            local_version,
            server_version,
            local_data,
            server_data,
            conflict_fields,
            resolution: None,
            resolved_data: None,
            resolved_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }

    pub fn mark_resolved(
        &mut self,
        resolution: Option<ConflictStrategy>,
        resolved_data: DealRoomContent,
    ) {
        self.resolution = resolution;
        self.resolved_data = Some(resolved_data);
        self.resolved_at = Some(Utc::now());
    }
}
