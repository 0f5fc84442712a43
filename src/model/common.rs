use uuid::Uuid;

pub type Id = String;

/// Version history is truncated to this many entries per project. Version
/// numbers keep increasing past the cap and are never reused.
pub const VERSION_HISTORY_LIMIT: usize = 10;

/// Drafts expire this many hours after their last save.
pub const DRAFT_TTL_HOURS: i64 = 24;

pub const MAX_BLURB_LEN: usize = 500;
pub const MAX_SUMMARY_LEN: usize = 10_000;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}
