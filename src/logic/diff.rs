use crate::model::{DealRoomContent, DraftData};

pub const FIELD_SHOWCASE_PHOTO: &str = "showcasePhoto";
pub const FIELD_INVESTMENT_BLURB: &str = "investmentBlurb";
pub const FIELD_INVESTMENT_SUMMARY: &str = "investmentSummary";
pub const FIELD_KEY_INFO: &str = "keyInfo";
pub const FIELD_EXTERNAL_LINKS: &str = "externalLinks";

/// Tracked fields that differ between two full content snapshots. Used at
/// publish time to decide whether the canonical document moved under a draft.
pub fn changed_fields(base: &DealRoomContent, current: &DealRoomContent) -> Vec<String> {
    let mut fields = Vec::new();
    if base.investment_blurb != current.investment_blurb {
        fields.push(FIELD_INVESTMENT_BLURB.to_string());
    }
    if base.investment_summary != current.investment_summary {
        fields.push(FIELD_INVESTMENT_SUMMARY.to_string());
    }
    if base.key_info != current.key_info {
        fields.push(FIELD_KEY_INFO.to_string());
    }
    if base.external_links != current.external_links {
        fields.push(FIELD_EXTERNAL_LINKS.to_string());
    }
    if base.showcase_photo != current.showcase_photo {
        fields.push(FIELD_SHOWCASE_PHOTO.to_string());
    }
    fields
}

/// Fallback when the draft's base snapshot has been truncated out of history:
/// compare only the fields the draft actually staged against canonical.
pub fn draft_changed_fields(local: &DraftData, current: &DealRoomContent) -> Vec<String> {
    let mut fields = Vec::new();
    if let Some(blurb) = &local.investment_blurb {
        if blurb != &current.investment_blurb {
            fields.push(FIELD_INVESTMENT_BLURB.to_string());
        }
    }
    if let Some(summary) = &local.investment_summary {
        if summary != &current.investment_summary {
            fields.push(FIELD_INVESTMENT_SUMMARY.to_string());
        }
    }
    if let Some(key_info) = &local.key_info {
        if key_info != &current.key_info {
            fields.push(FIELD_KEY_INFO.to_string());
        }
    }
    if let Some(links) = &local.external_links {
        if links != &current.external_links {
            fields.push(FIELD_EXTERNAL_LINKS.to_string());
        }
    }
    if let Some(photo) = &local.showcase_photo {
        if current.showcase_photo.as_ref() != Some(photo) {
            fields.push(FIELD_SHOWCASE_PHOTO.to_string());
        }
    }
    fields
}

/// Local-wins merge: start from the server's content and overlay every field
/// the local side staged.
pub fn overlay_local(local: &DraftData, server: &DealRoomContent) -> DealRoomContent {
    let mut merged = server.clone();
    local.apply_to(&mut merged);
    merged
}
