use itertools::Itertools;

use crate::error::ServiceError;
use crate::model::{DealRoomLink, DealRoomUpdate, MAX_BLURB_LEN, MAX_SUMMARY_LEN};

/// Field validation for the direct update path. Draft saves deliberately skip
/// this: autosave must never bounce on a half-typed field.
pub fn validate_update(update: &DealRoomUpdate) -> Result<(), ServiceError> {
    let mut errors = Vec::new();

    if let Some(blurb) = &update.investment_blurb {
        if blurb.chars().count() > MAX_BLURB_LEN {
            errors.push(format!(
                "investmentBlurb must be at most {MAX_BLURB_LEN} characters"
            ));
        }
    }
    if let Some(summary) = &update.investment_summary {
        if summary.chars().count() > MAX_SUMMARY_LEN {
            errors.push(format!(
                "investmentSummary must be at most {MAX_SUMMARY_LEN} characters"
            ));
        }
    }
    if let Some(links) = &update.key_info {
        validate_links("keyInfo", links, &mut errors);
    }
    if let Some(links) = &update.external_links {
        validate_links("externalLinks", links, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors.join("; ")))
    }
}

fn validate_links(field: &str, links: &[DealRoomLink], errors: &mut Vec<String>) {
    for (idx, link) in links.iter().enumerate() {
        if link.name.trim().is_empty() {
            errors.push(format!("{field}[{idx}]: name is required"));
        }
        if !(link.url.starts_with("http://") || link.url.starts_with("https://")) {
            errors.push(format!(
                "{field}[{idx}]: url must start with http:// or https://"
            ));
        }
    }
    for dup in links.iter().map(|l| l.order).duplicates().sorted() {
        errors.push(format!("{field}: duplicate order {dup}"));
    }
}

pub fn validate_photo_mime(mime_type: &str) -> Result<(), ServiceError> {
    if mime_type.starts_with("image/") {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "showcasePhoto must be an image, got {mime_type}"
        )))
    }
}
