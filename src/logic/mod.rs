pub mod diff;
pub mod service;
pub mod validate;

pub use service::{DealRoomService, PublishOutcome, ResolveOutcome, SaveStatus};
