pub mod common;
pub mod conflict;
pub mod deal_room;
pub mod draft;
pub mod version;

pub use common::*;
pub use conflict::*;
pub use deal_room::*;
pub use draft::*;
pub use version::*;
