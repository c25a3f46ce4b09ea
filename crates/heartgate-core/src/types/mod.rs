//! Domain types shared by every Heartgate crate.

pub mod claims;
pub mod lenient;
pub mod post_action;
pub mod session;

pub use claims::{HeartbeatClaims, RejectStrategy};
pub use post_action::PostAction;
pub use session::{SessionRecord, UserSessionData, UserSessionMap};
