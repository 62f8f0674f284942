//! Forum transport: the authenticated session and the board listing walk.

pub mod listing;
pub mod session;

pub use listing::{extract_thread_links, ListingError, ThreadSummary};
pub use session::{ForumSession, SessionError};
