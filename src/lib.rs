//! Forum moderator library.
//!
//! Logs in to a forum board, scans each thread's posts for banned words and
//! deletes the first offending post through the forum's delete form.

pub mod config;
pub mod constants;
pub mod forum;
pub mod moderation;
pub mod pipeline;
