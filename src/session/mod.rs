//! Session Module
//!
//! This module keeps uploaded grading material in memory between requests:
//! one prompt image per session plus the essays attached to it. A session is
//! locked while a batch task is running over it.

mod store;


pub use store::{Session, SessionStore};
