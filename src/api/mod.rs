//! API Module
//!
//! This module exposes the grading workflow over HTTP: prompt and essay
//! uploads, batch start, status polling and the plain-text report export.

mod server;


pub use server::{ApiError, AppState, Server, router};
