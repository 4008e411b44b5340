//! Report Module
//!
//! Everything derived from finished outcomes:
//! - aggregate: the terminal report (summary + ordered details)
//! - export: the flattened plain-text rendering
//! - notice: per-student notification content

mod aggregate;
mod export;
mod notice;

#[cfg(test)]
mod tests;

pub use aggregate::build_report;
pub use export::render_report;
pub use notice::{failure_notice, graded_notice};
