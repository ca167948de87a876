//! The employee report: console rendering and the end-to-end run.
//!
//! This module keeps formatting separate from connection handling so each
//! can be tested on its own.

pub mod render;
pub mod runner;

pub use render::{format_employee, ReportRenderer};
pub use runner::{ReportRunner, ReportSummary};
