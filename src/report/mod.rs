//! Report assembly and rendering.

pub mod builder;
pub mod generator;

pub use builder::{build_report, AnalyticsReport, ReportOptions};
pub use generator::{generate_json_report, generate_markdown_report};
