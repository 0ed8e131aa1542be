//! classwork-report — renderers for class reports.

pub mod html;

pub use html::{generate_html, write_html_report};
