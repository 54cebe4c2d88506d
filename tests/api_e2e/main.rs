//! API test suite.
//!
//! Exercises the HTTP surface end to end against an in-memory SQLite
//! database; no external services required.
//!
//! Run with: cargo test --test api_e2e

mod test_helpers;

mod test_attachments;
mod test_dashboard;
mod test_import_export;
mod test_templates_comments;
mod test_versions;
