//! SeaORM entity definitions for the SQLite database.

pub mod attachment;
pub mod step;
pub mod template_step;
pub mod test_case;
pub mod test_case_comment;
pub mod test_case_execution;
pub mod test_case_template;
pub mod test_case_version;
pub mod test_run;
pub mod version_step;
