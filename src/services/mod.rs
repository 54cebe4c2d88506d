//! Business logic services.

pub mod docx;
pub mod spreadsheet;
pub mod storage;

pub use storage::AttachmentStore;
