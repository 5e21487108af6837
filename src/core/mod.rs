//! Core Text Handling
//!
//! Offset and range arithmetic shared by the formatter and the LSP layer.

pub mod document;

pub use document::{position_at, whole_document_range};
