//! LSP Protocol Implementation
//!
//! Thin backend that tracks open documents and answers formatting requests.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod server;

pub use backend::Backend;
