use std::path::PathBuf;

use tower_lsp::lsp_types::Url;

/// State for each open document
#[derive(Debug)]
pub struct DocumentState {
    pub content: String,
    pub version: i32,
    /// Source file on disk; `None` for non-`file:` documents
    pub path: Option<PathBuf>,
}

impl DocumentState {
    pub fn new(uri: &Url, content: String, version: i32) -> Self {
        Self {
            content,
            version,
            path: uri.to_file_path().ok(),
        }
    }

    /// Whether `version` is older than the text already held
    pub fn is_stale(&self, version: i32) -> bool {
        version < self.version
    }
}
