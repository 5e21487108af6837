use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::Config;
use crate::config::FormatterSettings;
use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{HandleConfiguration, HandleFormatting};

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    /// Last settings pushed by the editor (initializationOptions or didChangeConfiguration)
    pub client_settings: Arc<RwLock<FormatterSettings>>,
    /// Whether the editor answers `workspace/configuration`
    pub pull_configuration: AtomicBool,
    pub config: Config,
}

impl Backend {
    pub fn new(client: Client, config: Config) -> Self {
        Self {
            client,
            documents: Arc::new(Mutex::new(HashMap::new())),
            client_settings: Arc::new(RwLock::new(FormatterSettings::default())),
            pull_configuration: AtomicBool::new(false),
            config,
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        let can_pull = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.configuration)
            .unwrap_or(false);
        self.pull_configuration.store(can_pull, Ordering::Relaxed);

        if let Some(options) = params.initialization_options {
            self.update_client_settings(options).await;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                document_formatting_provider: Some(OneOf::Left(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "verilog-format-ls initialized")
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    async fn formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> tower_lsp::jsonrpc::Result<Option<Vec<TextEdit>>> {
        self.handle_formatting(params).await
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        // Pull-model clients send a bare notification; keep what we have
        if !params.settings.is_null() {
            self.update_client_settings(params.settings).await;
        }
    }

    // Formatting works on the editor's text, not the file on disk
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let state = DocumentState::new(&doc.uri, doc.text, doc.version);

        let mut docs = self.documents.lock().await;
        docs.insert(doc.uri, state);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        if let Some(change) = params.content_changes.into_iter().last() {
            let mut docs = self.documents.lock().await;
            if docs.get(&uri).is_some_and(|current| current.is_stale(version)) {
                log::debug!("Ignoring stale change to {} (version {})", uri, version);
                return;
            }
            docs.insert(uri.clone(), DocumentState::new(&uri, change.text, version));
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut docs = self.documents.lock().await;
        docs.remove(&params.text_document.uri);
    }
}
