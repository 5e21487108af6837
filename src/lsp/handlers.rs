use std::sync::atomic::Ordering;

use serde_json::Value;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::config::{FormatterSettings, SETTINGS_SECTION};
use crate::format::Formatter;
use crate::lsp::backend::Backend;

/// Prefix of every error shown to the user
pub const MESSAGE_PREFIX: &str = "Verilog Format: ";

/// Trait for handling formatting requests
#[tower_lsp::async_trait]
pub trait HandleFormatting {
    async fn handle_formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> LspResult<Option<Vec<TextEdit>>>;
}

/// Trait for reading the editor's `verilog-format` settings
#[tower_lsp::async_trait]
pub trait HandleConfiguration {
    async fn update_client_settings(&self, value: Value);
    async fn request_settings(&self, scope: &Url) -> FormatterSettings;
}

#[tower_lsp::async_trait]
impl HandleFormatting for Backend {
    async fn handle_formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> LspResult<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;

        let (content, path) = {
            let docs = self.documents.lock().await;
            match docs.get(&uri) {
                Some(state) => (state.content.clone(), state.path.clone()),
                None => {
                    log::warn!("Formatting requested for unopened document {}", uri);
                    return Ok(None);
                }
            }
        };

        let settings = self
            .config
            .effective_settings(self.request_settings(&uri).await);
        let formatter = Formatter::new(settings).with_temp_dir(self.config.temp_dir.clone());

        match formatter.format_edits(&content, path.as_deref()).await {
            Ok(edits) => Ok(Some(edits)),
            Err(e) => {
                log::error!("Formatting {} failed: {}", uri, e);
                self.client
                    .show_message(MessageType::ERROR, format!("{}{}", MESSAGE_PREFIX, e))
                    .await;
                Ok(Some(Vec::new()))
            }
        }
    }
}

#[tower_lsp::async_trait]
impl HandleConfiguration for Backend {
    async fn update_client_settings(&self, value: Value) {
        let settings = FormatterSettings::from_client_value(&value);
        log::debug!("Editor settings updated: {:?}", settings);
        *self.client_settings.write().await = settings;
    }

    /// Settings for one request, pulled fresh when the editor supports it
    async fn request_settings(&self, scope: &Url) -> FormatterSettings {
        let cached = self.client_settings.read().await.clone();
        if !self.pull_configuration.load(Ordering::Relaxed) {
            return cached;
        }

        let item = ConfigurationItem {
            scope_uri: Some(scope.clone()),
            section: Some(SETTINGS_SECTION.to_string()),
        };
        match self.client.configuration(vec![item]).await {
            Ok(values) => values
                .first()
                .map(FormatterSettings::from_client_value)
                .unwrap_or_default()
                .or(&cached),
            Err(e) => {
                log::warn!("workspace/configuration failed: {}", e);
                cached
            }
        }
    }
}
