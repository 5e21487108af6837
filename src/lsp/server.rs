use anyhow::Result;
use env_logger::Env;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::Config;
use crate::lsp::backend::Backend;

/// Start the LSP server
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;

    // stderr only: stdout carries the protocol
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .target(env_logger::Target::Stderr)
        .init();

    if let Some(path) = &config.config_file {
        log::info!("Loaded configuration from {}", path.display());
    }
    log::debug!("Server defaults: {:?}", config.formatter);

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config.clone())).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
