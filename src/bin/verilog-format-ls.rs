use anyhow::Result;
use verilog_format_ls::lsp::server::serve;

#[tokio::main]
async fn main() -> Result<()> {
    serve().await
}
