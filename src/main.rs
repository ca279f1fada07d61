//! Entry point for the Language Server Protocol implementation.

use mc_i18n_language_server::Backend;
use tower_lsp::{
    LspService,
    Server,
};

/// Serves LSP over stdio, logging to stderr.
#[tokio::main]
async fn main() {
    // stdout carries the LSP transport; logs go to stderr.
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting mc-i18n language server");

    let (stdin, stdout) = (tokio::io::stdin(), tokio::io::stdout());
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
