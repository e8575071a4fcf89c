//! MCP server initialization for stdio and streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that build the
//! diary pipeline once and wire it into a running MCP tool server.

use crate::tools::DiaryTools;
use anyhow::Result;
use diarist::config::DiaristConfig;
use rmcp::ServiceExt;
use std::sync::Arc;

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: DiaristConfig) -> Result<()> {
    tracing::info!("starting Diarist MCP server on stdio");

    let pipeline = Arc::new(crate::cli::build_pipeline(&config)?);
    tracing::info!(entries = %pipeline.store().path().display(), "diary ready");

    let tools = DiaryTools::new(pipeline);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP transport.
pub async fn serve_http(config: DiaristConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting Diarist MCP server on HTTP");

    let pipeline = Arc::new(crate::cli::build_pipeline(&config)?);

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(DiaryTools::new(Arc::clone(&pipeline))),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
