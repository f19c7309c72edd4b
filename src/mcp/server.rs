/// MCP server over stdio.
///
/// Provides `McpContext` (shared state) and `McpServer` (startup logic).
use crate::mcp::tools::AppTools;
use anyhow::{Context, Result};
use rmcp::{ServiceExt, handler::server::router::Router, transport::io::stdio};
use std::sync::Arc;
use tracing::info;

use crate::{config::Config, embedder::Embedder};

/// State shared by all tool handlers.
///
/// Holds no open store: each call opens the collection named by the config.
#[derive(Clone)]
pub struct McpContext {
    pub config: Arc<Config>,
    pub embedder: Arc<dyn Embedder>,
}

#[derive(Clone)]
pub struct McpServer {
    pub ctx: McpContext,
}

impl McpServer {
    pub fn new(ctx: McpContext) -> Self {
        Self { ctx }
    }

    /// Serve on stdio until the client disconnects.
    pub async fn start(self) -> Result<()> {
        info!(
            "Starting MCP server on stdio (collection '{}')",
            self.ctx.config.collection_name
        );
        let (stdin, stdout) = stdio();

        let app_tools = AppTools::new(self.ctx.clone());
        let router = Router::new(app_tools.clone()).with_tools(app_tools.tool_router.clone());

        let service = router
            .serve((stdin, stdout))
            .await
            .context("failed to start MCP stdio transport")?;
        service
            .waiting()
            .await
            .context("MCP server terminated with an error")?;

        Ok(())
    }
}
