/// MCP tool handlers exposing the FAQ engine to an answer-generation client.
///
/// 1. search_faq      – nearest FAQ questions with their age/answer tables
/// 2. build_index     – (re)build the collection from the configured spreadsheet
/// 3. collection_info – metadata and size of the configured collection
use crate::embedder::Embedder;
use crate::formatter::{format_answers, render_matches};
use crate::index::{FaqIndex, IndexBuilder};
use crate::mcp::server::McpContext;
use crate::retriever::Retriever;
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{ErrorData as McpError, handler::server::tool::ToolRouter, model::*, tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::PathBuf;

// ── Parameter structs ────────────────────────────────────────────────

#[derive(Deserialize, JsonSchema)]
pub struct SearchFaqParams {
    /// User question (natural language)
    pub query: String,
    /// Max results (default: search_top_k from config)
    pub top_k: Option<usize>,
}

#[derive(Deserialize, JsonSchema)]
pub struct BuildIndexParams {
    /// Delete and rebuild the collection even if it exists (default: false)
    pub force: Option<bool>,
    /// Spreadsheet to read instead of the configured source_path
    pub source_path: Option<String>,
}

// ── Response helpers ─────────────────────────────────────────────────

fn json_result(value: serde_json::Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&value).unwrap_or_default(),
    )]))
}

fn error_result(msg: &str) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.to_string())]))
}

fn join_error(e: tokio::task::JoinError) -> McpError {
    McpError::internal_error(format!("worker task failed: {e}"), None)
}

// ── Tool implementations ─────────────────────────────────────────────

#[derive(Clone)]
pub struct AppTools {
    pub ctx: McpContext,
    pub tool_router: ToolRouter<Self>,
}

impl ServerHandler for AppTools {}

#[tool_router]
impl AppTools {
    pub fn new(ctx: McpContext) -> Self {
        Self {
            ctx,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Find the FAQ questions closest to a user question. Each match carries a markdown table of answers per age range; an empty result means the FAQ has no answer."
    )]
    async fn search_faq(
        &self,
        params: Parameters<SearchFaqParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        if p.query.trim().is_empty() {
            return error_result("query is required");
        }

        let top_k = p.top_k.unwrap_or(self.ctx.config.search_top_k);
        let retrieval_ctx = self.ctx.config.retrieval_context();
        let embedder = self.ctx.embedder.clone();

        let matches = tokio::task::spawn_blocking(move || {
            Retriever::new(embedder.as_ref()).query(&p.query, &retrieval_ctx, top_k)
        })
        .await
        .map_err(join_error)?;

        let results: Vec<serde_json::Value> = matches
            .iter()
            .enumerate()
            .map(|(idx, m)| {
                serde_json::json!({
                    "rank": idx + 1,
                    "question": m.question,
                    "distance": m.distance,
                    "table": format_answers(&m.answers),
                })
            })
            .collect();

        json_result(serde_json::json!({
            "results": results,
            "context": render_matches(&matches),
        }))
    }

    #[tool(
        description = "Build the FAQ collection from the spreadsheet. Without force, an existing collection is kept as-is."
    )]
    async fn build_index(
        &self,
        params: Parameters<BuildIndexParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let config = self.ctx.config.clone();
        let embedder = self.ctx.embedder.clone();
        let force = p.force.unwrap_or(config.force_rebuild);
        let source_path = p
            .source_path
            .map(PathBuf::from)
            .unwrap_or_else(|| config.source_path.clone());

        let outcome = tokio::task::spawn_blocking(move || {
            let retrieval_ctx = config.retrieval_context();
            let index = IndexBuilder::new(embedder.as_ref())
                .with_id_strategy(config.id_strategy)
                .build_from_source(&source_path, &retrieval_ctx, force)?;
            index.count().map(|count| (index.info().name.clone(), count))
        })
        .await
        .map_err(join_error)?;

        match outcome {
            Ok((collection, count)) => json_result(serde_json::json!({
                "success": true,
                "collection": collection,
                "questions": count,
            })),
            Err(e) => error_result(&format!("build failed: {e}")),
        }
    }

    #[tool(description = "Show metadata of the configured FAQ collection")]
    async fn collection_info(&self) -> Result<CallToolResult, McpError> {
        let retrieval_ctx = self.ctx.config.retrieval_context();
        let model_id = self.ctx.embedder.model_id().to_string();

        let outcome = tokio::task::spawn_blocking(move || -> crate::error::Result<_> {
            match FaqIndex::open(&retrieval_ctx)? {
                Some(index) => Ok(Some((index.info().clone(), index.count()?))),
                None => Ok(None),
            }
        })
        .await
        .map_err(join_error)?;

        match outcome {
            Ok(Some((info, count))) => json_result(serde_json::json!({
                "collection": info.name,
                "questions": count,
                "embedding_model": info.embedding_model,
                "dimensions": info.dimensions,
                "distance_metric": info.distance_metric,
                "created_at": info.created_at.to_rfc3339(),
                "model_matches": info.embedding_model == model_id,
            })),
            Ok(None) => error_result("collection not built yet"),
            Err(e) => error_result(&format!("failed to open collection: {e}")),
        }
    }
}
