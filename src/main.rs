use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faqrag::config::{Config, DEFAULT_CONFIG_PATH};
use faqrag::db::{Db, store_file};
use faqrag::embedder::Embedder;
use faqrag::embedder::download::ensure_model_files;
use faqrag::embedder::mock::MockEmbedder;
use faqrag::embedder::onnx::OnnxEmbedder;
use faqrag::formatter::render_matches;
use faqrag::mcp::server::{McpContext, McpServer};
use faqrag::{FaqIndex, IndexBuilder, Retriever};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "faqrag", version, about = "Semantic FAQ retrieval over a spreadsheet")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use the deterministic mock embedder instead of the ONNX model
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the collection from the configured spreadsheet
    Build {
        /// Delete and rebuild an existing collection
        #[arg(long)]
        force: bool,
        /// Spreadsheet to read instead of the configured source_path
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Query the collection and print the matching answer tables
    Query {
        text: String,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show collection metadata
    Info,
    /// Serve MCP tools over stdio
    Serve,
}

fn load_embedder(config: &Config, mock: bool) -> Result<Arc<dyn Embedder>> {
    if mock || config.model.use_mock {
        info!("Using mock embedder ({} dimensions)", config.model.dimensions);
        return Ok(Arc::new(MockEmbedder::new(config.model.dimensions)));
    }

    ensure_model_files(&config.model.dir, &config.model.name)?;
    let embedder = OnnxEmbedder::new(&config.model.dir, &config.model.name, config.model.dimensions)
        .context("failed to load embedding model")?;
    Ok(Arc::new(embedder))
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;
    let config = Arc::new(config);
    let ctx = config.retrieval_context();

    match cli.command {
        Command::Build { force, source } => {
            let embedder = load_embedder(&config, cli.mock)?;
            let source = source.unwrap_or_else(|| config.source_path.clone());
            let force = force || config.force_rebuild;
            let index = tokio::task::spawn_blocking(move || {
                IndexBuilder::new(embedder.as_ref())
                    .with_id_strategy(config.id_strategy)
                    .build_from_source(&source, &ctx, force)
                    .and_then(|index| index.count().map(|n| (index.info().name.clone(), n)))
            })
            .await?;
            let (name, count) = index.context("build failed")?;
            println!("Collection '{name}' ready with {count} questions");
        }
        Command::Query { text, top_k } => {
            let embedder = load_embedder(&config, cli.mock)?;
            let top_k = top_k.unwrap_or(config.search_top_k);
            let matches = tokio::task::spawn_blocking(move || {
                Retriever::new(embedder.as_ref()).query(&text, &ctx, top_k)
            })
            .await?;
            println!("{}", render_matches(&matches));
        }
        Command::Info => match FaqIndex::open(&ctx)? {
            Some(index) => {
                let info = index.info();
                println!("collection:      {}", info.name);
                println!("questions:       {}", index.count()?);
                println!("embedding model: {} ({} dims)", info.embedding_model, info.dimensions);
                println!("metric:          {}", info.distance_metric);
                println!("created at:      {}", info.created_at.to_rfc3339());
            }
            None => {
                println!(
                    "Collection '{}' not found in {}",
                    ctx.collection_name,
                    ctx.storage_location.display()
                );
                let store = store_file(&ctx.storage_location);
                if store.exists() {
                    let names: Vec<String> = Db::open_read_only(&store)?
                        .list_collections()?
                        .into_iter()
                        .map(|c| c.name)
                        .collect();
                    if !names.is_empty() {
                        println!("available collections: {}", names.join(", "));
                    }
                }
            }
        },
        Command::Serve => {
            let embedder = load_embedder(&config, cli.mock)?;
            McpServer::new(McpContext { config, embedder }).start().await?;
        }
    }

    Ok(())
}
