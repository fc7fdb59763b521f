use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;

use docs_assistant::core::config::AppPaths;
use docs_assistant::core::logging;
use docs_assistant::rag::AnswerResult;
use docs_assistant::server;
use docs_assistant::state::error::InitializationError;
use docs_assistant::state::AppState;

/// Answers questions about a scraped documentation corpus.
#[derive(Parser, Debug)]
#[command(name = "docs-assistant", version, about, long_about = None)]
struct Cli {
    /// Subcommand (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve,
    /// Answer a single question and exit
    Ask {
        /// The question to ask
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let state = match AppState::initialize(paths).await {
        Ok(state) => state,
        Err(InitializationError::CorpusMissing(path)) => {
            tracing::error!("Docs file not found: {}", path);
            eprintln!("Docs file not found. Run scraper first.");
            std::process::exit(1);
        }
        Err(err) => return Err(err).context("Failed to initialize assistant"),
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(state).await,
        Commands::Ask { query } => ask(state, &query).await,
    }
}

async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", state.settings.server.host, state.settings.server.port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("DOCS_ASSISTANT_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn ask(state: Arc<AppState>, query: &str) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Query must not be empty");
    }

    let result = state
        .assistant()
        .await
        .answer(query.trim())
        .await
        .context("Failed to answer query")?;
    print_answer(&result);
    Ok(())
}

fn print_answer(result: &AnswerResult) {
    println!("{}", result.answer);

    if let Some(confidence) = result.confidence {
        println!("\nConfidence: {:.2}", confidence);
    }

    if !result.sources.is_empty() {
        println!("\nSources:");
        for (i, source) in result.sources.iter().enumerate() {
            println!(
                "  {}. {} ({:.2})\n     {}",
                i + 1,
                source.section,
                source.confidence,
                source.content_preview
            );
        }
    }
}
