use chrono::Utc;
use clap::{Parser, Subcommand};
use legal_search_core::{
    BackendDirectory, ClientConfig, QueryLifecycleController, SearchBackend, SearchView,
    DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS,
};
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "legal-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Legal search backend base URL
    #[arg(long, env = "LEGAL_SEARCH_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Request timeout in seconds; 0 waits indefinitely
    #[arg(long, env = "LEGAL_SEARCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Submit one query and print the summary and matching documents.
    Search {
        /// Free-text legal query
        #[arg(long)]
        query: String,
    },
    /// Read queries from stdin, one per line, until EOF or `:quit`.
    Interactive,
    /// Check that the backend is up.
    Health,
    /// List the documents and endpoints the backend advertises.
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::new(cli.backend_url, cli.timeout_secs);
    let backend = config
        .build_backend()
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    info!(
        version = app_version,
        backend = %backend.base_url(),
        started_at = %Utc::now().to_rfc3339(),
        "legal-search boot"
    );

    match cli.command {
        Command::Search { query } => {
            let controller = QueryLifecycleController::with_timeout(backend, config.timeout);
            let _progress = spawn_progress_reporter(&controller);

            controller.submit(&query).await;
            let view = controller.view();
            render(&view);

            if view.error_banner.is_some() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Interactive => {
            let controller = QueryLifecycleController::with_timeout(backend, config.timeout);
            let _progress = spawn_progress_reporter(&controller);
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                print!("query> ");
                std::io::stdout().flush()?;

                let Some(line) = lines.next_line().await? else {
                    break;
                };
                if line.trim() == ":quit" {
                    break;
                }

                controller.submit(&line).await;
                render(&controller.view());
            }
        }
        Command::Health => {
            let health = backend
                .health()
                .await
                .map_err(|error| anyhow::anyhow!(error.user_message()))?;
            println!("status: {}", health.status);
            println!("message: {}", health.message);

            if !health.is_ok() {
                warn!(status = %health.status, "backend reported a non-ok status");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Catalog => {
            let catalog = backend
                .catalog()
                .await
                .map_err(|error| anyhow::anyhow!(error.user_message()))?;
            println!("{} v{}", catalog.api_name, catalog.version);
            println!("{}", catalog.description);
            println!("documents: {}", catalog.total_documents);
            for document in &catalog.documents {
                println!(
                    "  [{}] {} ({} chars)",
                    document.id, document.title, document.content_length
                );
            }
            println!("endpoints:");
            for endpoint in &catalog.endpoints {
                println!(
                    "  {} {} - {}",
                    endpoint.method, endpoint.path, endpoint.description
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Prints a line whenever a submission enters `Loading`. The task ends when
/// the controller is dropped.
fn spawn_progress_reporter<B>(
    controller: &QueryLifecycleController<B>,
) -> tokio::task::JoinHandle<()>
where
    B: SearchBackend + Send + Sync,
{
    let mut states = controller.subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let view = SearchView::from_state(&states.borrow_and_update());
            if !view.submit_enabled {
                eprintln!("{}", view.submit_label);
            }
        }
    })
}

fn render(view: &SearchView) {
    if let Some(banner) = &view.error_banner {
        println!("error: {banner}");
        return;
    }

    if let Some(summary) = &view.summary {
        println!("summary: {summary}");
    }

    if view.empty_results {
        println!("no matching documents");
    }

    for (index, card) in view.documents.iter().enumerate() {
        println!(
            "[{}] {} doc_id={} relevance={}",
            index + 1,
            card.title,
            card.doc_id,
            card.relevance_label
        );
        println!("  {}", card.excerpt);
    }
}
