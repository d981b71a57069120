//! Snippet pipeline CLI.
//!
//! Provides the `snippetlab` binary with one subcommand per pipeline
//! operation, working directly against a SQLite database file.
//!
//! Uses the same `SnippetService` as the HTTP server, so generation,
//! refinement and test runs behave identically from both entry points. Model
//! and sandbox settings come from the same `SNIPPETLAB_*` environment
//! variables.

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use snippetlab_core::{Snippet, SnippetId, SnippetView};
use snippetlab_pipeline::{PipelineConfig, PipelineError, RefineTarget, SnippetService};
use snippetlab_storage::SqliteStore;

/// Generate, refine and test code snippets.
#[derive(Parser)]
#[command(name = "snippetlab", about = "Generate, refine and test code snippets")]
struct Cli {
    /// Path to the snippet database file.
    #[arg(long, global = true, env = "SNIPPETLAB_DB_PATH", default_value = "snippetlab.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List snippets in creation order.
    List,
    /// Create an empty snippet.
    Create,
    /// Print one snippet as JSON.
    Show { id: i64 },
    /// Generate code, title and language from a description.
    Generate { id: i64, description: String },
    /// Rewrite the code or the tests according to feedback.
    Refine {
        id: i64,
        /// `code` or `tests`.
        target: String,
        feedback: String,
    },
    /// Generate tests for the current code.
    Tests { id: i64 },
    /// Repair the code after a failed run.
    Regenerate { id: i64 },
    /// Run the snippet's tests.
    Run { id: i64 },
    /// Delete a snippet.
    Delete { id: i64 },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let service = match open_service(&cli.db) {
        Ok(service) => service,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            process::exit(3);
        }
    };

    if let Err(err) = execute(&service, cli.command).await {
        eprintln!("Error: {}", err);
        process::exit(exit_code(&err));
    }
}

fn open_service(db_path: &str) -> Result<SnippetService, String> {
    let store = SqliteStore::new(db_path)
        .map_err(|e| format!("failed to open database '{}': {}", db_path, e))?;
    let config = PipelineConfig::from_env().map_err(|e| e.to_string())?;
    SnippetService::from_config(Arc::new(store), &config).map_err(|e| e.to_string())
}

/// Execute one subcommand.
async fn execute(service: &SnippetService, command: Commands) -> Result<(), PipelineError> {
    match command {
        Commands::List => {
            for snippet in service.list()? {
                println!("{}", summary_line(&snippet));
            }
        }
        Commands::Create => {
            let snippet = service.create_empty()?;
            println!("{}", snippet.id);
        }
        Commands::Show { id } => print_json(&service.get(SnippetId(id))?),
        Commands::Generate { id, description } => {
            let report = service.generate_initial(SnippetId(id), &description).await?;
            for failure in &report.failures {
                eprintln!(
                    "warning: {} step failed{}: {}",
                    failure.step,
                    if failure.retryable { " (retryable)" } else { "" },
                    failure.message
                );
            }
            print_json(&report.snippet);
        }
        Commands::Refine {
            id,
            target,
            feedback,
        } => {
            let target: RefineTarget = target.parse()?;
            print_json(&service.refine(SnippetId(id), target, &feedback).await?);
        }
        Commands::Tests { id } => print_json(&service.generate_tests(SnippetId(id)).await?),
        Commands::Regenerate { id } => print_json(&service.regenerate(SnippetId(id)).await?),
        Commands::Run { id } => {
            let report = service.run_tests(SnippetId(id)).await?;
            println!("{}", report.outcome);
            if !report.message.is_empty() {
                println!("{}", report.message);
            }
        }
        Commands::Delete { id } => service.delete(SnippetId(id))?,
    }
    Ok(())
}

fn summary_line(snippet: &Snippet) -> String {
    let language = snippet
        .language
        .map(|language| language.as_str())
        .unwrap_or("-");
    let title = if snippet.title.is_empty() {
        "(untitled)"
    } else {
        snippet.title.as_str()
    };
    format!(
        "{}\t{}\t{}\t{}",
        snippet.id,
        language,
        snippet.effective_run().status(),
        title
    )
}

/// Renders the read view: effective run plus derived affordances.
fn render(snippet: &Snippet) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SnippetView::from(snippet))
}

fn print_json(snippet: &Snippet) {
    match render(snippet) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to render snippet: {}", e),
    }
}

/// Exit code: 1 = rejected request, 2 = model or sandbox failure,
/// 3 = storage error.
fn exit_code(err: &PipelineError) -> i32 {
    match err {
        PipelineError::Gateway { .. } | PipelineError::Execution(_) => 2,
        PipelineError::Storage(_) => 3,
        _ => 1,
    }
}
