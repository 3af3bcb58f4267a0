//! ncbench CLI - submit and watch NoCode-bench evaluation tasks.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use ncbench_client::{
    ApiClient, ClientError, FileTaskStore, PollConfig, PollOutcome, Poller, TaskStore,
};
use ncbench_core::{TaskId, TaskRequest, TaskSnapshot};

mod catalog;

use catalog::Catalog;

/// ncbench - run code-edit evaluations against a NoCode-bench backend
#[derive(Parser)]
#[command(name = "ncbench")]
#[command(about = "CLI for the NoCode-bench evaluation backend", long_about = None)]
struct Cli {
    /// Backend origin; falls back to $NCBENCH_API_BASE, then a local dev server
    #[arg(short, long, default_value = "")]
    origin: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a custom repository against an instruction
    #[command(name = "run-custom")]
    RunCustom {
        /// Absolute http(s) URL of the repository
        #[arg(long)]
        github_url: String,

        /// Natural-language description of the intended change
        #[arg(long)]
        doc_change: String,

        /// Submit without waiting for the result
        #[arg(long)]
        no_follow: bool,
    },

    /// Run a pre-registered verified bench instance
    #[command(name = "run-bench")]
    RunBench {
        /// Bench instance id (see list-bench)
        #[arg(long)]
        bench_id: String,

        /// Submit without waiting for the result
        #[arg(long)]
        no_follow: bool,
    },

    /// List verified bench instances from a catalog file
    #[command(name = "list-bench")]
    ListBench {
        /// Catalog JSON file
        #[arg(long, default_value = "requestOptions.json")]
        catalog: PathBuf,
    },

    /// Resume watching an already-submitted task
    Watch {
        /// Task ID
        id: String,
    },

    /// Show a task's current status and result
    Show {
        /// Task ID; defaults to the last submitted task
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let origin = if cli.origin.trim().is_empty() {
        std::env::var("NCBENCH_API_BASE").unwrap_or_default()
    } else {
        cli.origin
    };
    let client = Arc::new(ApiClient::new(&origin));
    debug!(origin = %client.origin(), "using backend origin");

    let store = FileTaskStore::open_default()?;

    match cli.command {
        Commands::RunCustom {
            github_url,
            doc_change,
            no_follow,
        } => {
            let request = TaskRequest::custom_repo(github_url, doc_change);
            run_task(client, &store, request, no_follow).await?;
        }
        Commands::RunBench {
            bench_id,
            no_follow,
        } => {
            let request = TaskRequest::bench(bench_id);
            run_task(client, &store, request, no_follow).await?;
        }
        Commands::ListBench { catalog } => {
            list_bench(&catalog)?;
        }
        Commands::Watch { id } => {
            follow_task(client, TaskId::new(id)).await?;
        }
        Commands::Show { id } => {
            show_task(client, &store, id).await?;
        }
    }

    Ok(())
}

/// Submit a task and, unless `--no-follow` was given, poll it to a
/// terminal state.
async fn run_task(
    client: Arc<ApiClient>,
    store: &dyn TaskStore,
    request: TaskRequest,
    no_follow: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = match client.submit(&request, store).await {
        Ok(id) => id,
        Err(e) if e.is_validation() => {
            eprintln!("invalid input: {}", e);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    println!("Task created: {}", id);

    if no_follow {
        println!("Not waiting for the result; run `ncbench watch {}` to resume.", id);
        return Ok(());
    }

    follow_task(client, id).await
}

/// Poll a task to a terminal state, rendering live progress and honoring
/// Ctrl-C as cooperative cancellation.
async fn follow_task(
    client: Arc<ApiClient>,
    id: TaskId,
) -> Result<(), Box<dyn std::error::Error>> {
    let poller = Poller::new(client, PollConfig::default());
    let token = CancellationToken::new();

    tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        }
    });

    let render = tokio::spawn({
        let mut progress = poller.subscribe();
        async move {
            while progress.changed().await.is_ok() {
                let p = progress.borrow_and_update().clone();
                print!("\r  status: {:<16} elapsed: {:>5}s", p.status, p.elapsed_secs);
                let _ = std::io::stdout().flush();
            }
        }
    });

    println!("Waiting for task {} (this can take 10-20 minutes, Ctrl-C to stop)...", id);
    let outcome = poller.run(&id, &token).await;
    render.abort();
    println!();

    match outcome {
        Ok(PollOutcome::Delivered(snapshot)) => {
            print_snapshot(&snapshot);
            Ok(())
        }
        Ok(PollOutcome::Cancelled) => {
            println!("Cancelled. The task keeps running; `ncbench watch {}` resumes.", id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// The results viewer: one GET against the status endpoint, rendered as-is.
/// A stale or unknown id is reported as "not found", never as a crash.
async fn show_task(
    client: Arc<ApiClient>,
    store: &dyn TaskStore,
    id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = match id.map(TaskId::new).or_else(|| store.last_task_id()) {
        Some(id) => id,
        None => {
            println!("No task id given and none remembered; submit a task first.");
            return Ok(());
        }
    };

    match client.fetch_status(&id).await {
        Ok(snapshot) => {
            print_snapshot(&snapshot);
            if let Some(bench_id) = store.last_bench_id() {
                println!("  Last bench: {}", bench_id);
            }
            Ok(())
        }
        Err(ClientError::PollHttp { status, .. }) => {
            println!("Task {} not found (HTTP {}).", id, status);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn list_bench(path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::load(path)?;

    println!("Verified bench instances ({}):", catalog.pull_requests.len());
    println!("{:<40}  {:<24}  {}", "INSTANCE", "REPO", "TITLE");
    println!("{}", "-".repeat(80));

    for entry in &catalog.pull_requests {
        println!(
            "{:<40}  {:<24}  {}",
            entry.instance_id,
            entry.repo.as_deref().unwrap_or("-"),
            entry.title.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

fn print_snapshot(snapshot: &TaskSnapshot) {
    println!("  Task:    {}", snapshot.id);
    println!("  Status:  {}", snapshot.status);
    if let Some(details) = snapshot.error_details() {
        println!("  Details: {}", details);
    }
    match &snapshot.result {
        Some(result) => {
            println!("  Result:");
            let pretty =
                serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
            for line in pretty.lines() {
                println!("    {}", line);
            }
        }
        None => println!("  Result:  (none yet)"),
    }
}
