use clap::{Parser, Subcommand};
use flowboard::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line access to the workflow backend and the graph layout
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Session token to send with backend requests
    #[arg(short, long, env = "FLOWBOARD_TOKEN", global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the visual graph of a workflow JSON file
    Layout {
        /// Path to the workflow JSON file
        path: String,
        /// Read the file as a backend workflow record
        #[arg(long)]
        record: bool,
    },
    /// List the available services
    Services,
    /// List the user's workflows
    Workflows,
    /// Print the execution logs of a workflow
    Logs { workflow_id: u64 },
    /// Print dashboard statistics
    Stats,
    /// Run every step of a saved workflow, one at a time
    Test { workflow_id: u64 },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to start runtime: {}", e)));

    if let Err(e) = runtime.block_on(run(cli)) {
        exit_with_error(&e.to_string());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::from_env()?;

    if let Command::Layout { path, record } = &cli.command {
        return print_layout(path, *record, &config);
    }

    let session = match cli.token {
        Some(token) => SessionStore::from_cookie(token),
        None => SessionStore::new(),
    };
    let client = ApiClient::new(&config, session)?;

    match cli.command {
        Command::Layout { .. } => {}
        Command::Services => {
            for service in client.list_services().await? {
                println!("{:>8}  {}", service.identifier, service.name);
            }
        }
        Command::Workflows => {
            for workflow in client.list_workflows().await? {
                let state = if workflow.is_deployed() {
                    "deployed"
                } else {
                    "draft"
                };
                println!(
                    "{:>6}  {:<9} {:>2} steps  {}",
                    workflow.id,
                    state,
                    workflow.steps.len(),
                    workflow.name
                );
            }
        }
        Command::Logs { workflow_id } => {
            let logs = client.workflow_logs(workflow_id).await?;
            println!("--- {} ({}) ---", logs.name, logs.workflow_id);
            for entry in logs.logs {
                println!(
                    "{}  {:<8} {:<7} {} / {}{}",
                    entry.executed_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.kind,
                    entry.status,
                    entry.service_name,
                    entry.action_name,
                    entry
                        .exception
                        .map(|e| format!("  ({})", e))
                        .unwrap_or_default()
                );
            }
        }
        Command::Stats => {
            let stats = client.statistics().await?;
            println!("--- Workflows by status ---");
            for (status, count) in &stats.counts_by_status {
                println!("{:<12} {}", status, count);
            }
            println!("\n--- Runs per month ---");
            for month in &stats.monthly {
                println!("{:<12} {}", month.month, month.count);
            }
            println!("\n--- Most used services ---");
            for usage in &stats.used_services {
                println!("{:<12} {}", usage.name, usage.count);
            }
            println!("\nRecent errors: {}", stats.last_errors.len());
        }
        Command::Test { workflow_id } => {
            let record = client.get_workflow(workflow_id).await?;
            let mut editor = WorkflowEditor::new(record.into_workflow()?, config.layout);
            let ids: Vec<StepId> = editor.steps().iter().map(|s| s.id.clone()).collect();

            let start = Instant::now();
            for id in &ids {
                match editor.run_step_test(&client, id).await {
                    Ok(status) => println!("step {:>6}  {}", id, status),
                    Err(e) => println!("step {:>6}  skipped: {}", id, e),
                }
            }
            println!("\nTested {} step(s) in {:?}", ids.len(), start.elapsed());
        }
    }

    Ok(())
}

fn print_layout(path: &str, record: bool, config: &ClientConfig) -> Result<()> {
    let json = fs::read_to_string(path)?;
    let workflow = if record {
        serde_json::from_str::<WorkflowRecord>(&json)
            .map_err(ApiError::from)?
            .into_workflow()?
    } else {
        serde_json::from_str::<Workflow>(&json)
            .map_err(ApiError::from)?
            .into_workflow()?
    };

    let graph = derive_visual_graph(&workflow.steps, &config.layout);
    let output = serde_json::to_string_pretty(&graph).map_err(ApiError::from)?;
    println!("{}", output);
    Ok(())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
