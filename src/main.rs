// ABOUTME: Demo CLI harness around the task executor
// ABOUTME: Registers the built-in tasks, runs one task from argv, prints the result as JSON

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use helmsman::{
    ExecuteOptions, ExecutorConfig, TaskExecutor, TaskPriority, TaskRegistry, TaskStatus,
};

#[derive(Parser)]
#[command(name = "helmsman", version, about = "Run a single task through the execution engine")]
struct Args {
    /// Task type to execute (echo, wait, command)
    task_type: String,

    /// JSON input payload
    #[arg(default_value = "{}")]
    params: String,

    /// Priority label (low, normal, high, critical)
    #[arg(long, default_value = "normal")]
    priority: String,

    /// Timeout for the whole execution, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Number of retries after the first failed attempt
    #[arg(long)]
    retries: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    info!("Starting helmsman v{}", helmsman::VERSION);

    let params: serde_json::Value =
        serde_json::from_str(&args.params).context("params must be valid JSON")?;

    let executor =
        TaskExecutor::with_registry(ExecutorConfig::default(), TaskRegistry::with_builtins());

    let options = ExecuteOptions {
        priority: Some(TaskPriority::from_label(&args.priority)),
        timeout: args.timeout_ms.map(Duration::from_millis),
        retries: args.retries,
    };

    let result = executor.execute_task(&args.task_type, params, options).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.status != TaskStatus::Completed {
        std::process::exit(1);
    }
    Ok(())
}
