use clap::{Parser, Subcommand, ValueEnum};
use demoswork::prelude::*;
use serde_json::json;
use std::time::Instant;

/// Inspect, validate and dry-run DemosWork scripts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a script for structural errors
    Validate {
        /// Path to the script JSON file
        script_path: String,
    },

    /// Print a script as a tree
    Inspect {
        /// Path to the script JSON file
        script_path: String,
    },

    /// Execute a script against recorded step outputs
    Run {
        /// Path to the script JSON file
        script_path: String,

        /// JSON object mapping step UIDs to their outputs
        #[arg(short, long)]
        outputs: Option<String>,

        /// Which matching conditions of an operation run their work
        #[arg(short, long, value_enum, default_value_t = PolicyCli::All)]
        policy: PolicyCli,

        /// Limit on nested operations and condition references
        #[arg(long, default_value_t = demoswork::executor::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Print the transaction data array embedding the script
    Payload {
        /// Path to the script JSON file
        script_path: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyCli {
    All,
    FirstMatch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { script_path } => {
            let work = load(&script_path);
            match work.validate() {
                Ok(()) => println!("Script '{}' is valid.", script_path),
                Err(e) => exit_with_error(&e.to_string()),
            }
        }
        Commands::Inspect { script_path } => {
            let work = load(&script_path);
            print!("{}", work.display());
        }
        Commands::Run {
            script_path,
            outputs,
            policy,
            max_depth,
        } => run(script_path, outputs, policy, max_depth).await,
        Commands::Payload { script_path } => {
            let work = load(&script_path);
            let payload = prepare_demoswork_payload(&work)
                .unwrap_or_else(|e| exit_with_error(&e.to_string()));
            let rendered = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to render payload: {}", e)));
            println!("{}", rendered);
        }
    }
}

async fn run(script_path: String, outputs: Option<String>, policy: PolicyCli, max_depth: usize) {
    let total_start = Instant::now();
    let mut work = load(&script_path);

    let runner = match &outputs {
        Some(path) => ReplayRunner::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load step outputs from '{}': {}", path, e))
        }),
        None => {
            println!("No outputs file provided. Every step will report success.");
            ReplayRunner::new()
        }
    }
    .with_fallback(json!({ "output": { "result": "success" } }));

    let policy = match policy {
        PolicyCli::All => MatchPolicy::All,
        PolicyCli::FirstMatch => MatchPolicy::FirstMatch,
    };
    let executor = Executor::builder()
        .with_default_runner(runner)
        .with_policy(policy)
        .with_max_depth(max_depth)
        .build();

    let exec_start = Instant::now();
    if let Err(e) = work.execute(&executor).await {
        exit_with_error(&format!("Execution failed: {}", e));
    }
    let exec_duration = exec_start.elapsed();

    println!("\n--- Condition Trace ---");
    if work.trace().is_empty() {
        println!("(no conditions evaluated)");
    } else {
        println!("{}", TraceFormatter::format_execution(work.trace()));
    }

    println!("\n--- Results ---");
    let mut results: Vec<_> = work.results().iter().collect();
    results.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (uid, value) in results {
        println!("{}: {}", uid, value);
    }

    println!("\n--- Performance Summary ---");
    println!("Execution:            {:?}", exec_duration);
    println!("Total:                {:?}", total_start.elapsed());
}

fn load(script_path: &str) -> DemosWork {
    DemosWork::from_file(script_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to load script '{}': {}", script_path, e))
    })
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
