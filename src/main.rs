use clap::{Parser, Subcommand};
use colored::Colorize;

use portal_probe::config::{Config, DEFAULT_BASE_URL};
use portal_probe::{runner, suites};

#[derive(Parser)]
#[command(name = "portal-probe")]
#[command(version = "0.1.0")]
#[command(about = "Black-box API test harness for the Institute Service Portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run test suite(s) against the portal backend
    Run {
        /// Suites to run (backend, edge, profile, features). All when empty.
        suites: Vec<String>,

        /// Base URL of the portal API (falls back to PORTAL_BASE_URL)
        #[arg(short, long)]
        base_url: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Print the full result log as JSON after the run
        #[arg(long, default_value = "false")]
        show_results: bool,
    },

    /// List available suites and their cases
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            suites,
            base_url,
            timeout,
            show_results,
        } => {
            let base_url = base_url
                .or_else(|| std::env::var("PORTAL_BASE_URL").ok())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

            println!("{} Probing portal backend", "▶".green().bold());
            println!("  Base URL: {}", base_url.cyan());
            if !suites.is_empty() {
                println!("  Suites: {}", suites.join(", ").cyan());
            }
            if show_results {
                println!("  Result log: {}", "Enabled".green());
            }

            let config = Config {
                base_url,
                timeout_secs: timeout,
                show_results,
            };

            let summary = runner::run_suites(&config, &suites).await?;
            if summary.failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::List => {
            for suite in suites::all() {
                println!(
                    "{} {} ({} cases)",
                    suite.name.white().bold(),
                    suite.title.dimmed(),
                    suite.cases.len()
                );
                for case in &suite.cases {
                    println!("    {}", case.name);
                }
            }
        }
    }

    Ok(())
}
