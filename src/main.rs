mod catalog;
mod cli;
mod config;
mod error;
mod hub;
mod nodes;
mod provision;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use hub::{Fetcher, HubTransport};
use provision::RunReport;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let catalog = catalog::Catalog::load(&config)?;

    match cli.command {
        Commands::Provision { with_nodes } => {
            if with_nodes {
                let installed = nodes::install(&config.nodes_dir)?;
                println!("✓ Custom nodes ready ({} newly installed)", installed);
            }

            let transport = HubTransport::new(config.hf_token.clone())?;
            let fetcher = Fetcher::new(transport, config.models_dir.clone());
            let report = provision::provision(&catalog, &config, &fetcher);
            print_report(&report);
        }

        Commands::Plan { json } => {
            let plan = provision::plan(&catalog, &config);
            if json {
                println!("{}", serde_json::to_string_pretty(&plan).unwrap());
            } else if plan.is_empty() {
                println!("Nothing to fetch.");
                println!("Enable groups with DOWNLOAD_<NAME>=true or DOWNLOAD_ALL=true.");
            } else {
                for entry in &plan {
                    match (&entry.dest, &entry.error) {
                        (Some(dest), _) => {
                            println!("  [{}] {}", entry.group, dest.display())
                        }
                        (None, Some(error)) => {
                            println!("  [{}] ✗ {} ({})", entry.group, entry.entry, error)
                        }
                        (None, None) => {}
                    }
                }
            }
        }

        Commands::List => {
            let resolution = catalog.resolve(&config);
            println!("Model groups:\n");
            for group in catalog.groups() {
                let enabled = resolution.enabled.iter().any(|g| g.name == group.name);
                println!(
                    "  {:<12} {:<9} {} artifacts",
                    group.name,
                    if enabled { "enabled" } else { "disabled" },
                    group.entries.len()
                );
            }
            for name in &resolution.unknown {
                println!("  ! flag set for unknown group: {}", name);
            }
        }

        Commands::Nodes => {
            let installed = nodes::install(&config.nodes_dir)?;
            println!("✓ Custom nodes ready ({} newly installed)", installed);
        }
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("\nProvisioning summary:");
    println!("  present:    {}", report.present());
    println!("  downloaded: {}", report.downloaded());
    println!("  failed:     {}", report.failed());
    println!("  skipped:    {}", report.skipped());
    if report.unstaged() > 0 {
        println!("  unstaged:   {}", report.unstaged());
    }
    for (entry, status) in report.problems() {
        println!("  ✗ {} ({})", entry, status);
    }
}
