//! Container Bench - Main CLI Application
//!
//! Benchmarks a containerized HTTP service: startup latency, memory
//! footprint and load-test throughput, written out as a JSON report.

use clap::Parser;
use container_bench::{app::App, cli::Cli, error::AppError};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let use_colors = cli.use_colors();

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_colors));
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> container_bench::Result<()> {
    let app = App::new(cli)?;
    app.run().await
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Pass the image and instance name as positional arguments");
            eprintln!("  - Endpoint paths must start with '/'");
            eprintln!("  - Check that the --env-file path exists");
        }
        AppError::HealthCheck(_) => {
            eprintln!();
            eprintln!("Health check troubleshooting:");
            eprintln!("  - Inspect the container logs printed above");
            eprintln!("  - Increase --health-attempts for slow-starting services");
            eprintln!("  - Verify the service listens on the configured --port");
        }
        AppError::Runtime(_) => {
            eprintln!();
            eprintln!("Container runtime troubleshooting:");
            eprintln!("  - Check that the runtime binary is installed and on PATH");
            eprintln!("  - Verify the daemon is running and the image exists locally");
            eprintln!("  - Another container may already hold the instance name or port");
        }
        AppError::Network(_) | AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Verify the service port is published on the configured host");
            eprintln!("  - Increase --timeout for slow endpoints");
        }
        _ => {}
    }
}
