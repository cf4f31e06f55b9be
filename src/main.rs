//! HTTP Rate Bench - Main CLI Application
//!
//! Fires GET requests at a fixed rate against one or more endpoints and
//! reports latency, achieved rate and the most frequent errors.

use clap::Parser;
use http_rate_bench::{
    app,
    cli::Cli,
    config::EnvManager,
    error::{AppError, ErrorReporter},
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue along with the command line used.");
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = app::run(cli).await {
        reporter.report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Pass at least one --url or set BENCH_URLS");
            eprintln!("  - QPS, timeout and duration must be positive numbers");
            eprintln!("  - Check the BENCH_* entries of your .env file");

            let mut issues = EnvManager::validate_current_env();
            if let Ok(Some(file_issues)) = EnvManager::check_env_file() {
                issues.extend(file_issues.into_iter().map(|issue| format!(".env {}", issue)));
            }
            for issue in issues {
                eprintln!("  - {}", issue);
            }
        }
        AppError::Network(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check that the target is running and reachable");
            eprintln!("  - Verify the host name and port of the URL");
            eprintln!("  - Use --no-preflight to benchmark anyway");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("File output help:");
            eprintln!("  - Check that the directory of the --csv path exists and is writable");
        }
        AppError::Internal(_) => {}
    }
}
