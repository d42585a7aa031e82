use clap::Parser;
use drive_upload::cli::{run, Cli};
use drive_upload::logging::{init_tracing, report_fatal};
use drive_upload_core::reconcile::Outcome;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    init_tracing();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(report) => {
            let action = match report.outcome {
                Outcome::Created => "Created".to_string(),
                Outcome::Updated { count } => format!("Updated {count} file(s) named"),
            };
            println!("{action} '{}' (id {})", report.name, report.object_id);
            if let Some(expansion) = &report.expansion {
                println!(
                    "Expanded {} archive entries into {}",
                    expansion.entries.len(),
                    expansion.destination
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let message = format!("{e:#}");
            tracing::debug!(error = %message, "CLI exited with error");
            report_fatal(&message);
            ExitCode::FAILURE
        }
    }
}
