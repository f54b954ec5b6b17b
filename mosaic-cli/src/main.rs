use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

use mosaic_cli::{commands, logging, Cli, CliError, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_format, &cli.log_level) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            trigger.cancel();
        }
    });

    match run(cli.command, &cancel).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, cancel: &CancellationToken) -> Result<ExitCode, CliError> {
    match command {
        Commands::Check(args) => {
            let report = commands::check(&args).await?;
            println!("{}", report);
            Ok(if report.is_available() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }
        Commands::Conformance { file } => {
            let report = commands::conformance(&file).await?;
            println!("{}", report);
            report.into_result()?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Assemble(args) => {
            let report = commands::assemble(&args, cancel).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
