use clap::Parser;
use fhttp::logging::init_logging;
use fhttp::{Args, Config, ConsoleOutput, Termination};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = Config::from_args(args);

    let _log_guard = match init_logging(config.debug, config.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!("FHttp Client v{}", env!("CARGO_PKG_VERSION"));

    match fhttp::run(config, Arc::new(ConsoleOutput), interrupt()).await {
        Ok(Termination::Interrupted) => {
            println!("Client Shutdown Successfully!");
            ExitCode::SUCCESS
        }
        Ok(Termination::ReaderStopped(exit)) => {
            info!(?exit, "reader stopped");
            println!("Goodbye!");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed the run continues without it.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for interrupt signal");
        std::future::pending::<()>().await;
    }
}
