mod cli;
mod config;
mod error;
mod handlers;
mod models;
mod services;
mod webhook; // Results HTTP endpoint

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;

use cli::{Cli, Commands};
use config::Config;
use services::Summarizer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = Config::from_env();
    let summarizer = Summarizer::new(config.timezone);
    log::debug!("🕐 Report timezone: {:?}", config.timezone);

    match cli.command {
        Commands::Results { input, copy } => {
            let raw = cli::read_input(input.as_deref())?;
            let (out, failed) = cli::run_results(&raw, &summarizer, copy);
            print!("{}", out);

            if failed {
                std::process::exit(1);
            }
        }
        Commands::Report { input, output, strict } => {
            let raw = cli::read_input(input.as_deref())?;
            let report = cli::build_report(&raw, &summarizer, strict).map_err(|e| {
                log::error!("❌ {}", e.user_message());
                e
            })?;

            match output {
                Some(path) => cli::write_report(&path, &report)?,
                None => print!("{}", report),
            }
        }
        #[cfg(feature = "results-server")]
        Commands::Serve { addr } => {
            use webhook::server::create_results_router;

            let addr = addr.unwrap_or_else(|| config.results_addr.clone());
            let app = create_results_router(summarizer, config.results_secret.clone());

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            log::info!("🌐 Results server listening on {}", addr);
            if config.results_secret.is_none() {
                log::warn!("⚠️ RESULTS_SECRET not set, accepting unsigned result posts");
            }

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    log::info!("🛑 Shutting down...");
                })
                .await?;
        }
    }

    Ok(())
}
