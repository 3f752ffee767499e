//! loop-market CLI binary

use anyhow::Context;
use clap::Parser;
use loop_market::cli::{run_demo, Cli, Commands, MarketApp, OutputFormat};
use loop_market::config::Settings;
use loop_market::types::{Participant, ProductListing};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    // Initialize logging (stderr, so JSON output on stdout stays clean)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat {
            buyer,
            buyer_name,
            seller,
            seller_name,
            product,
            title,
            price,
            acting,
            seed,
            json,
        } => {
            let app = MarketApp::new(
                settings,
                Participant::new(buyer, buyer_name),
                Participant::new(seller, seller_name),
                ProductListing::new(product, title, price),
                acting,
            )
            .await
            .context("failed to open thread")?;

            if seed {
                app.seed_sample_conversation().await?;
            }

            tracing::info!("Chat open on thread {}", app.thread_id());

            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            };
            app.run(tokio::io::stdin(), tokio::io::stdout(), format).await?;
        }

        Commands::Demo => {
            run_demo(&settings)?;
        }
    }

    Ok(())
}
