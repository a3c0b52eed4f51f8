use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ranksnap::cli::{commands, Cli, Commands};
use ranksnap::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Scrape {
            category,
            out_dir,
            url_template,
            max_pages,
            date,
            headed,
        } => {
            commands::scrape(
                &config,
                commands::ScrapeArgs {
                    category,
                    out_dir,
                    url_template,
                    max_pages,
                    date,
                    headed,
                },
            )
            .await?;
        }
        Commands::Clean {
            input,
            category,
            date,
            output,
        } => {
            commands::clean(&input, &category, date, output)?;
        }
    }

    Ok(())
}
