//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A portfolio site rendered from a headless content store", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the site server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Render the site into static files
    #[command(alias = "g")]
    Generate,

    /// Remove the public folder
    Clean,

    /// List content from the store
    List {
        /// Type of content (projects, posts, experience, testimonials, timeline, interactions)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let folio = folio::Folio::load(&base_dir)?;
            if !folio.config.cms.is_configured() {
                tracing::warn!("No content store configured; sections will render empty");
            }
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio.serve(&ip, port).await?;
        }

        Commands::Generate => {
            let folio = folio::Folio::load(&base_dir)?;
            tracing::info!("Generating static files...");
            folio.generate().await?;
            println!("Generated successfully!");
        }

        Commands::Clean => {
            let folio = folio::Folio::load(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            folio.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let folio = folio::Folio::load(&base_dir)?;
            folio::commands::list::run(&folio, &r#type).await?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
