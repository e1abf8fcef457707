//! arkchat - clinical-reasoning chat relay for the KIN508 course
//!
//! Serves a landing page and a `/chat` endpoint that forwards the caller's
//! conversation to OpenAI behind the ARK system prompt.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arkchat::config::{Config, KeySource};

#[derive(Parser)]
#[command(name = "arkchat")]
#[command(about = "Clinical-reasoning chat relay for the KIN508 course")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults are used if it does not exist)
        #[arg(short, long, default_value = "arkchat.toml")]
        config: String,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration and show the resolved settings
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "arkchat.toml")]
        config: String,
    },
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("arkchat={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn log_key_source(source: &KeySource) {
    if source.is_configured() {
        tracing::info!(key_source = %source, "Upstream credential configured");
    } else {
        tracing::warn!(key_source = %source, "Upstream credential not configured");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            let (loaded, key_source) = Config::load(&config)?;
            init_tracing(&loaded.logging.level);

            tracing::info!(config = %config, "Loaded configuration");
            if let Some(addr) = &listen {
                tracing::info!(listen = %addr, "Override listen address");
            }
            log_key_source(&key_source);

            arkchat::proxy::run_server(loaded, listen).await
        }

        Commands::Check { config } => {
            let (loaded, key_source) = Config::load(&config)?;
            init_tracing(&loaded.logging.level);
            log_key_source(&key_source);

            println!("Configuration OK ({})", config);
            println!("  listen:     {}", loaded.server.listen);
            println!("  base_url:   {}", loaded.provider.base_url);
            println!("  credential: {}", key_source);
            match loaded.provider.timeout_secs {
                Some(secs) => println!("  timeout:    {}s", secs),
                None => println!("  timeout:    none"),
            }
            println!("  static_dir: {}", loaded.web.static_dir);
            Ok(())
        }
    }
}
