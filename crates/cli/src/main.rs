mod progress;
mod settings;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use orchestrator::{BrowserAgentClient, QuoteExecutor};
use quote_core::Vehicle;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use progress::BarObserver;
use settings::{Settings, AGENT_DIR, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "quote-agent")]
#[command(about = "Generate insurance quotes with a browser agent", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to .quote-agent/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,
    /// Run one quote
    Quote(QuoteArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
struct QuoteArgs {
    #[arg(long)]
    brand: String,

    #[arg(long)]
    model: String,

    #[arg(long)]
    year: String,

    #[arg(long)]
    zip_code: Option<String>,

    #[arg(long)]
    engine: Option<String>,

    #[arg(long)]
    doors: Option<String>,

    /// Browser agent service URL
    #[arg(long)]
    agent_url: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl QuoteArgs {
    fn vehicle(&self) -> Vehicle {
        let mut vehicle = Vehicle::new(
            self.brand.trim().to_uppercase(),
            self.model.trim().to_uppercase(),
            self.year.trim(),
        );
        vehicle.zip_code = self.zip_code.clone();
        vehicle.engine = self.engine.clone();
        vehicle.doors = self.doors.clone();
        vehicle
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => Settings::config_path(&std::env::current_dir()?),
    };

    match cli.command {
        Commands::Init => init_config(&config_path).await,
        Commands::Quote(args) => {
            init_tracing();
            let success = quote(&config_path, args).await?;
            if !success {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config => show_config(&config_path).await,
    }
}

async fn effective_settings(config_path: &Path) -> Result<Settings> {
    let settings = Settings::load(config_path).await?;
    Ok(settings.apply_overrides(|key| std::env::var(key).ok()))
}

async fn init_config(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    Settings::default().save(config_path).await?;

    println!();
    println!("Created {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set QUALITAS_AGENT_KEY, QUALITAS_ACCOUNT and QUALITAS_PASSWORD");
    println!("     or fill in [executor.portal] in {}/{}", AGENT_DIR, CONFIG_FILE);
    println!("  2. Start the browser agent service");
    println!("  3. Run 'quote-agent quote --brand AUDI --model \"Q3 S LINE\" --year 2020'");

    Ok(())
}

async fn quote(config_path: &Path, args: QuoteArgs) -> Result<bool> {
    let mut settings = effective_settings(config_path).await?;
    if let Some(url) = &args.agent_url {
        settings.agent.url = url.clone();
    }

    let vehicle = args.vehicle();
    tracing::info!(agent_url = %settings.agent.url, "Browser agent");

    let client = Arc::new(BrowserAgentClient::new(settings.agent.url.as_str()));
    let executor = QuoteExecutor::new(client.clone(), client, settings.executor);

    if !args.json {
        println!();
        println!("Quote for {}", vehicle.search_query().bold());
        println!("════════════════════════════════════════");
    }

    let observer = BarObserver::new();
    let result = executor.run(&vehicle, Some(&observer)).await;
    observer.finish();

    if args.json {
        let output = serde_json::to_string_pretty(&result).context("Failed to encode result")?;
        println!("{}", output);
    } else if result.is_success() {
        println!("{} {}", "✓".green().bold(), result.message.green());
    } else {
        println!("{} {}", "✗".red().bold(), result.message.red());
    }

    Ok(result.is_success())
}

async fn show_config(config_path: &Path) -> Result<()> {
    let settings = effective_settings(config_path).await?;
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "defaults".to_string()
    };

    println!("# Effective configuration ({} + environment)", source);
    println!(
        "{}",
        toml::to_string_pretty(&settings.masked()).context("Failed to serialize config")?
    );
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_agent=info,orchestrator=info".into()),
        )
        .init();
}
