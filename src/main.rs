//! Memory Central migration CLI.

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use memcentral_migrate::report::Reporter;
use memcentral_migrate::source::RedisSource;
use memcentral_migrate::{doctor, prompt, MemoryApiClient, MigrationConfig, Pipeline};

#[derive(Parser)]
#[command(name = "memcentral-migrate")]
#[command(version)]
#[command(about = "Migrate agent memories from a local Redis store to a centralized Memory Server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source Redis URL
    #[arg(long, env = "MEMCENTRAL_SOURCE", default_value = "redis://localhost:16379")]
    source: String,

    /// Target Memory Server base URL
    #[arg(long, env = "MEMCENTRAL_TARGET", default_value = "http://localhost:8000")]
    target: String,

    /// Show what would be migrated without actually migrating
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Keys requested per SCAN page
    #[arg(long, default_value_t = 100)]
    page_size: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Test connectivity to the Memory Server
    Check {
        /// Target Memory Server base URL
        #[arg(long, env = "MEMCENTRAL_TARGET", default_value = "http://localhost:8000")]
        target: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Check { target }) => run_check(&target).await,
        None => {
            run_migration(
                &cli.source,
                &cli.target,
                cli.dry_run,
                cli.yes,
                cli.page_size,
            )
            .await
        }
    }
}

async fn run_migration(
    source: &str,
    target: &str,
    dry_run: bool,
    assume_yes: bool,
    page_size: usize,
) -> anyhow::Result<()> {
    let mut config = MigrationConfig {
        source_url: source.to_string(),
        target_url: target.to_string(),
        options: Default::default(),
    };
    config.options.dry_run = dry_run;
    config.options.assume_yes = assume_yes;
    config.options.page_size = page_size;
    config.validate()?;

    if !prompt::should_proceed(dry_run, assume_yes, prompt::confirm_on_terminal)? {
        eprintln!("Migration cancelled.");
        std::process::exit(1);
    }

    info!("Connecting to source {}", config.source_url);
    let mut store = RedisSource::connect(&config.source_url).await?;
    let client = MemoryApiClient::new(&config.target_url);

    let pipeline = Pipeline::new(config);

    // Ctrl-C stops dispatching new records; the in-flight write finishes
    // and partial statistics are reported.
    let cancel = pipeline.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });

    let stats = pipeline.run(&mut store, &client).await?;

    // Per-record errors are a warning, not a process failure.
    Reporter::new().print_summary(&stats);

    Ok(())
}

async fn run_check(target: &str) -> anyhow::Result<()> {
    memcentral_migrate::config::validate_target_url(target)?;

    info!("Testing connection to {}", target);
    let client = MemoryApiClient::for_diagnostics(target);
    let outcomes = doctor::run_checks(&client).await;

    Reporter::new().print_checks(&outcomes);

    Ok(())
}
