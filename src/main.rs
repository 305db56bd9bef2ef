use anyhow::Result;
use census_backup::backup::{self, BackupConfig};
use census_backup::cli::Cli;
use census_backup::fetch::CensusClient;
use census_backup::key;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,census_backup=info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) parse and validate config ────────────────────────────────
    let cli = Cli::parse();
    let output_dir = backup::prepare_output_dir(cli.output, cli.dry_run)?;
    let api_key = key::resolve_api_key(cli.api_key);

    info!(
        dataset = %cli.dataset,
        vintage = cli.vintage,
        group = %cli.group,
        output = %output_dir.display(),
        dry_run = cli.dry_run,
        "backing up"
    );

    // ─── 3) run the backup ───────────────────────────────────────────
    let config = BackupConfig {
        dataset: cli.dataset,
        vintage: cli.vintage,
        group: cli.group,
        output_dir,
        dry_run: cli.dry_run,
        jobs: cli.jobs,
    };
    let client = CensusClient::new(api_key);
    backup::run_backup(&client, &config).await?;

    info!("all done");
    Ok(())
}
