// src/backup.rs

//! The backup driver: walk every geography granularity of a dataset and
//! vintage, fetch the group table for each unit, and write one CSV per leaf
//! combination into the partitioned output tree.
//!
//! States are expanded explicitly over the static jurisdiction set rather
//! than wildcarded in one request, and counties are discovered per state with
//! a cheap single-column listing before the full-variable fetch is issued per
//! county. Each state is an independent unit run on a semaphore-bounded pool.

use anyhow::{bail, Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

use crate::fetch::CensusClient;
use crate::geography::{bind, GeoShape, GeographySpec, WILDCARD};
use crate::states::STATES_DC_AND_PR;
use crate::table::Table;

/// Everything one backup pass needs, threaded explicitly through every call.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub dataset: String,
    pub vintage: u32,
    pub group: String,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    /// Width of the per-state worker pool. 1 means fully sequential.
    pub jobs: usize,
}

/// Resolve and validate the output root before any download begins.
///
/// An existing non-directory path is a fatal configuration error. A missing
/// path is created up front, except under dry run where nothing is touched.
pub fn prepare_output_dir(output: Option<PathBuf>, dry_run: bool) -> Result<PathBuf> {
    let dir = match output {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving current directory")?,
    };

    if dir.exists() {
        if !dir.is_dir() {
            bail!(
                "output path {} exists but is not a directory",
                dir.display()
            );
        }
    } else if !dry_run {
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    Ok(dir)
}

/// Back up every geography granularity of the configured dataset and vintage.
pub async fn run_backup(client: &CensusClient, config: &BackupConfig) -> Result<()> {
    let specs = client.geographies(&config.dataset, config.vintage).await?;

    for spec in specs {
        info!(levels = ?spec.levels(), "geography");

        match spec.shape() {
            GeoShape::Flat => backup_flat(client, config, &spec).await?,
            GeoShape::StateOnly | GeoShape::StateCounty | GeoShape::StateCountyPlus => {
                backup_states(client, config, &spec).await?
            }
        }
    }

    Ok(())
}

/// Fan out one task per jurisdiction, bounded by the configured pool width.
/// Units write distinct files, so the semaphore only caps API load.
async fn backup_states(
    client: &CensusClient,
    config: &BackupConfig,
    spec: &GeographySpec,
) -> Result<()> {
    let semaphore = Arc::new(Semaphore::new(config.jobs.max(1)));
    let mut units = FuturesUnordered::new();

    for &state in STATES_DC_AND_PR {
        let client = client.clone();
        let config = config.clone();
        let spec = spec.clone();
        let semaphore = Arc::clone(&semaphore);

        units.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await?;
            match spec.shape() {
                GeoShape::StateCountyPlus => {
                    backup_state_counties(&client, &config, &spec, state).await
                }
                _ => backup_state(&client, &config, &spec, state).await,
            }
        }));
    }

    while let Some(unit) = units.next().await {
        unit.context("state backup task failed")??;
    }

    Ok(())
}

/// One fetch for a single state, county left wildcarded if present.
async fn backup_state(
    client: &CensusClient,
    config: &BackupConfig,
    spec: &GeographySpec,
    state: &str,
) -> Result<()> {
    let mut bindings = spec.wildcard_bindings();
    bind(&mut bindings, "state", state);

    let table = fetch_group(client, config, &bindings).await?;
    let dir = spec.partition_dir(&config.output_dir, Some(state), None);
    write_table(&table, &dir, &spec.file_name(), config.dry_run)
}

/// Discover the counties of one state, then fetch the full table per county.
async fn backup_state_counties(
    client: &CensusClient,
    config: &BackupConfig,
    spec: &GeographySpec,
    state: &str,
) -> Result<()> {
    let listing = client
        .download_columns(
            &config.dataset,
            config.vintage,
            &["NAME"],
            &county_listing_bindings(state),
        )
        .await
        .with_context(|| format!("listing counties for state {state}"))?;
    let counties = listing
        .column("county")
        .with_context(|| format!("county column missing from county listing for state {state}"))?;
    info!(state, counties = counties.len(), "expanding counties");

    let mut bindings = spec.wildcard_bindings();
    bind(&mut bindings, "state", state);

    for county in &counties {
        bind(&mut bindings, "county", county);

        let table = fetch_group(client, config, &bindings).await?;
        let dir = spec.partition_dir(&config.output_dir, Some(state), Some(county));
        write_table(&table, &dir, &spec.file_name(), config.dry_run)?;
    }

    Ok(())
}

/// Single all-wildcard fetch for a geography with no state expansion.
async fn backup_flat(
    client: &CensusClient,
    config: &BackupConfig,
    spec: &GeographySpec,
) -> Result<()> {
    let bindings = spec.wildcard_bindings();
    let table = fetch_group(client, config, &bindings).await?;
    let dir = spec.partition_dir(&config.output_dir, None, None);
    write_table(&table, &dir, &spec.file_name(), config.dry_run)
}

fn county_listing_bindings(state: &str) -> Vec<(String, String)> {
    vec![
        ("state".to_string(), state.to_string()),
        ("county".to_string(), WILDCARD.to_string()),
    ]
}

/// Full-group fetch for the current bindings. Skipped under dry run: planning
/// the outputs only needs the geography and county listings.
async fn fetch_group(
    client: &CensusClient,
    config: &BackupConfig,
    bindings: &[(String, String)],
) -> Result<Table> {
    if config.dry_run {
        return Ok(Table::empty());
    }
    client
        .download_group(&config.dataset, config.vintage, &config.group, bindings)
        .await
}

/// Output sink: ensure the directory exists, then write `{dir}/{file_name}`,
/// overwriting any previous run. Under dry run, log intent and touch nothing.
pub fn write_table(table: &Table, dir: &Path, file_name: &str, dry_run: bool) -> Result<()> {
    let file = dir.join(file_name);

    if dry_run {
        info!(file = %file.display(), "dry run: not writing output");
        return Ok(());
    }

    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    info!(file = %file.display(), rows = table.len(), "writing output");
    table.write_csv(&file)
}
