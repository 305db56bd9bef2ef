// src/fetch.rs

//! Client for the Census Bureau data API.
//!
//! Two endpoints matter here: `{base}/{vintage}/{dataset}/geography.json`,
//! which enumerates the geography granularities a dataset supports, and
//! `{base}/{vintage}/{dataset}` itself, which serves tables as JSON rows.
//! Geography bindings are encoded with the leaf level in the `for` parameter
//! and every ancestor level in an `in` parameter.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::geography::GeographySpec;
use crate::table::Table;

pub const API_BASE_URL: &str = "https://api.census.gov/data";

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct CensusClient {
    http: Client,
    base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeographyDoc {
    #[serde(default)]
    fips: Vec<FipsEntry>,
}

#[derive(Debug, Deserialize)]
struct FipsEntry {
    name: String,
    #[serde(default)]
    requires: Vec<String>,
}

impl CensusClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base(API_BASE_URL, api_key)
    }

    pub fn with_base(base: impl Into<String>, api_key: Option<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base,
            api_key,
        }
    }

    /// Enumerate the geography specs supported by `dataset` at `vintage`,
    /// each an ordered list of level names ending in the leaf.
    pub async fn geographies(&self, dataset: &str, vintage: u32) -> Result<Vec<GeographySpec>> {
        let url = Url::parse(&format!(
            "{}/{}/{}/geography.json",
            self.base, vintage, dataset
        ))
        .with_context(|| format!("building geography URL for {dataset} {vintage}"))?;

        let doc: GeographyDoc = serde_json::from_value(self.get_json_with_retry(&url).await?)
            .with_context(|| format!("decoding geography listing from {url}"))?;
        specs_from_doc(doc)
    }

    /// Fetch the full table for a named variable group under `bindings`.
    pub async fn download_group(
        &self,
        dataset: &str,
        vintage: u32,
        group: &str,
        bindings: &[(String, String)],
    ) -> Result<Table> {
        self.download(dataset, vintage, &format!("group({group})"), bindings)
            .await
    }

    /// Fetch an explicit column list under `bindings`. Used for the cheap
    /// county discovery pass before per-county group fetches.
    pub async fn download_columns(
        &self,
        dataset: &str,
        vintage: u32,
        columns: &[&str],
        bindings: &[(String, String)],
    ) -> Result<Table> {
        self.download(dataset, vintage, &columns.join(","), bindings)
            .await
    }

    async fn download(
        &self,
        dataset: &str,
        vintage: u32,
        get: &str,
        bindings: &[(String, String)],
    ) -> Result<Table> {
        let url = self.data_url(dataset, vintage, get, bindings)?;
        let rows = self.get_json_with_retry(&url).await?;
        Table::from_json_rows(rows).with_context(|| format!("decoding table from {url}"))
    }

    fn data_url(
        &self,
        dataset: &str,
        vintage: u32,
        get: &str,
        bindings: &[(String, String)],
    ) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}/{}", self.base, vintage, dataset))
            .with_context(|| format!("building data URL for {dataset} {vintage}"))?;

        let (leaf, ancestors) = bindings
            .split_last()
            .context("geography bindings are empty")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("get", get);
            for (level, selector) in ancestors {
                query.append_pair("in", &format!("{level}:{selector}"));
            }
            query.append_pair("for", &format!("{}:{}", leaf.0, leaf.1));
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
        }
        Ok(url)
    }

    async fn get_json_core(&self, url: &Url) -> Result<Value> {
        debug!(%url, "fetching");
        Ok(self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("non-success status from {url}"))?
            .json()
            .await
            .with_context(|| format!("reading JSON from {url}"))?)
    }

    async fn get_json_with_retry(&self, url: &Url) -> Result<Value> {
        let mut attempts = 0;
        loop {
            match self.get_json_core(url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempts - 1);
                    warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "retrying");
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn specs_from_doc(doc: GeographyDoc) -> Result<Vec<GeographySpec>> {
    doc.fips
        .into_iter()
        .map(|entry| {
            let mut levels = entry.requires;
            levels.push(entry.name);
            GeographySpec::new(levels)
        })
        .collect()
}
