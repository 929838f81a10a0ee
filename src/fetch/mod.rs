// src/fetch/mod.rs

use chrono::NaiveDate;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::{fs, io::Write, path::PathBuf};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::{Config, FetchConfig};
use crate::error::{PrepError, Result};
use crate::utils::write_atomic;

/// Where a download landed.
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub snapshot: PathBuf,
    pub canonical: PathBuf,
    pub bytes: u64,
}

/// One failed attempt, tagged with whether another attempt could help.
struct AttemptError {
    retryable: bool,
    message: String,
}

impl AttemptError {
    fn retryable(message: impl ToString) -> Self {
        Self {
            retryable: true,
            message: message.to_string(),
        }
    }

    fn fatal(message: impl ToString) -> Self {
        Self {
            retryable: false,
            message: message.to_string(),
        }
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(e: reqwest::Error) -> Self {
        // connect/timeout/body errors are transient; builder or redirect errors are not
        if e.is_builder() || e.is_redirect() {
            AttemptError::fatal(e)
        } else {
            AttemptError::retryable(e)
        }
    }
}

pub fn build_client(cfg: &FetchConfig) -> Result<Client> {
    Client::builder()
        .timeout(cfg.timeout())
        .gzip(true)
        .build()
        .map_err(|e| PrepError::fetch("<client>", e))
}

async fn fetch_once(client: &Client, url: &Url) -> std::result::Result<Vec<u8>, AttemptError> {
    let resp = client.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let msg = format!("HTTP status {}", status);
        return Err(if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            AttemptError::retryable(msg)
        } else {
            AttemptError::fatal(msg)
        });
    }

    let mut body = Vec::with_capacity(resp.content_length().unwrap_or(0) as usize);
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        body.extend_from_slice(&chunk);
    }
    debug!(%url, bytes = body.len(), "body received");
    Ok(body)
}

/// GET `url`, retrying transient failures with exponential backoff.
#[instrument(level = "info", skip(client, cfg), fields(url = %url))]
pub async fn fetch_csv(client: &Client, url: &Url, cfg: &FetchConfig) -> Result<Vec<u8>> {
    let mut attempts = 0;
    loop {
        match fetch_once(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) if e.retryable && attempts < cfg.max_retries => {
                attempts += 1;
                let delay = cfg.backoff(attempts);
                warn!(attempt = attempts, delay_ms = delay.as_millis() as u64, error = %e.message, "Retrying");
                sleep(delay).await;
            }
            Err(e) => {
                error!(error = %e.message, attempts = attempts + 1, "fetch failed");
                return Err(PrepError::fetch(url.as_str(), e.message));
            }
        }
    }
}

/// Fetch the dataset once and store it twice: a dated snapshot for `today` and the
/// canonical file the preprocessor reads. Both writes are atomic.
#[instrument(level = "info", skip(client, cfg), fields(dir = %cfg.data_dir.display()))]
pub async fn download_covid_data(
    client: &Client,
    cfg: &Config,
    today: NaiveDate,
) -> Result<Downloaded> {
    let url = Url::parse(&cfg.source_url).map_err(|e| PrepError::fetch(&cfg.source_url, e))?;

    if !cfg.data_dir.exists() {
        fs::create_dir_all(&cfg.data_dir)?;
        info!("created directory {}", cfg.data_dir.display());
    }

    info!("downloading COVID-19 data from {}", url);
    let body = fetch_csv(client, &url, &cfg.fetch).await?;

    let snapshot = cfg.snapshot_path(today);
    let canonical = cfg.raw_path();
    for path in [&snapshot, &canonical] {
        write_atomic(path, |f| Ok(f.write_all(&body)?))?;
        info!(bytes = body.len(), "saved {}", path.display());
    }

    Ok(Downloaded {
        snapshot,
        canonical,
        bytes: body.len() as u64,
    })
}
