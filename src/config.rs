//! Run configuration: where data lives, where it comes from, and which stages run.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_SOURCE_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

const RAW_FILE_STEM: &str = "owid-covid-data";
const PROCESSED_FILE_STEM: &str = "processed_covid_data";

/// Settings for one run. Every field has a default, so a YAML file only needs the
/// keys it wants to override.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the raw download, its dated snapshots, and processed output
    pub data_dir: PathBuf,
    pub source_url: String,
    pub download: bool,
    pub preprocess: bool,
    /// Also write the cleaned table as Parquet next to the CSV
    pub parquet: bool,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            download: true,
            preprocess: true,
            parquet: false,
            fetch: FetchConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            timeout_secs: 120,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

impl Config {
    /// Load a YAML config file; missing keys fall back to defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Canonical raw download, overwritten by every fetch.
    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.csv", RAW_FILE_STEM))
    }

    /// Dated copy of the raw download, e.g. `owid-covid-data_20210101.csv`.
    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}_{}.csv", RAW_FILE_STEM, date.format("%Y%m%d")))
    }

    pub fn processed_csv_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.csv", PROCESSED_FILE_STEM))
    }

    pub fn processed_parquet_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.parquet", PROCESSED_FILE_STEM))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_use_data_dir_layout() {
        let cfg = Config::default();
        assert_eq!(cfg.raw_path(), PathBuf::from("data/owid-covid-data.csv"));
        assert_eq!(
            cfg.processed_csv_path(),
            PathBuf::from("data/processed_covid_data.csv")
        );
        let d = NaiveDate::from_ymd_opt(2021, 3, 7).unwrap();
        assert_eq!(
            cfg.snapshot_path(d),
            PathBuf::from("data/owid-covid-data_20210307.csv")
        );
        assert!(cfg.download && cfg.preprocess && !cfg.parquet);
    }

    #[test]
    fn yaml_overrides_only_given_keys() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "data_dir: /tmp/covid\nparquet: true\nfetch:\n  max_retries: 5")?;

        let cfg = Config::from_yaml_file(f.path())?;
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/covid"));
        assert!(cfg.parquet);
        assert_eq!(cfg.fetch.max_retries, 5);
        assert_eq!(cfg.fetch.initial_backoff_ms, 500);
        assert_eq!(cfg.source_url, DEFAULT_SOURCE_URL);
        Ok(())
    }

    #[test]
    fn backoff_doubles() {
        let f = FetchConfig {
            initial_backoff_ms: 100,
            ..FetchConfig::default()
        };
        assert_eq!(f.backoff(1), Duration::from_millis(100));
        assert_eq!(f.backoff(2), Duration::from_millis(200));
        assert_eq!(f.backoff(3), Duration::from_millis(400));
    }
}
