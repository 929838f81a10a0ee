use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use covidprep::{
    config::Config,
    fetch,
    process::{self, Outputs},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Download and preprocess the OWID COVID-19 dataset"
)]
struct Args {
    /// Directory to store data files [default: data]
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Skip downloading and use existing data
    #[arg(long)]
    no_download: bool,
    /// Skip preprocessing
    #[arg(long)]
    no_preprocess: bool,
    /// Override the dataset URL
    #[arg(long)]
    source_url: Option<String>,
    /// Also write the processed table as Parquet
    #[arg(long)]
    parquet: bool,
    /// YAML file with defaults for any of the above
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_yaml_file(path)?,
            None => Config::default(),
        };
        if let Some(dir) = self.data_dir {
            cfg.data_dir = dir;
        }
        if let Some(url) = self.source_url {
            cfg.source_url = url;
        }
        cfg.download &= !self.no_download;
        cfg.preprocess &= !self.no_preprocess;
        cfg.parquet |= self.parquet;
        Ok(cfg)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cfg = Args::parse().into_config()?;
    info!(dir = %cfg.data_dir.display(), download = cfg.download, preprocess = cfg.preprocess, "startup");

    // ─── 2) fetch ────────────────────────────────────────────────────
    if cfg.download {
        let client = fetch::build_client(&cfg.fetch)?;
        let today = Local::now().date_naive();
        let out = fetch::download_covid_data(&client, &cfg, today)
            .await
            .context("download failed")?;
        info!(bytes = out.bytes, snapshot = %out.snapshot.display(), "download complete");
    }

    // ─── 3) preprocess ───────────────────────────────────────────────
    if cfg.preprocess {
        let input = cfg.raw_path();
        let csv = cfg.processed_csv_path();
        let parquet = cfg.parquet.then(|| cfg.processed_parquet_path());
        process::preprocess_data(
            &input,
            Outputs {
                csv: Some(&csv),
                parquet: parquet.as_deref(),
            },
        )
        .with_context(|| format!("preprocessing {} failed", input.display()))?;
        info!("data ready for analysis");
    }

    info!("done");
    Ok(())
}
