use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use version_watch::config::{WatchConfig, log_path};

#[derive(Parser)]
#[command(name = "version-watch")]
#[command(version, about = "Reports packages whose catalog page shows a new version")]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Newline-delimited list of package identifiers
    #[arg(long)]
    list: Option<PathBuf>,

    /// Package record store
    #[arg(long)]
    records: Option<PathBuf>,

    /// Progress store
    #[arg(long)]
    progress: Option<PathBuf>,

    /// HTML report written when packages changed
    #[arg(long)]
    report: Option<PathBuf>,

    /// Catalog URL prefix; the identifier is appended to it
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum number of packages fetched at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Also write logs to the data directory
    #[arg(long)]
    log_file: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<WatchConfig> {
        let mut config = match &self.config {
            Some(path) => WatchConfig::from_file(path)?,
            None => WatchConfig::default(),
        };

        if let Some(list) = self.list {
            config.files.packages_list = list;
        }
        if let Some(records) = self.records {
            config.files.records = records;
        }
        if let Some(progress) = self.progress {
            config.files.progress = progress;
        }
        if let Some(report) = self.report {
            config.files.report = report;
        }
        if let Some(base_url) = self.base_url {
            config.fetch.base_url = base_url;
        }
        if let Some(concurrency) = self.concurrency {
            config.fetch.concurrency = concurrency;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_file = cli.log_file.then(log_path);
    let _guard = version_watch::logging::init(log_file.as_deref())?;
    let config = cli.into_config()?;

    let summary = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(version_watch::watch::execute(&config))?;

    info!(
        "Done: {} packages, {} skipped, {} checked, {} without version, {} not found, {} failed",
        summary.total,
        summary.counts.skipped,
        summary.counts.reconciled,
        summary.counts.no_version,
        summary.counts.not_found,
        summary.counts.failed
    );
    match &summary.report {
        Some(path) => info!("HTML report generated: {:?}", path),
        None => info!("No changes found"),
    }
    if summary.pruned > 0 {
        info!("{} identifiers pruned from the list", summary.pruned);
    }

    Ok(())
}
