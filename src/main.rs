use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use holdscan::capture;
use holdscan::config::HarvestConfig;
use holdscan::export;
use holdscan::fetch;
use holdscan::harvester::Harvester;
use holdscan::watch;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "holdscan")]
#[command(about = "Harvest legal hold template IDs and names from captured JSON traffic", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest templates from capture files (raw bodies, HAR, .gz)
    Harvest {
        /// Capture files or directories to ingest
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        limits: LimitArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch URLs and harvest their JSON responses
    Fetch {
        /// URLs to request
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        limits: LimitArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Watch a capture directory and re-render as templates appear
    Watch {
        /// Directory to poll for new capture files
        dir: PathBuf,

        /// Poll interval in seconds
        #[arg(short, long, default_value = "5")]
        interval: u64,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Manage the holdscan config file
    Config {
        /// Action: show, init, path
        #[arg(default_value = "show")]
        action: String,
    },
}

#[derive(Args)]
struct LimitArgs {
    /// Config file (default: the per-user config, if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum response body size in bytes
    #[arg(long)]
    max_bytes: Option<usize>,

    /// Ceiling on JSON nodes visited per response
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Disable the relevance prefilter (parse every JSON body)
    #[arg(long)]
    no_prefilter: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Output format (table, csv, json)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// Write to this file instead of stdout; a directory gets a
    /// timestamped CSV
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl LimitArgs {
    fn resolve(&self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::load(path)?,
            None => HarvestConfig::load_default()?,
        };
        if let Some(n) = self.max_bytes {
            config.body_limit_bytes = n;
        }
        if let Some(n) = self.max_nodes {
            config.max_nodes = n;
        }
        if self.no_prefilter {
            config.prefilter = None;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
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
        Commands::Harvest {
            inputs,
            limits,
            output,
        } => {
            info!("🔍 Harvesting capture files...");
            let mut harvester = Harvester::new(limits.resolve()?);

            let mut paths = Vec::new();
            for input in &inputs {
                paths.extend(capture::collect_capture_paths(input));
            }
            paths.sort();
            paths.dedup();

            if paths.is_empty() {
                println!("{} no capture files found", "⚠".yellow());
                return Ok(());
            }

            let pb = if paths.len() > 1 {
                let pb = ProgressBar::new(paths.len() as u64);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("[{elapsed}] {bar:40.cyan/blue} {pos}/{len} files")
                        .unwrap()
                        .progress_chars("=>-"),
                );
                Some(pb)
            } else {
                None
            };

            let (ingested, skipped) = capture::ingest_paths(&mut harvester, &paths, || {
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
            });
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }

            if skipped > 0 {
                println!("{} {} file(s) skipped", "⚠".yellow(), skipped);
            }
            info!("{} file(s) ingested", ingested);

            emit(&harvester, &output)
        }

        Commands::Fetch {
            urls,
            limits,
            output,
        } => {
            info!("🌐 Fetching {} URL(s)...", urls.len());
            let mut harvester = Harvester::new(limits.resolve()?);

            let walked = fetch::fetch_urls(&mut harvester, &urls).await?;
            info!("{} JSON response(s) harvested", walked);

            emit(&harvester, &output)
        }

        Commands::Watch {
            dir,
            interval,
            limits,
        } => {
            if !dir.is_dir() {
                bail!("not a directory: {}", dir.display());
            }
            info!("👀 Watching for captures...");
            let mut harvester = Harvester::new(limits.resolve()?);
            watch::watch_dir(&mut harvester, &dir, interval).await
        }

        Commands::Config { action } => run_config(&action),
    }
}

fn emit(harvester: &Harvester, output: &OutputArgs) -> Result<()> {
    let records = harvester.snapshot();

    match &output.output {
        // A directory target always gets the CSV contract, timestamped
        // filename included
        Some(path) if path.is_dir() => {
            let path = path.join(export::default_csv_filename());
            export::write_csv(&records, &path)?;
            println!("✅ Saved to: {}", path.display());
        }
        Some(path) => {
            let rendered = render(&records, &output.format)?;
            std::fs::write(path, rendered)?;
            println!("✅ Saved to: {}", path.display());
        }
        None => println!("{}", render(&records, &output.format)?),
    }

    export::print_summary(records.len());
    Ok(())
}

fn render(records: &[holdscan::TemplateRecord], format: &str) -> Result<String> {
    match format {
        "csv" => Ok(export::to_csv(records)),
        "json" => export::to_json(records),
        "table" => Ok(export::render_table(records).to_string()),
        other => bail!("unknown format: {}. Supported: table, csv, json", other),
    }
}

fn run_config(action: &str) -> Result<()> {
    let path = HarvestConfig::config_file_path();
    match action {
        "path" => println!("{}", path.display()),
        "init" => {
            HarvestConfig::default().save(&path)?;
            println!("✅ Wrote {}", path.display());
        }
        "show" => {
            let config = HarvestConfig::load_default()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        other => bail!("unknown action: {}. Supported: show, init, path", other),
    }
    Ok(())
}
