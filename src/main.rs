use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use cu_distributor::catalog::{Availability, VersionCatalog, default_catalog, load_catalog};
use cu_distributor::config::{DistributorConfig, load_config};
use cu_distributor::distribution::{
    DistributionReport, DistributionRequest, DistributionWorkflow, TargetOutcome,
    TargetSelection, VersionSelection,
};
use cu_distributor::inventory::{FileInventory, Inventory, detect_product_line};
use cu_distributor::logging::init_logging;
use cu_distributor::transfer::{HttpFetcher, LocalFileSystem};

/// Exit code of a run that was aborted before distribution
const EXIT_ABORTED: u8 = 2;

#[derive(Parser)]
#[command(name = "cu-distributor")]
#[command(
    version,
    about = "Resolve Exchange cumulative updates and distribute the installer to servers"
)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/cu-distributor/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog file, overriding the configured and built-in ones
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Server list export used for detection, overriding the configured one
    #[arg(long, global = true)]
    inventory: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List catalog entries in version order
    List,
    /// Print the download URL of a catalog key
    Resolve {
        key: String,
        /// Report whether a missing URL means unknown or retracted
        #[arg(long)]
        strict: bool,
    },
    /// Print the latest catalog key of a product line (detected when omitted)
    Latest { line: Option<String> },
    /// Download an installer once and copy it to every target
    Distribute(DistributeArgs),
}

#[derive(Args)]
#[group(id = "selection", multiple = false)]
struct VersionArgs {
    /// Catalog key, e.g. 2016_CU7
    #[arg(long)]
    key: Option<String>,
    /// Latest CU of a product line, e.g. 2016
    #[arg(long)]
    line: Option<String>,
    /// Download URL, bypassing the catalog
    #[arg(long)]
    url: Option<String>,
}

#[derive(Args)]
struct DistributeArgs {
    #[command(flatten)]
    version: VersionArgs,

    /// Target server; repeat or separate with commas (detected when omitted)
    #[arg(long = "target", value_delimiter = ',')]
    targets: Vec<String>,

    /// Directory under each server's root share
    #[arg(long)]
    destination: Option<String>,

    /// Delete the downloaded installer when every target succeeded
    #[arg(long)]
    remove_temp: bool,

    /// Local directory for the downloaded installer
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl VersionArgs {
    fn selection(&self) -> VersionSelection {
        if let Some(key) = &self.key {
            VersionSelection::Key(key.clone())
        } else if let Some(line) = &self.line {
            VersionSelection::LatestForLine(line.clone())
        } else if let Some(url) = &self.url {
            VersionSelection::Locator(url.clone())
        } else {
            VersionSelection::Detect
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog {
        config.catalog_path = Some(catalog);
    }
    if let Some(inventory) = cli.inventory {
        config.inventory_path = Some(inventory);
    }

    let _guard = init_logging(&config.log)?;
    debug!("Configuration: {:?}", config);

    let catalog = match config.catalog_path() {
        Some(path) => {
            load_catalog(&path).with_context(|| format!("failed to load catalog {:?}", path))?
        }
        None => default_catalog().context("failed to load built-in catalog")?,
    };

    match cli.command {
        Command::List => {
            list(&catalog);
            Ok(ExitCode::SUCCESS)
        }
        Command::Resolve { key, strict } => {
            resolve(&catalog, &key, strict);
            Ok(ExitCode::SUCCESS)
        }
        Command::Latest { line } => latest(&catalog, &config, line),
        Command::Distribute(args) => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(distribute(catalog, config, args)),
    }
}

fn list(catalog: &VersionCatalog) {
    for entry in catalog.entries() {
        println!("{}\t{}", entry.key, entry.locator);
    }
}

fn resolve(catalog: &VersionCatalog, key: &str, strict: bool) {
    if strict {
        println!("{}", catalog.lookup(key));
    } else {
        println!("{}", catalog.resolve(key));
    }
}

fn latest(
    catalog: &VersionCatalog,
    config: &DistributorConfig,
    line: Option<String>,
) -> anyhow::Result<ExitCode> {
    let line = match line {
        Some(line) => line,
        None => {
            let inventory = inventory(config).context("no inventory configured for detection")?;
            detect_product_line(inventory.as_ref())?.to_string()
        }
    };

    match catalog.latest_for_line(&line) {
        Some(key) => {
            let marker = match catalog.lookup(key) {
                Availability::Available(_) => "",
                _ => "\t(unavailable)",
            };
            println!("{}{}", key, marker);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No catalog entries for product line {}", line);
            Ok(ExitCode::from(EXIT_ABORTED))
        }
    }
}

async fn distribute(
    catalog: VersionCatalog,
    mut config: DistributorConfig,
    args: DistributeArgs,
) -> anyhow::Result<ExitCode> {
    if let Some(destination) = args.destination {
        config.destination_directory = destination;
    }
    if let Some(temp_dir) = args.temp_dir {
        config.temp_directory = temp_dir;
    }
    config.remove_temp |= args.remove_temp;

    let fetcher = HttpFetcher::new(config.fetch_timeout_secs.map(Duration::from_secs))?;
    let mut workflow = DistributionWorkflow::new(
        config.workflow()?,
        Arc::new(catalog),
        Arc::new(fetcher),
        Arc::new(LocalFileSystem),
    );
    if let Some(inventory) = inventory(&config) {
        workflow = workflow.with_inventory(inventory);
    }

    let targets = if args.targets.is_empty() {
        TargetSelection::Detect
    } else {
        TargetSelection::Explicit(
            args.targets
                .iter()
                .map(|host| host.trim())
                .filter(|host| !host.is_empty())
                .map(|host| workflow.target(host))
                .collect(),
        )
    };

    let report = workflow
        .run(DistributionRequest {
            version: args.version.selection(),
            targets,
        })
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_ABORTED)
    })
}

fn inventory(config: &DistributorConfig) -> Option<Arc<dyn Inventory>> {
    config
        .inventory_path
        .as_ref()
        .map(|path| Arc::new(FileInventory::new(path)) as Arc<dyn Inventory>)
}

fn print_report(report: &DistributionReport) {
    if let Some(error) = &report.error {
        println!("Aborted: {}", error);
        return;
    }

    if let Some(artifact) = &report.artifact {
        let action = if report.fetched { "downloaded" } else { "cached" };
        println!("{} ({}): {}", artifact.file_name, action, artifact.local_path.display());
    }
    for (target, outcome) in &report.outcomes {
        match outcome {
            TargetOutcome::Copied => println!("  {}: copied", target),
            TargetOutcome::AlreadyExists => println!("  {}: already exists", target),
            TargetOutcome::DirectoryCreateFailed(detail) => {
                println!("  {}: directory creation failed: {}", target, detail)
            }
            TargetOutcome::CopyFailed(detail) => println!("  {}: copy failed: {}", target, detail),
        }
    }
    if report.cache_removed {
        println!("Removed cached installer");
    }
}
