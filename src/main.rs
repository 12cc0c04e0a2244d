use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use prismctl::config::Config;
use prismctl::normalize::{self, ClusterSummary, Listing, Normalized, Records, VmSummary};
use prismctl::prism::auth::{self, Credentials};
use prismctl::prism::client::{ClientOptions, Inventory, PrismClient};
use prismctl::prism::endpoint::{self, Generation};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Client for the Nutanix Prism REST API
#[derive(Parser, Debug)]
#[command(name = "prismctl", version, about, long_about = None)]
struct Args {
    /// Prism host (CVM or cluster IP / DNS name)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Prism user
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Prism password (prefer PRISM_PASSWORD)
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Skip TLS certificate validation
    #[arg(long, global = true)]
    insecure: bool,

    /// Reuse the server's session cookie after the first request
    #[arg(long, global = true)]
    session: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Remember host and username for later runs
    #[arg(long, global = true)]
    save: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the base URL of an API generation
    Url {
        #[arg(short, long, default_value = "v1")]
        generation: Generation,
    },
    /// Print the Basic auth token for the configured credentials
    Token,
    /// List clusters (v1.0 API)
    Clusters,
    /// List VMs and their NIC bindings
    Vms {
        #[arg(short, long, default_value = "v2.0")]
        generation: Generation,
    },
    /// Fetch clusters and VMs together
    Inventory {
        #[arg(long, default_value = "v2.0")]
        vm_generation: Generation,
    },
    /// Normalize a saved response body ("-" reads stdin)
    Normalize {
        #[arg(short, long)]
        generation: Generation,
        #[arg(short, long, value_enum)]
        listing: ListingArg,
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListingArg {
    Clusters,
    Vms,
}

impl From<ListingArg> for Listing {
    fn from(arg: ListingArg) -> Self {
        match arg {
            ListingArg::Clusters => Listing::Clusters,
            ListingArg::Vms => Listing::Vms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG narrows individual targets; the flag caps everything
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("prismctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("prismctl").join("prismctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".prismctl").join("prismctl.log");
    }
    PathBuf::from("prismctl.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        tracing::error!("{:?}", err);
        eprintln!("Error: {}", prismctl::format_prism_error(&err));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();

    if let Command::Normalize {
        generation,
        listing,
        file,
    } = &args.command
    {
        let body = read_body(file)?;
        let records = normalize::normalize(*generation, (*listing).into(), &body)?;
        return print_records(&records, args.output);
    }

    // CLI > config > environment
    let host = args
        .host
        .clone()
        .or_else(|| config.effective_host())
        .context("No Prism host configured. Set PRISM_HOST or use --host")?;
    let username = args
        .username
        .clone()
        .unwrap_or_else(|| config.effective_username());

    if args.save {
        config.set_host(&host)?;
        config.set_username(&username)?;
        tracing::info!("Saved host and username to {:?}", Config::config_path());
    }

    if let Command::Url { generation } = args.command {
        println!("{}", endpoint::resolve(&host, generation));
        return Ok(());
    }

    let password = args
        .password
        .clone()
        .or_else(auth::get_password)
        .context("No Prism password given. Set PRISM_PASSWORD or use --password")?;
    let credentials = Credentials::new(username, password);

    if let Command::Token = args.command {
        println!("{}", credentials.token());
        return Ok(());
    }

    config.insecure |= args.insecure;
    config.session |= args.session;
    if let Some(secs) = args.timeout {
        config.timeout_secs = Some(secs);
    }

    tracing::info!("Using host: {}, user: {}", host, credentials.username);

    let client = PrismClient::new(ClientOptions {
        host,
        credentials,
        transport: config.transport_options(),
        session: config.session,
    })?;

    match args.command {
        Command::Clusters => {
            let clusters = client.list_clusters().await?;
            print_clusters(&clusters, args.output)
        }
        Command::Vms { generation } => {
            let vms = client.list_vms(generation).await?;
            print_vms(&vms, args.output)
        }
        Command::Inventory { vm_generation } => {
            let inventory = client.inventory(vm_generation).await?;
            print_inventory(&inventory, args.output)
        }
        Command::Url { .. } | Command::Token | Command::Normalize { .. } => Ok(()),
    }
}

fn read_body(file: &Path) -> Result<Vec<u8>> {
    if file.as_os_str() == "-" {
        let mut body = Vec::new();
        std::io::stdin()
            .read_to_end(&mut body)
            .context("Failed to read stdin")?;
        return Ok(body);
    }
    std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))
}

fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => return Ok(false),
    }
    Ok(true)
}

fn print_records(records: &Records, format: OutputFormat) -> Result<()> {
    match records {
        Records::Clusters(clusters) => print_clusters(clusters, format),
        Records::Vms(vms) => print_vms(vms, format),
    }
}

fn print_skipped(skipped: usize) {
    if skipped > 0 {
        eprintln!("Skipped {} malformed entities", skipped);
    }
}

fn print_clusters(clusters: &Normalized<ClusterSummary>, format: OutputFormat) -> Result<()> {
    if print_structured(clusters, format)? {
        return Ok(());
    }

    println!(
        "{:<24} {:<38} {:>5} {:<12} {:<12} {:>5} {:<16}",
        "NAME", "UUID", "NODES", "AOS", "NCC", "RF", "EXTERNAL IP"
    );
    for c in &clusters.records {
        println!(
            "{:<24} {:<38} {:>5} {:<12} {:<12} {:>5} {:<16}",
            c.name,
            c.uuid,
            c.num_nodes,
            c.aos_version,
            c.ncc_version,
            format!(
                "{}/{}",
                c.redundancy.current_redundancy_factor, c.redundancy.desired_redundancy_factor
            ),
            c.external_ip
        );
    }
    print_skipped(clusters.skipped);
    Ok(())
}

fn print_vms(vms: &Normalized<VmSummary>, format: OutputFormat) -> Result<()> {
    if print_structured(vms, format)? {
        return Ok(());
    }

    println!("{:<32} {:<38} {:<8} {}", "NAME", "UUID", "MANAGED", "ADDRESSES");
    for vm in &vms.records {
        let managed = if vm.nics.iter().any(|nic| nic.is_managed_by_hypervisor) {
            "yes"
        } else {
            "no"
        };
        let addresses = vm.ip_addresses().into_iter().collect::<Vec<_>>().join(", ");
        println!(
            "{:<32} {:<38} {:<8} {}",
            vm.name,
            vm.uuid.as_deref().unwrap_or("-"),
            managed,
            if addresses.is_empty() { "-" } else { addresses.as_str() }
        );
    }
    print_skipped(vms.skipped);
    Ok(())
}

fn print_inventory(inventory: &Inventory, format: OutputFormat) -> Result<()> {
    if print_structured(inventory, format)? {
        return Ok(());
    }

    println!(
        "Prism {} at {}",
        inventory.host,
        inventory.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();
    print_clusters(&inventory.clusters, format)?;
    println!();
    print_vms(&inventory.vms, format)?;

    Ok(())
}
