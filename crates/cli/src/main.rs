mod commands;

use clap::{Parser, Subcommand};
use hostcaps::ProbeConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hostcaps")]
#[command(about = "Discover what guests a hypervisor host can run")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the host and print its full capability model
    Probe(commands::probe::ProbeArgs),

    /// Print the CPU summary parsed from cpuinfo
    Nodeinfo(commands::nodeinfo::NodeinfoArgs),

    /// Parse a guest capability string and print the resulting guests
    Parse(commands::parse::ParseArgs),

    /// Detect which device model variant an emulator binary is
    Emulator(commands::emulator::EmulatorArgs),

    /// Show version information
    Version(commands::version::VersionArgs),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ProbeConfig> {
    let Some(path) = path else {
        return Ok(ProbeConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
    let config: ProbeConfig = toml::from_str(&text)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    config.validate()?;
    tracing::debug!(config = %path.display(), "Loaded configuration");
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Probe(args) => commands::probe::run(args, config)?,
        Commands::Nodeinfo(args) => commands::nodeinfo::run(args, config)?,
        Commands::Parse(args) => commands::parse::run(args, config)?,
        Commands::Emulator(args) => commands::emulator::run(args, config),
        Commands::Version(args) => commands::version::run(args),
    }

    Ok(())
}
