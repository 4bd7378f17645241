use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgAction;
use clap::{Args, Parser, Subcommand, ValueEnum};
use storage_report_core::{
    capacity_snapshot, probe_for, render_capacity, AttachmentGenerator, ReportConfig, SizeUnits,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "storage-report",
    version,
    about = "Produce a read-only file system report for bug-report bundles."
)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate the file_system.txt attachment.
    Generate(GenerateArgs),
    /// Print the resolved root directories in scan order.
    Roots(RootArgs),
    /// Print the capacity block for a path's volume.
    Capacity(CapacityArgs),
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum CliSizeUnits {
    Decimal,
    Binary,
}

impl From<CliSizeUnits> for SizeUnits {
    fn from(value: CliSizeUnits) -> Self {
        match value {
            CliSizeUnits::Decimal => SizeUnits::Decimal,
            CliSizeUnits::Binary => SizeUnits::Binary,
        }
    }
}

#[derive(Debug, Args)]
struct RootArgs {
    /// Root directories to scan, in order. Overrides configured roots.
    #[arg(long = "root", value_name = "PATH", num_args = 1.., action = ArgAction::Append)]
    roots: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    roots: RootArgs,

    /// Directory to write file_system.txt into, or `-` for stdout.
    #[arg(long, default_value = "-", value_name = "DIR")]
    output: String,

    /// Unit convention for sizes.
    #[arg(long)]
    units: Option<CliSizeUnits>,

    /// Also list directories.
    #[arg(long)]
    include_directories: bool,

    /// Exclude glob patterns (repeatable).
    #[arg(long = "exclude", value_name = "GLOB", num_args = 1.., action = ArgAction::Append)]
    exclude: Vec<String>,
}

#[derive(Debug, Args)]
struct CapacityArgs {
    /// Path whose volume is queried. Defaults to the first root.
    path: Option<PathBuf>,

    /// Unit convention for sizes.
    #[arg(long)]
    units: Option<CliSizeUnits>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Generate(args) => run_generate_command(config, args),
        Commands::Roots(args) => run_roots_command(config, args),
        Commands::Capacity(args) => run_capacity_command(config, args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ReportConfig> {
    match path {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ReportConfig::default()),
    }
}

fn run_generate_command(mut config: ReportConfig, args: GenerateArgs) -> Result<()> {
    let GenerateArgs {
        roots,
        output,
        units,
        include_directories,
        exclude,
    } = args;

    if !roots.roots.is_empty() {
        config.roots = roots.roots;
    }
    if let Some(units) = units {
        config.units = units.into();
    }
    config.include_directories |= include_directories;
    config.excludes.extend(exclude);

    let generator = AttachmentGenerator::from_config(&config)?;
    let (attachment, summary) = generator
        .generate_with_summary()
        .context("failed to generate file system report")?;

    if output == "-" {
        io::stdout()
            .write_all(&attachment.data)
            .context("failed to write report to stdout")?;
    } else {
        let path = attachment
            .write_to(&output)
            .with_context(|| format!("failed to write report into {output}"))?;
        println!("Report written to {}", path.display());
        println!(
            "Listed {} entr(ies) from {} root(s), skipped {}, capacity {}.",
            summary.entries_written,
            summary.roots.len(),
            summary.entries_skipped,
            if summary.capacity_included {
                "included"
            } else {
                "unavailable"
            }
        );
    }

    Ok(())
}

fn run_roots_command(mut config: ReportConfig, args: RootArgs) -> Result<()> {
    if !args.roots.is_empty() {
        config.roots = args.roots;
    }
    let generator = AttachmentGenerator::from_config(&config)?;
    let roots = generator.resolved_roots();
    if roots.is_empty() {
        println!("No root directories resolved.");
    }
    for root in roots {
        let state = if root.is_dir() { "ok" } else { "unavailable" };
        println!("{} [{}]", root.display(), state);
    }
    Ok(())
}

fn run_capacity_command(mut config: ReportConfig, args: CapacityArgs) -> Result<()> {
    if let Some(units) = args.units {
        config.units = units.into();
    }
    config.validate()?;

    let reference = match args.path {
        Some(path) => Some(path),
        None => AttachmentGenerator::from_config(&config)?
            .resolved_roots()
            .into_iter()
            .next(),
    };

    let probe = probe_for(config.capacity_source);
    match capacity_snapshot(probe.as_ref(), reference.as_deref())? {
        Some(snapshot) => println!("{}", render_capacity(&snapshot, &config.formatter())),
        None => println!("No volume could be resolved."),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
