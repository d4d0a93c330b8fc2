//! # make-dto
//!
//! Generates DTO source files from a stub.
//!
//! ```text
//! make-dto make Admin/UserProfile
//! make-dto make CreateUser --force --output-dir app/dto --namespace app::dto
//! make-dto publish-stub
//! ```
//!
//! Settings come from the `scaffold` section of the `--config` file; flags
//! given on the command line take precedence.

use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dialoguer::{Confirm, Input};
use dto::config::{DtoConfig, ScaffoldConfig};
use dto::scaffold::{self, Outcome, Scaffolder};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "make-dto",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Generate DTO source files",
    arg_required_else_help = true,
    subcommand_required = true
)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a new DTO
    #[command(
        visible_alias = "new",
        after_help = "EXAMPLES:\n\
            \x20 make-dto make CreateUser\n\
            \x20 make-dto make Admin/UserProfile --force"
    )]
    Make(MakeArgs),

    /// Copy the built-in stub into the project for customization
    PublishStub(PublishStubArgs),
}

#[derive(Debug, Args)]
struct MakeArgs {
    /// DTO name, optionally nested with forward slashes (Admin/UserProfile)
    name: Option<String>,

    /// Overwrite an existing file without asking
    #[arg(short = 'f', long)]
    force: bool,

    /// Directory generated files are written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Root module path of generated DTOs
    #[arg(long)]
    namespace: Option<String>,

    /// Custom stub template
    #[arg(long, value_name = "FILE")]
    stub: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PublishStubArgs {
    /// Destination of the stub
    #[arg(default_value = scaffold::PUBLISHED_STUB_PATH)]
    dest: PathBuf,

    /// Overwrite an existing stub
    #[arg(short = 'f', long)]
    force: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::from(1);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("make-dto failed: {e:?}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Make(args) => make(args, cli.config.as_deref()),
        Commands::PublishStub(args) => {
            let path = scaffold::publish_stub(&args.dest, args.force)?;
            println!("Stub published to [{}].", path.display());
            Ok(())
        }
    }
}

fn make(args: MakeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_scaffold_config(config_path)?;
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(namespace) = args.namespace {
        config.namespace = namespace;
    }
    if let Some(stub) = args.stub {
        config.stub = Some(stub);
    }

    let interactive = std::io::stdin().is_terminal();
    let name = match args.name {
        Some(name) => name,
        None if interactive => Input::<String>::new()
            .with_prompt("What should the DTO be named?")
            .interact_text()
            .context("Failed to read DTO name")?,
        None => bail!("A DTO name is required"),
    };

    let force = args.force;
    let outcome = Scaffolder::new(config).generate(name.trim(), |path| {
        if force {
            return true;
        }
        if !interactive {
            eprintln!(
                "{} already exists; re-run with --force to overwrite.",
                path.display()
            );
            return false;
        }
        Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", path.display()))
            .default(false)
            .interact()
            .unwrap_or(false)
    })?;

    match &outcome {
        Outcome::Aborted(_) => eprintln!("{}", outcome.message()),
        _ => println!("{}", outcome.message()),
    }
    Ok(())
}

fn load_scaffold_config(path: Option<&Path>) -> Result<ScaffoldConfig> {
    let Some(path) = path else {
        return Ok(ScaffoldConfig::default());
    };
    let path = path
        .to_str()
        .with_context(|| format!("Config path is not valid UTF-8: {}", path.display()))?;
    Ok(DtoConfig::from_yaml_file(path)?.scaffold())
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dto={level},make_dto={level}")));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}
