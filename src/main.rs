mod assets;
mod cmd;
mod config;
mod log;
mod patch;
mod pipeline;
mod spotify;
mod status;
mod ui;
mod watch;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use config::{Config, ConfigError, Paths};
use pipeline::{Pipeline, PipelineError};
use status::BackupStatus;
use ui::Printer;

#[derive(Parser)]
#[command(
    name = "apolo",
    about = "Customize the look and features of the Spotify desktop client",
    version,
    disable_version_flag = true
)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Print nothing and take the default answer at every prompt
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the config file path and exit
    #[arg(short = 'c', long = "config")]
    print_config: bool,

    /// Config directory override
    #[arg(long, env = "APOLO_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up the Spotify app files and extract them for patching
    Backup,
    /// Apply the current theme and feature flags, then restart Spotify
    Apply,
    /// Re-inject the theme CSS without reseeding or restarting
    Update,
    /// Put the backed-up app files back in place
    Restore,
    /// Delete the backup and extracted files
    Clear,
    /// Enable the client's developer tools
    EnableDevtools,
    /// Disable the client's developer tools
    DisableDevtools,
    /// Rerun `update` whenever the theme's user.css or color.ini changes
    Watch,
}

fn main() {
    let cli = Cli::parse();
    log::initialize(true);
    let printer = Printer::new(cli.quiet);

    if let Err(err) = run(cli, printer) {
        tracing::error!("{:#}", err);
        printer.error(&format!("{err:#}"));
        if is_fatal(&err) {
            std::process::exit(1);
        }
    }
}

/// A missing backup, a refused prompt and configuration errors exit non-zero.
/// Other failures are reported and the process exits normally.
fn is_fatal(err: &anyhow::Error) -> bool {
    if let Some(err) = err.downcast_ref::<PipelineError>() {
        return err.is_fatal();
    }
    err.downcast_ref::<ConfigError>().is_some()
}

fn run(cli: Cli, printer: Printer) -> anyhow::Result<()> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => config::get_config_dir()?,
    };

    if cli.print_config {
        // Bypasses quiet: the path is the whole point of the flag.
        println!("{}", config::config_file(&config_dir).display());
        return Ok(());
    }

    let config_path = config::config_file(&config_dir);
    let config = Config::load(&config_dir)?;
    if !config_path.exists() {
        config.save(&config_dir)?;
        tracing::info!("wrote default config to {}", config_path.display());
    }

    printer.bold(&format!("apolo v{}", env!("CARGO_PKG_VERSION")));

    let Some(command) = cli.command else {
        printer.info(&format!("config: {}", config_path.display()));
        printer.info("run \"apolo --help\" to list the commands");
        return Ok(());
    };

    let mut pipeline = Pipeline::new(config, Paths::new(&config_dir), printer);
    match command {
        Commands::Backup => {
            pipeline.backup()?;
        }
        Commands::Apply => {
            let outcome = pipeline.apply()?;
            if outcome.backup_status == BackupStatus::Outdated {
                printer.warning("applied over an outdated backup");
            }
            tracing::info!(
                "apply: {} stylesheets, {} flags patched, {} unmatched",
                outcome.css.stylesheets,
                outcome.flags.patched.len(),
                outcome.flags.unmatched.len()
            );
        }
        Commands::Update => {
            pipeline.update()?;
        }
        Commands::Restore => pipeline.restore()?,
        Commands::Clear => {
            pipeline.clear()?;
        }
        Commands::EnableDevtools => pipeline.set_devtools(true)?,
        Commands::DisableDevtools => pipeline.set_devtools(false)?,
        Commands::Watch => {
            watch::run(&pipeline)?;
        }
    }
    Ok(())
}
