use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use redlaunch::{
    config,
    launcher::{Launcher, Restart},
    log,
    process::{DryRunner, SystemRunner},
};

/// Sets up and starts a Red bot instance
#[derive(Parser, Debug)]
struct Args {
    /// Instance config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// What to do when the bot exits
    #[arg(long, value_enum, default_value_t = Restart::Never)]
    restart: Restart,

    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Log verbosity
    #[arg(long, default_value = "info")]
    log_level: ::log::LevelFilter,
}

#[tokio::main()]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    log::init(args.log_level).context("Failed to initialize logger")?;

    let conf = config::App::load(args.config.as_deref()).context("Failed to load config")?;

    let launched = if args.dry_run {
        Launcher::new(conf, DryRunner)
            .restart(args.restart)
            .launch()
            .await
    } else {
        Launcher::new(conf, SystemRunner)
            .restart(args.restart)
            .launch()
            .await
    };
    let code = launched.context("Unexpected error on launch")?;

    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
