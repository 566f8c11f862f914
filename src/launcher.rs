use std::{fs, io, path::Path};

use crate::{
    config,
    process::{Invocation, ProcessRunner},
};

/// Exit code the bot uses to ask for a restart.
pub const RESTART_CODE: i32 = 26;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to inspect data directory '{path}'")]
    DataDir {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to start '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// What to do when the bot process exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Restart {
    /// Exit with the bot's status.
    #[default]
    Never,
    /// Relaunch only when the bot asks for it.
    OnRequest,
    /// Relaunch on any non-zero status.
    Always,
}

impl Restart {
    fn should_restart(self, code: i32) -> bool {
        match self {
            Restart::Never => false,
            Restart::OnRequest => code == RESTART_CODE,
            Restart::Always => code != 0,
        }
    }
}

/// A data directory without entries, or no directory at all, means the
/// instance was never set up. Hidden entries count.
pub fn needs_setup(data_path: &Path) -> io::Result<bool> {
    match fs::read_dir(data_path) {
        Ok(mut entries) => Ok(entries.next().transpose()?.is_none()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(err) => Err(err),
    }
}

pub fn setup_invocation(instance: &config::Instance) -> Invocation {
    Invocation::from_command(&instance.setup_command)
        .unwrap_or_else(|| Invocation::new("redbot-setup"))
        .arg("--no-prompt")
        .args(["--instance-name", instance.name.as_str()])
        .arg("--data-path")
        .arg(instance.data_path.to_string_lossy())
        .arg("--overwrite-existing-instance")
        .args(["--backend", instance.backend.as_str()])
}

pub fn run_invocation(app: &config::App) -> Invocation {
    let bot = &app.bot;

    Invocation::from_command(&app.instance.run_command)
        .unwrap_or_else(|| Invocation::new("redbot"))
        .arg(app.instance.name.as_str())
        .arg("--no-prompt")
        .secret_arg("--token", bot.token.as_str())
        .args(["--owner", bot.owner.as_str()])
        .args(["--prefix", bot.prefix.as_str()])
        .arg("--mentionable")
}

pub struct Launcher<R> {
    app: config::App,
    runner: R,
    restart: Restart,
}

impl<R: ProcessRunner> Launcher<R> {
    pub fn new(app: config::App, runner: R) -> Self {
        Self {
            app,
            runner,
            restart: Restart::default(),
        }
    }

    pub fn restart(mut self, restart: Restart) -> Self {
        self.restart = restart;
        self
    }

    async fn execute(&self, invocation: &Invocation) -> Result<i32, Error> {
        log::debug!("executing: {invocation}");

        self.runner
            .run(invocation)
            .await
            .map_err(|source| Error::Spawn {
                program: invocation.program.clone(),
                source,
            })
    }

    /// Runs setup if needed, then the bot. Returns the exit code the
    /// launcher should terminate with.
    pub async fn launch(&self) -> Result<i32, Error> {
        let data_path = &self.app.instance.data_path;
        let first_run = needs_setup(data_path).map_err(|source| Error::DataDir {
            path: data_path.display().to_string(),
            source,
        })?;

        if first_run {
            log::info!(
                "data directory '{}' is empty, setting up instance '{}'",
                data_path.display(),
                self.app.instance.name
            );

            let code = self.execute(&setup_invocation(&self.app.instance)).await?;
            if code != 0 {
                log::error!("instance setup failed with exit code {code}");

                return Ok(code);
            }
        }

        let invocation = run_invocation(&self.app);
        let mut launches = 0u32;

        loop {
            launches += 1;
            log::info!(
                "starting bot instance '{}' (launch #{launches})",
                self.app.instance.name
            );

            let code = self.execute(&invocation).await?;

            if !self.restart.should_restart(code) {
                if code != 0 {
                    log::warn!("bot exited with code {code}");
                } else {
                    log::info!("bot has been terminated");
                }

                return Ok(code);
            }

            if code == RESTART_CODE {
                log::info!("bot asked for a restart, relaunching");
            } else {
                log::warn!("bot exited with code {code}, relaunching");
            }
        }
    }
}
