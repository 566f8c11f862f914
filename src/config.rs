use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};

pub const DEFAULT_PREFIX: &str = "!";

const VARIABLES: [&str; 3] = ["OWNER", "TOKEN", "PREFIX"];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read environment")]
    EnvironmentError(#[source] ConfigError),
    #[error("failed to read config")]
    ReadedError(#[source] ConfigError),
    #[error("failed to parse config")]
    ParserError(#[source] ConfigError),
    #[error("missing required environment variable: {}", .0.join(", "))]
    MissingVariables(Vec<&'static str>),
    #[error("{0} must contain at least the program name")]
    EmptyCommand(&'static str),
}

/// Credentials handed to the bot on every launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bot {
    pub owner: String,
    pub token: String,
    pub prefix: String,
}

#[derive(serde::Deserialize, Debug, Default)]
struct RawBot {
    owner: Option<String>,
    token: Option<String>,
    prefix: Option<String>,
}

impl Bot {
    /// Reads `OWNER`, `TOKEN` and `PREFIX` from the process environment.
    /// Names are matched exactly and no other variable is looked at. A value
    /// that is not valid Unicode counts as absent.
    pub fn from_env() -> Result<Self, Error> {
        let vars = VARIABLES
            .iter()
            .filter_map(|name| {
                let value = std::env::var_os(name)?.into_string().ok()?;
                Some((name.to_string(), value))
            })
            .collect();

        Self::from_vars(vars)
    }

    /// Same as [`Bot::from_env`], but over an explicit set of variables.
    pub fn from_vars(mut vars: config::Map<String, String>) -> Result<Self, Error> {
        vars.retain(|name, _| VARIABLES.contains(&name.as_str()));

        Self::from_environment(Environment::default().source(Some(vars)))
    }

    fn from_environment(environment: Environment) -> Result<Self, Error> {
        let raw = Config::builder()
            .add_source(environment.ignore_empty(true))
            .build()
            .map_err(Error::EnvironmentError)?
            .try_deserialize::<RawBot>()
            .map_err(Error::EnvironmentError)?;

        let mut missing = Vec::new();
        if raw.owner.is_none() {
            missing.push("OWNER");
        }
        if raw.token.is_none() {
            missing.push("TOKEN");
        }

        match (raw.owner, raw.token) {
            (Some(owner), Some(token)) => Ok(Self {
                owner,
                token,
                prefix: raw.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            }),
            _ => Err(Error::MissingVariables(missing)),
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Instance {
    pub name: String,
    pub data_path: PathBuf,
    pub backend: String,
    pub setup_command: Vec<String>,
    pub run_command: Vec<String>,
}

impl Default for Instance {
    fn default() -> Self {
        Self {
            name: "docker".to_string(),
            data_path: PathBuf::from("/data"),
            backend: "json".to_string(),
            setup_command: vec!["redbot-setup".to_string()],
            run_command: vec!["redbot".to_string()],
        }
    }
}

impl Instance {
    pub fn parse(path: &Path) -> Result<Self, Error> {
        let file = config::File::from(path);

        let config = Config::builder()
            .add_source(file)
            .build()
            .map_err(Error::ReadedError)?
            .try_deserialize::<InstanceFile>()
            .map_err(Error::ParserError)?;

        let instance = config.instance;

        if instance.setup_command.is_empty() {
            return Err(Error::EmptyCommand("setup_command"));
        }

        if instance.run_command.is_empty() {
            return Err(Error::EmptyCommand("run_command"));
        }

        Ok(instance)
    }
}

#[derive(serde::Deserialize, Debug, Default)]
struct InstanceFile {
    #[serde(default)]
    instance: Instance,
}

#[derive(Debug, Clone)]
pub struct App {
    pub bot: Bot,
    pub instance: Instance,
}

impl App {
    /// Validates the environment first, so a missing credential is reported
    /// before the config file is even opened.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let bot = Bot::from_env()?;

        let instance = match path {
            Some(path) => Instance::parse(path)?,
            None => Instance::default(),
        };

        Ok(Self { bot, instance })
    }
}
