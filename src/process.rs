use std::{fmt, future::Future, io, process::ExitStatus};

use tokio::process::Command;

const MASK: &str = "***";

/// One external command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    secret: Option<usize>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret: None,
        }
    }

    /// Splits a configured command into program and leading arguments.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;

        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds `flag value`, hiding `value` whenever the invocation is displayed.
    pub fn secret_arg(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(flag.into());
        self.secret = Some(self.args.len());
        self.args.push(value.into());
        self
    }

    #[cfg(test)]
    pub(crate) fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;

        for (i, arg) in self.args.iter().enumerate() {
            if self.secret == Some(i) {
                write!(f, " {MASK}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }

        Ok(())
    }
}

/// Executes external commands on behalf of the launcher.
pub trait ProcessRunner {
    /// Waits for the command to finish and returns its exit code.
    fn run(&self, invocation: &Invocation) -> impl Future<Output = io::Result<i32>> + Send;
}

/// Spawns real child processes that share the launcher's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<i32> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .kill_on_drop(true)
            .status()
            .await?;

        Ok(exit_code(status))
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Prints what would be executed and pretends it succeeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunner;

impl ProcessRunner for DryRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<i32> {
        println!("{invocation}");

        Ok(0)
    }
}
