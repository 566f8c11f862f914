use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Logs go to stderr so that stdout only carries dry-run output.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    TermLogger::init(
        level,
        ConfigBuilder::new()
            .add_filter_allow_str("redlaunch")
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}
