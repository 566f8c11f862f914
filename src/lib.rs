pub mod config;
pub mod launcher;
pub mod log;
pub mod process;
