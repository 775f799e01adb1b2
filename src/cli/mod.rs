pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CheckArgs, CliArgs, Commands, ConfigureArgs};
pub use output::{OutputFormat, OutputFormatter};
