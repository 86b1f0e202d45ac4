pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, ConfigArgs, ExtractArgs, OutputFormatArg};
pub use handlers::{handle_config, handle_extract};
pub use output::{OutputFormat, OutputFormatter};
