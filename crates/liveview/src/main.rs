mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::cmd::Command;
use crate::logging::{init_logging, parse_level, LogFormat};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "liveview", version, about = "Detector live view demo")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", value_parser = parse_level, global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
