use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// clap value parser for `--log-level`.
pub fn parse_level(input: &str) -> Result<LevelFilter, String> {
    input
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level {input:?} (try error, warn, info, debug, trace)"))
}

/// Install the stderr subscriber. Logs never share stdout with frame
/// output, so `--format json` stays machine-parseable.
pub fn init_logging(format: LogFormat, level: LevelFilter) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
