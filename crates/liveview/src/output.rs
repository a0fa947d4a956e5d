use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use liveview_frame::ImageFrame;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    frame: u64,
    dtype: &'static str,
    shape: (u32, u32),
    payload_size: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl FrameOutput {
    fn from_frame(frame: &ImageFrame) -> Self {
        let range = frame.value_range();
        Self {
            frame: frame.sequence(),
            dtype: frame.dtype().as_str(),
            shape: frame.shape(),
            payload_size: frame.payload().len(),
            min: range.map(|(lo, _)| lo),
            max: range.map(|(_, hi)| hi),
        }
    }
}

pub fn print_frame(frame: &ImageFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput::from_frame(frame);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let (rows, cols) = frame.shape();
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FRAME", "DTYPE", "SHAPE", "BYTES", "RANGE"])
                .add_row(vec![
                    frame.sequence().to_string(),
                    frame.dtype().to_string(),
                    format!("{rows}x{cols}"),
                    frame.payload().len().to_string(),
                    format_range(frame.value_range()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let (rows, cols) = frame.shape();
            println!(
                "frame={} dtype={} shape={}x{} bytes={} range={}",
                frame.sequence(),
                frame.dtype(),
                rows,
                cols,
                frame.payload().len(),
                format_range(frame.value_range())
            );
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout();
            let _ = out.write_all(frame.payload().as_ref());
            let _ = out.flush();
        }
    }
}

pub fn print_stats(frames_received: u64, frames_shown: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "frames_received": frames_received,
                    "frames_shown": frames_shown,
                })
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FRAMES RECEIVED", "FRAMES SHOWN"])
                .add_row(vec![frames_received.to_string(), frames_shown.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("frames received={frames_received} shown={frames_shown}");
        }
        // Raw mode keeps stdout as a pure byte stream.
        OutputFormat::Raw => {
            eprintln!("frames received={frames_received} shown={frames_shown}");
        }
    }
}

fn format_range(range: Option<(f64, f64)>) -> String {
    match range {
        Some((lo, hi)) => format!("{lo}..{hi}"),
        None => "-".to_string(),
    }
}
