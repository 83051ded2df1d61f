use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use skyfeed_rx::RxStats;

#[derive(Clone, Debug, Copy, ValueEnum)]
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
struct StatsOutput {
    frames: u64,
    saved: u64,
    misses: u64,
    integrity_failures: u64,
    malformed: u64,
    save_failures: u64,
}

impl From<&RxStats> for StatsOutput {
    fn from(stats: &RxStats) -> Self {
        Self {
            frames: stats.frames,
            saved: stats.saved,
            misses: stats.misses,
            integrity_failures: stats.integrity_failures,
            malformed: stats.malformed,
            save_failures: stats.save_failures,
        }
    }
}

/// Print the session summary after the receive loop ends.
pub fn print_stats(stats: &RxStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatsOutput::from(stats);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "FRAMES",
                    "SAVED",
                    "MISSES",
                    "CORRUPTED",
                    "MALFORMED",
                    "WRITE FAILURES",
                ])
                .add_row(vec![
                    stats.frames.to_string(),
                    stats.saved.to_string(),
                    stats.misses.to_string(),
                    stats.integrity_failures.to_string(),
                    stats.malformed.to_string(),
                    stats.save_failures.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frames={} saved={} misses={} corrupted={} malformed={} write_failures={}",
                stats.frames,
                stats.saved,
                stats.misses,
                stats.integrity_failures,
                stats.malformed,
                stats.save_failures
            );
        }
        OutputFormat::Raw => {
            println!("{}", stats.saved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialize_all_counters() {
        let stats = RxStats {
            frames: 5,
            saved: 2,
            misses: 1,
            integrity_failures: 1,
            malformed: 1,
            save_failures: 0,
        };
        let json = serde_json::to_string(&StatsOutput::from(&stats)).unwrap();
        assert!(json.contains("\"frames\":5"));
        assert!(json.contains("\"saved\":2"));
        assert!(json.contains("\"integrity_failures\":1"));
    }
}
