//! Shared helpers for subcommands.

use std::path::Path;

use anyhow::{Context, Result};

use replay_core::Aggregate;
use replay_ingest::IngestReport;

/// Loads an export and runs the aggregation pass.
pub fn load_aggregate(export: &Path) -> Result<(Aggregate, IngestReport)> {
    let loaded = replay_ingest::load_export(export)
        .with_context(|| format!("failed to load export {}", export.display()))?;
    let report = loaded.report;
    Ok((Aggregate::build(loaded.events), report))
}

/// Formats milliseconds as fractional hours, e.g. `2.5h`.
#[allow(clippy::cast_precision_loss)]
pub fn format_ms_as_hours(ms: i64) -> String {
    format!("{:.1}h", ms as f64 / 3_600_000.0)
}

/// Formats fractional hours, e.g. `2.5h`.
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.1}h")
}

/// A section header with its underline, common to every report.
pub fn section(title: &str) -> String {
    format!("{title}\n{}\n", "─".repeat(title.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_formatting() {
        assert_eq!(format_ms_as_hours(0), "0.0h");
        assert_eq!(format_ms_as_hours(5_400_000), "1.5h");
        assert_eq!(format_hours(2.04), "2.0h");
    }

    #[test]
    fn section_underline_matches_title_width() {
        assert_eq!(section("YEARS"), "YEARS\n─────\n");
    }
}
