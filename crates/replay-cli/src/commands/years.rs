//! The `years` command: per-year listening breakdown.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use replay_core::query::{self, YearView};

use super::util;

/// Runs the years command.
pub fn run(export: &Path, json: bool) -> Result<()> {
    let (aggregate, _report) = util::load_aggregate(export)?;
    let views = query::years(&aggregate);

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print!("{}", format_years(&views));
    }
    Ok(())
}

/// Formats the human-readable year listing.
pub fn format_years(views: &[YearView]) -> String {
    let mut output = util::section("YEARLY BREAKDOWN");

    if views.is_empty() {
        writeln!(output, "(no data)").unwrap();
        return output;
    }

    for view in views {
        writeln!(output, "{}", view.year).unwrap();
        writeln!(
            output,
            "  Music:     {} streams, {}, {} first-time tracks",
            view.streams,
            util::format_hours(view.music_hours),
            view.unique_streams
        )
        .unwrap();
        writeln!(
            output,
            "  Podcasts:  {} plays, {}",
            view.podcast_plays,
            util::format_hours(view.podcast_hours)
        )
        .unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use replay_core::{Aggregate, PlayEvent, PlayKind};

    fn music(ts: &str, track: &str, ms: i64) -> PlayEvent {
        PlayEvent {
            timestamp: ts.parse().unwrap(),
            ms_played: ms,
            platform: None,
            country: None,
            shuffle: false,
            skipped: None,
            reason_start: None,
            reason_end: None,
            offline: false,
            incognito: false,
            kind: PlayKind::Music {
                track: Some(track.to_string()),
                artist: Some("X".to_string()),
                album: None,
                track_uri: None,
            },
        }
    }

    #[test]
    fn formats_year_rows() {
        let aggregate = Aggregate::build(vec![
            music("2023-05-01T10:00:00Z", "A", 3_600_000),
            music("2024-02-01T10:00:00Z", "B", 1_800_000),
        ]);
        let views = query::years(&aggregate);
        let output = format_years(&views);

        assert!(output.starts_with("YEARLY BREAKDOWN\n"));
        assert!(output.contains("2023\n  Music:     1 streams, 1.0h, 1 first-time tracks"));
        assert!(output.contains("2024\n  Music:     1 streams, 0.5h, 1 first-time tracks"));
        assert!(output.contains("  Podcasts:  0 plays, 0.0h"));
    }

    #[test]
    fn empty_listing_prints_marker() {
        let output = format_years(&[]);
        assert!(output.contains("(no data)"));
    }
}
