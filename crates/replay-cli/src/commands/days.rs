//! The `days` command: per-day listening breakdown.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use replay_core::query::{self, DayView};

use super::util;

/// Runs the days command.
pub fn run(export: &Path, best: bool, limit: Option<usize>, top: usize, json: bool) -> Result<()> {
    let (aggregate, _report) = util::load_aggregate(export)?;

    let views = if best {
        query::top_days(&aggregate, limit, top)
    } else {
        let mut views = query::days(&aggregate, top);
        if let Some(limit) = limit {
            views.truncate(limit);
        }
        views
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print!("{}", format_days(&views, best));
    }
    Ok(())
}

/// Formats the human-readable day listing.
pub fn format_days(views: &[DayView], best: bool) -> String {
    let title = if best { "TOP DAYS" } else { "DAILY BREAKDOWN" };
    let mut output = util::section(title);

    if views.is_empty() {
        writeln!(output, "(no data)").unwrap();
        return output;
    }

    for view in views {
        write!(
            output,
            "{:<22}{:>5} streams  {:>7}",
            view.date,
            view.stream_count,
            util::format_hours(view.total_hours)
        )
        .unwrap();
        if let Some(top_track) = view.top_tracks.first() {
            write!(output, "  top: {} ({})", top_track.name, top_track.count).unwrap();
        } else if let Some(top_show) = view.top_podcasts.first() {
            write!(output, "  top: {} ({})", top_show.name, top_show.count).unwrap();
        }
        writeln!(output).unwrap();
    }

    let total: u64 = views.iter().map(|view| view.stream_count).sum();
    writeln!(output).unwrap();
    writeln!(output, "{} days shown, {total} streams", views.len()).unwrap();

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

    fn fixture() -> Aggregate {
        Aggregate::build(vec![
            music("2024-05-03T10:00:00Z", "A", 60_000),
            music("2024-05-03T11:00:00Z", "A", 60_000),
            music("2024-05-04T10:00:00Z", "B", 60_000),
        ])
    }

    #[test]
    fn chronological_listing() {
        let aggregate = fixture();
        let views = query::days(&aggregate, 5);
        let output = format_days(&views, false);

        assert!(output.starts_with("DAILY BREAKDOWN\n"));
        let may3 = output.find("May 3rd, 2024").unwrap();
        let may4 = output.find("May 4th, 2024").unwrap();
        assert!(may3 < may4);
        assert!(output.contains("top: A (2)"));
        assert!(output.contains("2 days shown, 3 streams"));
    }

    #[test]
    fn best_listing_ranks_by_streams() {
        let aggregate = fixture();
        let views = query::top_days(&aggregate, Some(1), 5);
        let output = format_days(&views, true);

        assert!(output.starts_with("TOP DAYS\n"));
        assert!(output.contains("May 3rd, 2024"));
        assert!(!output.contains("May 4th, 2024"));
    }

    #[test]
    fn empty_listing_prints_marker() {
        let output = format_days(&[], false);
        assert!(output.contains("(no data)"));
    }
}
