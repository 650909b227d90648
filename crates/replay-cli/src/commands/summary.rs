//! The `summary` command: the overall listening report.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use replay_core::{GeneralStats, TimeSpent, general_stats};
use replay_ingest::IngestReport;

use super::util;

/// Runs the summary command.
pub fn run(export: &Path, json: bool) -> Result<()> {
    let (aggregate, report) = util::load_aggregate(export)?;
    let stats = general_stats(&aggregate);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", format_summary(&stats, &report));
    }
    Ok(())
}

/// Formats the human-readable summary report.
pub fn format_summary(stats: &GeneralStats, report: &IngestReport) -> String {
    let mut output = String::new();

    output.push_str(&util::section("LISTENING SUMMARY"));
    writeln!(output, "Entries:        {}", stats.total_entries).unwrap();
    writeln!(output, "Streams:        {}", stats.total_streams).unwrap();
    writeln!(output, "Unique tracks:  {}", stats.total_unique_tracks).unwrap();
    writeln!(output, "Skipped plays:  {}", stats.total_skipped).unwrap();
    writeln!(output, "Shuffled:       {:.1}%", stats.percentage_time_shuffled).unwrap();
    writeln!(output, "Est. payout:    ${}", stats.estimated_artist_revenue).unwrap();

    writeln!(output).unwrap();
    output.push_str(&util::section("MUSIC TIME"));
    write_time(&mut output, stats.total_music_time);

    writeln!(output).unwrap();
    output.push_str(&util::section("PODCAST TIME"));
    write_time(&mut output, stats.total_podcast_time);

    writeln!(output).unwrap();
    output.push_str(&util::section("FIRST TRACK"));
    match &stats.first_track_ever {
        Some(first) => {
            let track = first.track.as_deref().unwrap_or("(unknown track)");
            match first.artist.as_deref() {
                Some(artist) => writeln!(output, "\"{track}\" by {artist}").unwrap(),
                None => writeln!(output, "\"{track}\"").unwrap(),
            }
            writeln!(output, "{}", first.label).unwrap();
        }
        None => writeln!(output, "(no music in this export)").unwrap(),
    }

    let diagnostics =
        report.files_skipped + report.dropped_records + report.duplicate_files;
    if diagnostics > 0 {
        writeln!(output).unwrap();
        writeln!(
            output,
            "Note: {} files skipped, {} records dropped, {} duplicate files",
            report.files_skipped, report.dropped_records, report.duplicate_files
        )
        .unwrap();
    }

    output
}

fn write_time(output: &mut String, time: TimeSpent) {
    writeln!(output, "Minutes:  {}", time.minutes).unwrap();
    writeln!(output, "Hours:    {}", time.hours).unwrap();
    writeln!(output, "Days:     {}", time.days).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Utc};
    use insta::assert_snapshot;

    use replay_core::FirstTrack;

    fn fixture_stats() -> GeneralStats {
        let played_at: DateTime<Utc> = "2024-05-03T12:00:00Z".parse().unwrap();
        GeneralStats {
            total_entries: 5,
            total_streams: 3,
            total_unique_tracks: 2,
            total_skipped: 1,
            total_music_time: TimeSpent::from_ms(200_000),
            total_podcast_time: TimeSpent::from_ms(120_000),
            percentage_time_shuffled: 33.3,
            first_track_ever: Some(FirstTrack {
                track: Some("A".to_string()),
                artist: Some("X".to_string()),
                played_at,
                label: "Friday, May 3, 2024 at 12:00 PM".to_string(),
            }),
            estimated_artist_revenue: "0.01".to_string(),
        }
    }

    #[test]
    fn summary_report() {
        let output = format_summary(&fixture_stats(), &IngestReport::default());
        assert_snapshot!(output, @r#"
        LISTENING SUMMARY
        ─────────────────
        Entries:        5
        Streams:        3
        Unique tracks:  2
        Skipped plays:  1
        Shuffled:       33.3%
        Est. payout:    $0.01

        MUSIC TIME
        ──────────
        Minutes:  3
        Hours:    0
        Days:     0

        PODCAST TIME
        ────────────
        Minutes:  2
        Hours:    0
        Days:     0

        FIRST TRACK
        ───────────
        "A" by X
        Friday, May 3, 2024 at 12:00 PM
        "#);
    }

    #[test]
    fn summary_without_music_shows_marker() {
        let mut stats = fixture_stats();
        stats.first_track_ever = None;
        let output = format_summary(&stats, &IngestReport::default());
        assert!(output.contains("(no music in this export)"));
    }

    #[test]
    fn diagnostics_note_appears_when_nonzero() {
        let report = IngestReport {
            files_skipped: 1,
            dropped_records: 2,
            ..IngestReport::default()
        };
        let output = format_summary(&fixture_stats(), &report);
        assert!(output.contains("Note: 1 files skipped, 2 records dropped, 0 duplicate files"));
    }

    #[test]
    fn no_diagnostics_note_when_clean() {
        let output = format_summary(&fixture_stats(), &IngestReport::default());
        assert!(!output.contains("Note:"));
    }
}
