//! Corpus-wide scalar summaries derived from the aggregate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::Aggregate;

/// Estimated artist payout per qualifying stream, in dollars. An estimate
/// assuming no label revenue share.
const PER_STREAM_ROYALTY: f64 = 0.004;

/// Listening time in display units.
///
/// Minutes are exact (`ms / 60_000`); hours and days derive from the exact
/// minute value by integer division, so the three figures never disagree
/// through compounded rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeSpent {
    pub minutes: i64,
    pub hours: i64,
    pub days: i64,
}

impl TimeSpent {
    #[must_use]
    pub const fn from_ms(ms: i64) -> Self {
        let minutes = ms / 60_000;
        Self {
            minutes,
            hours: minutes / 60,
            days: minutes / 60 / 24,
        }
    }
}

/// The earliest music event in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstTrack {
    pub track: Option<String>,
    pub artist: Option<String>,
    pub played_at: DateTime<Utc>,
    /// Human-readable form, e.g. `Friday, May 3, 2024 at 12:00 PM`.
    pub label: String,
}

/// The single-object summary of one processing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStats {
    /// All parsed events, qualifying or not.
    pub total_entries: u64,
    /// Qualifying music streams.
    pub total_streams: u64,
    /// Distinct track names with at least one qualifying stream.
    pub total_unique_tracks: u64,
    /// Music events classified as skips.
    pub total_skipped: u64,
    pub total_music_time: TimeSpent,
    pub total_podcast_time: TimeSpent,
    /// Share of qualifying music streams played with shuffle on, as a
    /// percentage with one-decimal precision. Zero on an empty corpus.
    pub percentage_time_shuffled: f64,
    /// `None` when the corpus holds no music at all.
    pub first_track_ever: Option<FirstTrack>,
    /// Streams × $0.004, formatted to two decimals.
    pub estimated_artist_revenue: String,
}

/// Derives the summary from a finished aggregate. Pure and cheap; nothing
/// is cached because nothing needs to be.
#[must_use]
pub fn general_stats(aggregate: &Aggregate) -> GeneralStats {
    let tally = &aggregate.tally;

    let first_track_ever = aggregate.first_track_event().map(|event| FirstTrack {
        track: event.track_name().map(str::to_string),
        artist: event.artist_name().map(str::to_string),
        played_at: event.timestamp,
        label: first_played_label(event.timestamp),
    });

    GeneralStats {
        total_entries: tally.total_entries,
        total_streams: tally.music_streams,
        total_unique_tracks: tally.unique_track_names,
        total_skipped: tally.skipped,
        total_music_time: TimeSpent::from_ms(tally.music_ms),
        total_podcast_time: TimeSpent::from_ms(tally.podcast_ms),
        percentage_time_shuffled: shuffle_percentage(
            tally.shuffled_streams,
            tally.shuffle_eligible,
        ),
        first_track_ever,
        estimated_artist_revenue: estimated_revenue(tally.music_streams),
    }
}

/// Percentage of eligible events with shuffle on, one-decimal precision.
/// An empty eligible set reports 0, never a division error.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shuffle_percentage(shuffled: u64, eligible: u64) -> f64 {
    if eligible == 0 {
        return 0.0;
    }
    let raw = shuffled as f64 / eligible as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Streams × the per-stream royalty estimate, formatted to two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimated_revenue(streams: u64) -> String {
    format!("{:.2}", streams as f64 * PER_STREAM_ROYALTY)
}

fn first_played_label(instant: DateTime<Utc>) -> String {
    instant.format("%A, %B %-d, %Y at %-I:%M %p").to_string()
}
