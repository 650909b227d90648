//! Read-side projections of the aggregate.
//!
//! One serializable view per statistic family, matching what a boundary
//! layer serves per endpoint. Views use camelCase field names and are
//! ordered deterministically (rank order for top lists, chronological for
//! calendar lists), so serializing the same aggregate twice produces
//! identical output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::bucket::{CountRow, DayBucket, day_label};
use crate::rank::{Metric, top_n};
use crate::stats::{AlbumStats, ArtistStats, PodcastStats, TrackStats};

/// One row of the top-tracks view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackView {
    pub rank: usize,
    pub track: String,
    pub artist: Option<String>,
    pub stream_count: u64,
    pub skip_count: u64,
    pub total_ms_played: i64,
    pub unique_day_count: usize,
    pub first_played_at: Option<DateTime<Utc>>,
}

/// One row of the top-artists view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistView {
    pub rank: usize,
    pub artist: String,
    pub stream_count: u64,
    pub unique_stream_count: u64,
    pub skip_count: u64,
    pub total_ms_played: i64,
}

/// One row of the top-albums view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumView {
    pub rank: usize,
    pub album: String,
    /// Artists observed on the album, joined for display.
    pub artist: String,
    pub stream_count: u64,
    pub skip_count: u64,
    pub total_ms_played: i64,
}

/// One row of the top-podcasts view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastView {
    pub rank: usize,
    pub show: String,
    pub episode_plays: u64,
    pub total_ms_played: i64,
}

/// One calendar day with its nested breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    /// The bucket's external key, e.g. `May 3rd, 2024`.
    pub date: String,
    pub stream_count: u64,
    pub total_hours: f64,
    pub top_tracks: Vec<CountRow>,
    pub top_artists: Vec<CountRow>,
    pub top_podcasts: Vec<CountRow>,
    pub entry_count: usize,
}

/// One calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearView {
    pub year: i32,
    pub streams: u64,
    pub music_hours: f64,
    pub unique_streams: u64,
    pub podcast_plays: u64,
    pub podcast_hours: f64,
}

/// One retained event, for day-level drill-down.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub played_at: DateTime<Utc>,
    /// Track name for music, episode name for podcasts.
    pub name: Option<String>,
    pub artist_or_show: Option<String>,
    pub ms_played: i64,
}

#[allow(clippy::cast_precision_loss)]
fn track_metric(metric: Metric) -> impl Fn(&TrackStats) -> f64 {
    move |stat| match metric {
        Metric::Streams => stat.stream_count as f64,
        Metric::Unique => stat.unique_days.len() as f64,
        Metric::Hours => stat.total_ms_played as f64,
    }
}

#[allow(clippy::cast_precision_loss)]
fn artist_metric(metric: Metric) -> impl Fn(&ArtistStats) -> f64 {
    move |stat| match metric {
        Metric::Streams => stat.stream_count as f64,
        Metric::Unique => stat.unique_stream_count as f64,
        Metric::Hours => stat.total_ms_played as f64,
    }
}

#[allow(clippy::cast_precision_loss)]
fn album_metric(metric: Metric) -> impl Fn(&AlbumStats) -> f64 {
    move |stat| match metric {
        Metric::Streams | Metric::Unique => stat.stream_count as f64,
        Metric::Hours => stat.total_ms_played as f64,
    }
}

#[allow(clippy::cast_precision_loss)]
fn podcast_metric(metric: Metric) -> impl Fn(&PodcastStats) -> f64 {
    move |stat| match metric {
        Metric::Streams | Metric::Unique => stat.episode_plays as f64,
        Metric::Hours => stat.total_ms_played as f64,
    }
}

/// Ranked tracks, truncated to `limit` when given.
#[must_use]
pub fn top_tracks(aggregate: &Aggregate, limit: Option<usize>, metric: Metric) -> Vec<TrackView> {
    top_n(&aggregate.tracks, limit, track_metric(metric))
        .into_iter()
        .map(|row| TrackView {
            rank: row.rank,
            track: row.key.clone(),
            artist: row.stat.artist.clone(),
            stream_count: row.stat.stream_count,
            skip_count: row.stat.skip_count,
            total_ms_played: row.stat.total_ms_played,
            unique_day_count: row.stat.unique_days.len(),
            first_played_at: row.stat.first_played_at,
        })
        .collect()
}

/// Ranked artists.
#[must_use]
pub fn top_artists(aggregate: &Aggregate, limit: Option<usize>, metric: Metric) -> Vec<ArtistView> {
    top_n(&aggregate.artists, limit, artist_metric(metric))
        .into_iter()
        .map(|row| ArtistView {
            rank: row.rank,
            artist: row.key.clone(),
            stream_count: row.stat.stream_count,
            unique_stream_count: row.stat.unique_stream_count,
            skip_count: row.stat.skip_count,
            total_ms_played: row.stat.total_ms_played,
        })
        .collect()
}

/// Ranked albums.
#[must_use]
pub fn top_albums(aggregate: &Aggregate, limit: Option<usize>, metric: Metric) -> Vec<AlbumView> {
    top_n(&aggregate.albums, limit, album_metric(metric))
        .into_iter()
        .map(|row| AlbumView {
            rank: row.rank,
            album: row.key.clone(),
            artist: row
                .stat
                .artists
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            stream_count: row.stat.stream_count,
            skip_count: row.stat.skip_count,
            total_ms_played: row.stat.total_ms_played,
        })
        .collect()
}

/// Ranked podcast shows.
#[must_use]
pub fn top_podcasts(
    aggregate: &Aggregate,
    limit: Option<usize>,
    metric: Metric,
) -> Vec<PodcastView> {
    top_n(&aggregate.podcasts, limit, podcast_metric(metric))
        .into_iter()
        .map(|row| PodcastView {
            rank: row.rank,
            show: row.key.clone(),
            episode_plays: row.stat.episode_plays,
            total_ms_played: row.stat.total_ms_played,
        })
        .collect()
}

fn day_view(aggregate: &Aggregate, date: NaiveDate, bucket: &DayBucket, top: usize) -> DayView {
    let events = aggregate.events();
    DayView {
        date: day_label(date),
        stream_count: bucket.stream_count,
        total_hours: bucket.total_hours,
        top_tracks: bucket.top_tracks(events, top),
        top_artists: bucket.top_artists(events, top),
        top_podcasts: bucket.top_podcasts(events, top),
        entry_count: bucket.entries.len(),
    }
}

/// All day buckets in chronological order, each with bounded breakdowns.
#[must_use]
pub fn days(aggregate: &Aggregate, top: usize) -> Vec<DayView> {
    aggregate
        .days
        .iter()
        .map(|(&date, bucket)| day_view(aggregate, date, bucket, top))
        .collect()
}

/// The most-streamed days, descending; ties go to the earlier date.
#[must_use]
pub fn top_days(aggregate: &Aggregate, limit: Option<usize>, top: usize) -> Vec<DayView> {
    let mut ordered: Vec<(&NaiveDate, &DayBucket)> = aggregate.days.iter().collect();
    ordered.sort_by(|a, b| b.1.stream_count.cmp(&a.1.stream_count).then(a.0.cmp(b.0)));
    if let Some(limit) = limit {
        ordered.truncate(limit);
    }
    ordered
        .into_iter()
        .map(|(&date, bucket)| day_view(aggregate, date, bucket, top))
        .collect()
}

/// All year buckets in chronological order.
#[must_use]
pub fn years(aggregate: &Aggregate) -> Vec<YearView> {
    aggregate
        .years
        .iter()
        .map(|(&year, bucket)| YearView {
            year,
            streams: bucket.music_stream_count,
            music_hours: bucket.music_hours,
            unique_streams: bucket.music_unique_stream_count,
            podcast_plays: bucket.podcast_play_count,
            podcast_hours: bucket.podcast_hours,
        })
        .collect()
}

/// The retained events of one day, for drill-down. `None` for a day with
/// no bucket.
#[must_use]
pub fn day_entries(aggregate: &Aggregate, date: NaiveDate) -> Option<Vec<EntryView>> {
    let bucket = aggregate.days.get(&date)?;
    let events = aggregate.events();
    Some(
        bucket
            .entries
            .iter()
            .map(|&idx| {
                let event = &events[idx];
                EntryView {
                    played_at: event.timestamp,
                    name: event
                        .track_name()
                        .or_else(|| event.episode_name())
                        .map(str::to_string),
                    artist_or_show: event
                        .artist_name()
                        .or_else(|| event.show_name())
                        .map(str::to_string),
                    ms_played: event.ms_played,
                }
            })
            .collect(),
    )
}

/// Lazy day-level breakdown of one year. `None` for a year with no bucket.
#[must_use]
pub fn year_day_breakdown(aggregate: &Aggregate, year: i32, top: usize) -> Option<Vec<DayView>> {
    let bucket = aggregate.years.get(&year)?;
    let breakdown = bucket.day_breakdown(aggregate.events());
    Some(
        breakdown
            .iter()
            .map(|(&date, day)| day_view(aggregate, date, day, top))
            .collect(),
    )
}
