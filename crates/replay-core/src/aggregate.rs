//! The single-pass aggregation fold.
//!
//! [`Aggregate::build`] consumes the full event collection once and returns
//! an immutable aggregate value. There is no ambient state: callers hold the
//! aggregate and pass it to the read-side (ranking, summary, projections).
//!
//! The fold has two phases. Phase one updates associative counters only, so
//! a partitioned fold would need nothing but per-counter summation to merge.
//! Phase two is a dedicated pass in timestamp order for the few derivations
//! that are not order-independent: the first track ever played, each
//! entity's first-played instant, and the artist of record for a track name.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use crate::bucket::{DayBucket, YearBucket};
use crate::event::PlayEvent;
use crate::stats::{AlbumStats, ArtistStats, PodcastStats, TrackStats};

/// Corpus-wide counters accumulated during the fold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    /// All parsed events, qualifying or not.
    pub total_entries: u64,
    /// Qualifying music streams.
    pub music_streams: u64,
    /// Distinct track names with at least one qualifying stream.
    pub unique_track_names: u64,
    /// Music events classified as skips.
    pub skipped: u64,
    /// Playback time across all music events, sub-threshold included.
    pub music_ms: i64,
    /// Playback time across all podcast events, sub-threshold included.
    pub podcast_ms: i64,
    /// Events eligible for the shuffle percentage (qualifying music streams).
    pub shuffle_eligible: u64,
    /// Eligible events that had shuffle on.
    pub shuffled_streams: u64,
    /// Index of the earliest-timestamped music event.
    pub first_track: Option<usize>,
}

/// Everything one aggregation run produced. Read-only after build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    events: Vec<PlayEvent>,
    pub tracks: BTreeMap<String, TrackStats>,
    pub artists: BTreeMap<String, ArtistStats>,
    pub albums: BTreeMap<String, AlbumStats>,
    pub podcasts: BTreeMap<String, PodcastStats>,
    pub days: BTreeMap<NaiveDate, DayBucket>,
    pub years: BTreeMap<i32, YearBucket>,
    pub tally: Tally,
}

impl Aggregate {
    /// Folds the event collection into the aggregate. Pure; the only state
    /// is the returned value.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn build(events: Vec<PlayEvent>) -> Self {
        let mut tally = Tally::default();
        let mut tracks: BTreeMap<String, TrackStats> = BTreeMap::new();
        let mut artists: BTreeMap<String, ArtistStats> = BTreeMap::new();
        let mut albums: BTreeMap<String, AlbumStats> = BTreeMap::new();
        let mut podcasts: BTreeMap<String, PodcastStats> = BTreeMap::new();
        let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
        let mut years: BTreeMap<i32, YearBucket> = BTreeMap::new();

        // Fold-lifetime scratch; none of it survives into the aggregate.
        let mut streamed_tracks: HashSet<&str> = HashSet::new();
        let mut artist_tracks: HashMap<&str, HashSet<&str>> = HashMap::new();
        let mut yearly_unique: HashSet<&str> = HashSet::new();

        for (idx, event) in events.iter().enumerate() {
            tally.total_entries += 1;
            let ms = event.ms_played;
            let date = event.timestamp.date_naive();
            let year = date.year();

            if event.is_music() {
                tally.music_ms += ms;
                if event.is_skip() {
                    tally.skipped += 1;
                }
                if event.is_shuffle_eligible() {
                    tally.shuffle_eligible += 1;
                    if event.shuffle {
                        tally.shuffled_streams += 1;
                    }
                }

                if let Some(track) = event.track_name() {
                    let next = tracks.len();
                    let stat = tracks
                        .entry(track.to_string())
                        .or_insert_with(|| TrackStats::new(next));
                    if event.is_skip() {
                        stat.skip_count += 1;
                    }
                    if event.is_stream() {
                        stat.stream_count += 1;
                        stat.total_ms_played += ms;
                        stat.unique_days.insert(date);
                    }
                }

                if let Some(artist) = event.artist_name() {
                    let next = artists.len();
                    let stat = artists
                        .entry(artist.to_string())
                        .or_insert_with(|| ArtistStats::new(next));
                    if event.is_skip() {
                        stat.skip_count += 1;
                    }
                    if event.is_stream() {
                        stat.stream_count += 1;
                        stat.total_ms_played += ms;
                        if let Some(track) = event.track_name() {
                            if artist_tracks.entry(artist).or_default().insert(track) {
                                stat.unique_stream_count += 1;
                            }
                        }
                    }
                }

                if let Some(album) = event.album_name() {
                    let next = albums.len();
                    let stat = albums
                        .entry(album.to_string())
                        .or_insert_with(|| AlbumStats::new(next));
                    if event.is_skip() {
                        stat.skip_count += 1;
                    }
                    if event.is_stream() {
                        stat.stream_count += 1;
                        stat.total_ms_played += ms;
                        if let Some(artist) = event.artist_name() {
                            stat.artists.insert(artist.to_string());
                        }
                    }
                }

                if event.is_stream() {
                    tally.music_streams += 1;
                    if let Some(track) = event.track_name() {
                        streamed_tracks.insert(track);
                    }

                    days.entry(date).or_default().push(idx, event);

                    let bucket = years.entry(year).or_default();
                    bucket.music_stream_count += 1;
                    bucket.music_hours += event.hours();
                    bucket.entries.push(idx);
                }
            } else {
                tally.podcast_ms += ms;

                if let Some(show) = event.show_name() {
                    let next = podcasts.len();
                    let stat = podcasts
                        .entry(show.to_string())
                        .or_insert_with(|| PodcastStats::new(next));
                    if event.is_stream() {
                        stat.episode_plays += 1;
                        stat.total_ms_played += ms;
                    }
                }

                if event.is_stream() {
                    days.entry(date).or_default().push(idx, event);

                    let bucket = years.entry(year).or_default();
                    bucket.podcast_play_count += 1;
                    bucket.podcast_hours += event.hours();
                    bucket.entries.push(idx);
                }
            }
        }

        tally.unique_track_names = streamed_tracks.len() as u64;

        // Phase two: timestamp-ordered derivations. Iterating a sorted index
        // makes "earliest wins" a plain first-write, independent of input
        // order (ties keep input order, as the sort is stable).
        let mut by_time: Vec<usize> = (0..events.len()).collect();
        by_time.sort_by_key(|&i| events[i].timestamp);

        for &idx in &by_time {
            let event = &events[idx];
            if !event.is_music() {
                continue;
            }
            if tally.first_track.is_none() {
                tally.first_track = Some(idx);
            }
            // A track is "new" in the year of its first qualifying stream.
            if event.is_stream() {
                if let Some(key) = event.track_uri().or_else(|| event.track_name()) {
                    if yearly_unique.insert(key) {
                        if let Some(bucket) = years.get_mut(&event.timestamp.date_naive().year()) {
                            bucket.music_unique_stream_count += 1;
                        }
                    }
                }
            }
            if let Some(stat) = event.track_name().and_then(|t| tracks.get_mut(t)) {
                stat.first_played_at.get_or_insert(event.timestamp);
                if stat.artist.is_none() {
                    if let Some(artist) = event.artist_name() {
                        stat.artist = Some(artist.to_string());
                    }
                }
            }
            if let Some(stat) = event.artist_name().and_then(|a| artists.get_mut(a)) {
                stat.first_played_at.get_or_insert(event.timestamp);
            }
            if let Some(stat) = event.album_name().and_then(|a| albums.get_mut(a)) {
                stat.first_played_at.get_or_insert(event.timestamp);
            }
        }

        tracing::debug!(
            entries = tally.total_entries,
            streams = tally.music_streams,
            tracks = tracks.len(),
            artists = artists.len(),
            days = days.len(),
            "aggregation pass complete"
        );

        Self {
            events,
            tracks,
            artists,
            albums,
            podcasts,
            days,
            years,
            tally,
        }
    }

    /// The event table bucket entries index into.
    #[must_use]
    pub fn events(&self) -> &[PlayEvent] {
        &self.events
    }

    /// The earliest-timestamped music event, if any music was played.
    #[must_use]
    pub fn first_track_event(&self) -> Option<&PlayEvent> {
        self.tally.first_track.map(|idx| &self.events[idx])
    }
}
