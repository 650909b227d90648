//! Per-entity running counters built by the aggregation pass.
//!
//! Entities are keyed by display name. Track and album names carry no
//! stable ID in the export, so two artists with an identically named track
//! share one `TrackStats` entry; this collision is inherited from the data
//! and documented rather than guessed away.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::rank::FirstSeen;

/// Counters for one track name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackStats {
    /// Artist of record: the artist on the earliest-timestamped event
    /// bearing this track name.
    pub artist: Option<String>,
    /// Qualifying streams.
    pub stream_count: u64,
    /// Skips, regardless of stream qualification.
    pub skip_count: u64,
    /// Playback time across qualifying streams.
    pub total_ms_played: i64,
    /// Earliest event bearing this track name.
    pub first_played_at: Option<DateTime<Utc>>,
    /// Calendar days (reference zone) on which this track was streamed.
    pub unique_days: BTreeSet<NaiveDate>,
    pub(crate) first_seen: usize,
}

/// Counters for one artist name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistStats {
    /// Qualifying streams of any track by this artist.
    pub stream_count: u64,
    /// Distinct track names ever streamed for this artist.
    pub unique_stream_count: u64,
    pub skip_count: u64,
    pub total_ms_played: i64,
    pub first_played_at: Option<DateTime<Utc>>,
    pub(crate) first_seen: usize,
}

/// Counters for one album name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumStats {
    /// Artists observed on qualifying streams of this album.
    pub artists: BTreeSet<String>,
    pub stream_count: u64,
    pub skip_count: u64,
    pub total_ms_played: i64,
    pub first_played_at: Option<DateTime<Utc>>,
    pub(crate) first_seen: usize,
}

/// Counters for one podcast show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodcastStats {
    /// Qualifying plays of any episode of this show.
    pub episode_plays: u64,
    pub total_ms_played: i64,
    pub(crate) first_seen: usize,
}

impl TrackStats {
    pub(crate) fn new(first_seen: usize) -> Self {
        Self {
            first_seen,
            ..Self::default()
        }
    }
}

impl ArtistStats {
    pub(crate) const fn new(first_seen: usize) -> Self {
        Self {
            stream_count: 0,
            unique_stream_count: 0,
            skip_count: 0,
            total_ms_played: 0,
            first_played_at: None,
            first_seen,
        }
    }
}

impl AlbumStats {
    pub(crate) fn new(first_seen: usize) -> Self {
        Self {
            first_seen,
            ..Self::default()
        }
    }
}

impl PodcastStats {
    pub(crate) const fn new(first_seen: usize) -> Self {
        Self {
            episode_plays: 0,
            total_ms_played: 0,
            first_seen,
        }
    }
}

impl FirstSeen for TrackStats {
    fn first_seen(&self) -> usize {
        self.first_seen
    }
}

impl FirstSeen for ArtistStats {
    fn first_seen(&self) -> usize {
        self.first_seen
    }
}

impl FirstSeen for AlbumStats {
    fn first_seen(&self) -> usize {
        self.first_seen
    }
}

impl FirstSeen for PodcastStats {
    fn first_seen(&self) -> usize {
        self.first_seen
    }
}
