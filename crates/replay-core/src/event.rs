//! Raw export records and the canonical play event.
//!
//! A streaming-history export is a set of JSON files, each holding an array
//! of play records. Music and podcast records carry different field sets,
//! and the export schema has changed across versions (the older account-data
//! dump uses `endTime`/`trackName`/`msPlayed`, the extended dump uses
//! `ts`/`master_metadata_*`/`ms_played`). [`RawRecord`] accepts both;
//! [`PlayEvent`] is the single canonical shape everything downstream
//! consumes.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Failure to turn a raw record into a [`PlayEvent`].
///
/// Parse failures are per-record: the caller drops the record, counts it,
/// and moves on. They never abort a batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The record carried no timestamp field at all.
    #[error("record has no timestamp")]
    MissingTimestamp,

    /// The timestamp field was present but unparseable.
    #[error("unparseable timestamp: {0}")]
    BadTimestamp(String),

    /// Neither music nor podcast identity fields were present.
    #[error("record matches neither music nor podcast shape")]
    UnrecognizedShape,
}

/// One record as it appears in an export file.
///
/// Every field is optional: the export format is null-heavy and
/// occasionally inconsistent, so leniency lives here and strictness lives
/// in [`PlayEvent::from_raw`]. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "endTime")]
    pub ts: Option<String>,
    pub platform: Option<String>,
    #[serde(alias = "msPlayed")]
    pub ms_played: Option<i64>,
    pub conn_country: Option<String>,
    #[serde(alias = "trackName")]
    pub master_metadata_track_name: Option<String>,
    #[serde(alias = "artistName")]
    pub master_metadata_album_artist_name: Option<String>,
    #[serde(alias = "albumName")]
    pub master_metadata_album_album_name: Option<String>,
    pub spotify_track_uri: Option<String>,
    pub episode_name: Option<String>,
    pub episode_show_name: Option<String>,
    pub spotify_episode_uri: Option<String>,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
    pub shuffle: Option<bool>,
    pub skipped: Option<bool>,
    pub offline: Option<bool>,
    pub incognito_mode: Option<bool>,
}

/// What was played: a music track or a podcast episode.
///
/// Exactly one identity is populated per event; the aggregator never has to
/// probe an untyped bag of optional keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayKind {
    /// A music play. At least one of `track`/`artist` is present.
    Music {
        track: Option<String>,
        artist: Option<String>,
        album: Option<String>,
        track_uri: Option<String>,
    },
    /// A podcast play. At least one of `episode`/`show` is present.
    Podcast {
        episode: Option<String>,
        show: Option<String>,
        episode_uri: Option<String>,
    },
}

/// One normalized play event.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    /// When playback ended, as an absolute instant.
    pub timestamp: DateTime<Utc>,
    /// Milliseconds of playback. Missing or negative source values are 0.
    pub ms_played: i64,
    pub platform: Option<String>,
    pub country: Option<String>,
    /// Whether shuffle was on. Absent in old exports, treated as false.
    pub shuffle: bool,
    /// Source-reported skip flag. `None` on export versions predating it;
    /// classification falls back to end-reason codes in that case.
    pub skipped: Option<bool>,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
    pub offline: bool,
    pub incognito: bool,
    pub kind: PlayKind,
}

impl PlayEvent {
    /// Normalizes one raw record, or reports why it must be dropped.
    pub fn from_raw(raw: RawRecord) -> Result<Self, ParseError> {
        let track = non_empty(raw.master_metadata_track_name);
        let artist = non_empty(raw.master_metadata_album_artist_name);
        let album = non_empty(raw.master_metadata_album_album_name);
        let episode = non_empty(raw.episode_name);
        let show = non_empty(raw.episode_show_name);

        let kind = if track.is_some() || artist.is_some() {
            PlayKind::Music {
                track,
                artist,
                album,
                track_uri: non_empty(raw.spotify_track_uri),
            }
        } else if episode.is_some() || show.is_some() {
            PlayKind::Podcast {
                episode,
                show,
                episode_uri: non_empty(raw.spotify_episode_uri),
            }
        } else {
            return Err(ParseError::UnrecognizedShape);
        };

        let ts = non_empty(raw.ts).ok_or(ParseError::MissingTimestamp)?;
        let timestamp = parse_timestamp(&ts).ok_or(ParseError::BadTimestamp(ts))?;

        Ok(Self {
            timestamp,
            ms_played: raw.ms_played.unwrap_or(0).max(0),
            platform: non_empty(raw.platform),
            country: non_empty(raw.conn_country),
            shuffle: raw.shuffle.unwrap_or(false),
            skipped: raw.skipped,
            reason_start: non_empty(raw.reason_start),
            reason_end: non_empty(raw.reason_end),
            offline: raw.offline.unwrap_or(false),
            incognito: raw.incognito_mode.unwrap_or(false),
            kind,
        })
    }

    /// Track name, if this is a music event with one.
    #[must_use]
    pub fn track_name(&self) -> Option<&str> {
        match &self.kind {
            PlayKind::Music { track, .. } => track.as_deref(),
            PlayKind::Podcast { .. } => None,
        }
    }

    /// Artist name, if this is a music event with one.
    #[must_use]
    pub fn artist_name(&self) -> Option<&str> {
        match &self.kind {
            PlayKind::Music { artist, .. } => artist.as_deref(),
            PlayKind::Podcast { .. } => None,
        }
    }

    /// Album name, if this is a music event with one.
    #[must_use]
    pub fn album_name(&self) -> Option<&str> {
        match &self.kind {
            PlayKind::Music { album, .. } => album.as_deref(),
            PlayKind::Podcast { .. } => None,
        }
    }

    /// Track URI, if this is a music event with one.
    #[must_use]
    pub fn track_uri(&self) -> Option<&str> {
        match &self.kind {
            PlayKind::Music { track_uri, .. } => track_uri.as_deref(),
            PlayKind::Podcast { .. } => None,
        }
    }

    /// Show name, if this is a podcast event with one.
    #[must_use]
    pub fn show_name(&self) -> Option<&str> {
        match &self.kind {
            PlayKind::Music { .. } => None,
            PlayKind::Podcast { show, .. } => show.as_deref(),
        }
    }

    /// Episode name, if this is a podcast event with one.
    #[must_use]
    pub fn episode_name(&self) -> Option<&str> {
        match &self.kind {
            PlayKind::Music { .. } => None,
            PlayKind::Podcast { episode, .. } => episode.as_deref(),
        }
    }
}

/// Parses both timestamp shapes the export has used: RFC 3339 instants
/// (`2024-05-03T12:34:56Z`) and the older minute-resolution local form
/// (`2016-01-04 17:44`), which the export wrote in UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// The export writes missing strings as null, but empty strings show up in
/// partially-recovered files too; both mean "absent".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
