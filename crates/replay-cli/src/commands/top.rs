//! The `top` command: ranked entity lists.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use replay_core::query::{self, AlbumView, ArtistView, PodcastView, TrackView};
use replay_core::{Aggregate, Metric};

use crate::cli::{By, Kind};

use super::util;

/// Runs the top command.
pub fn run(export: &Path, kind: Kind, by: By, limit: usize, json: bool) -> Result<()> {
    let (aggregate, _report) = util::load_aggregate(export)?;
    let metric = Metric::from(by);

    if json {
        let output = match kind {
            Kind::Tracks => {
                serde_json::to_string_pretty(&query::top_tracks(&aggregate, Some(limit), metric))?
            }
            Kind::Artists => {
                serde_json::to_string_pretty(&query::top_artists(&aggregate, Some(limit), metric))?
            }
            Kind::Albums => {
                serde_json::to_string_pretty(&query::top_albums(&aggregate, Some(limit), metric))?
            }
            Kind::Podcasts => {
                serde_json::to_string_pretty(&query::top_podcasts(&aggregate, Some(limit), metric))?
            }
        };
        println!("{output}");
    } else {
        print!("{}", format_top(&aggregate, kind, by, limit));
    }
    Ok(())
}

/// Formats the human-readable ranked list.
pub fn format_top(aggregate: &Aggregate, kind: Kind, by: By, limit: usize) -> String {
    let metric = Metric::from(by);
    let title = match (kind, by) {
        (Kind::Tracks, By::Streams) => "TOP TRACKS (by streams)",
        (Kind::Tracks, By::Unique) => "TOP TRACKS (by listening days)",
        (Kind::Tracks, By::Hours) => "TOP TRACKS (by hours)",
        (Kind::Artists, By::Streams) => "TOP ARTISTS (by streams)",
        (Kind::Artists, By::Unique) => "TOP ARTISTS (by distinct tracks)",
        (Kind::Artists, By::Hours) => "TOP ARTISTS (by hours)",
        (Kind::Albums, By::Streams | By::Unique) => "TOP ALBUMS (by streams)",
        (Kind::Albums, By::Hours) => "TOP ALBUMS (by hours)",
        (Kind::Podcasts, By::Streams | By::Unique) => "TOP PODCASTS (by plays)",
        (Kind::Podcasts, By::Hours) => "TOP PODCASTS (by hours)",
    };

    let mut output = util::section(title);
    let rows: Vec<String> = match kind {
        Kind::Tracks => query::top_tracks(aggregate, Some(limit), metric)
            .iter()
            .map(|view| track_row(view, by))
            .collect(),
        Kind::Artists => query::top_artists(aggregate, Some(limit), metric)
            .iter()
            .map(|view| artist_row(view, by))
            .collect(),
        Kind::Albums => query::top_albums(aggregate, Some(limit), metric)
            .iter()
            .map(|view| album_row(view, by))
            .collect(),
        Kind::Podcasts => query::top_podcasts(aggregate, Some(limit), metric)
            .iter()
            .map(|view| podcast_row(view, by))
            .collect(),
    };

    if rows.is_empty() {
        writeln!(output, "(no data)").unwrap();
        return output;
    }
    for row in rows {
        writeln!(output, "{row}").unwrap();
    }
    output
}

fn track_row(view: &TrackView, by: By) -> String {
    let name = view.artist.as_deref().map_or_else(
        || view.track.clone(),
        |artist| format!("{} - {artist}", view.track),
    );
    let value = match by {
        By::Streams => format!("{} streams", view.stream_count),
        By::Unique => format!("{} days", view.unique_day_count),
        By::Hours => util::format_ms_as_hours(view.total_ms_played),
    };
    format!("{:>3}. {name}  [{value}, {} skips]", view.rank, view.skip_count)
}

fn artist_row(view: &ArtistView, by: By) -> String {
    let value = match by {
        By::Streams => format!("{} streams", view.stream_count),
        By::Unique => format!("{} tracks", view.unique_stream_count),
        By::Hours => util::format_ms_as_hours(view.total_ms_played),
    };
    format!("{:>3}. {}  [{value}]", view.rank, view.artist)
}

fn album_row(view: &AlbumView, by: By) -> String {
    let value = match by {
        By::Streams | By::Unique => format!("{} streams", view.stream_count),
        By::Hours => util::format_ms_as_hours(view.total_ms_played),
    };
    if view.artist.is_empty() {
        format!("{:>3}. {}  [{value}]", view.rank, view.album)
    } else {
        format!("{:>3}. {} - {}  [{value}]", view.rank, view.album, view.artist)
    }
}

fn podcast_row(view: &PodcastView, by: By) -> String {
    let value = match by {
        By::Streams | By::Unique => format!("{} plays", view.episode_plays),
        By::Hours => util::format_ms_as_hours(view.total_ms_played),
    };
    format!("{:>3}. {}  [{value}]", view.rank, view.show)
}
