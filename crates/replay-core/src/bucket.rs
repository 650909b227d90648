//! Calendar-day and calendar-year buckets.
//!
//! Bucketing runs in one fixed reference zone (UTC, the zone the export
//! writes its instants in) so that bucket keys are stable regardless of
//! where the output is viewed. Buckets retain indices into the aggregate's
//! event table rather than cloning events; their nested top-N breakdowns
//! are re-derived from those entries on read, so there is no incremental
//! bookkeeping to drift out of sync.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::event::PlayEvent;

/// Human-readable day label, also the external bucket key: `May 3rd, 2024`.
///
/// Two events on the same calendar day must produce byte-identical labels,
/// which is why this is a single function and not a formatting convention.
#[must_use]
pub fn day_label(date: NaiveDate) -> String {
    let day = date.day();
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        day,
        ordinal_suffix(day),
        date.year()
    )
}

/// English ordinal suffix, with the 11th–13th exception.
const fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// A (name, count) row of a top-N breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub name: String,
    pub count: u64,
}

/// All qualifying plays on one calendar day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBucket {
    /// Qualifying plays (music and podcast) on this day.
    pub stream_count: u64,
    /// Fractional hours listened on this day.
    pub total_hours: f64,
    /// Indices into the aggregate's event table, in fold order.
    pub entries: Vec<usize>,
}

impl DayBucket {
    pub(crate) fn push(&mut self, idx: usize, event: &PlayEvent) {
        self.stream_count += 1;
        self.total_hours += event.hours();
        self.entries.push(idx);
    }

    /// Most-played tracks of the day, re-derived from the retained entries.
    #[must_use]
    pub fn top_tracks(&self, events: &[PlayEvent], limit: usize) -> Vec<CountRow> {
        ranked_counts(
            self.entries.iter().filter_map(|&i| events[i].track_name()),
            limit,
        )
    }

    /// Most-played artists of the day.
    #[must_use]
    pub fn top_artists(&self, events: &[PlayEvent], limit: usize) -> Vec<CountRow> {
        ranked_counts(
            self.entries.iter().filter_map(|&i| events[i].artist_name()),
            limit,
        )
    }

    /// Most-played shows of the day.
    #[must_use]
    pub fn top_podcasts(&self, events: &[PlayEvent], limit: usize) -> Vec<CountRow> {
        ranked_counts(
            self.entries.iter().filter_map(|&i| events[i].show_name()),
            limit,
        )
    }
}

/// All qualifying plays in one calendar year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearBucket {
    /// Qualifying music streams this year.
    pub music_stream_count: u64,
    /// Fractional hours of music this year.
    pub music_hours: f64,
    /// Tracks whose first qualifying stream in the whole corpus fell in
    /// this year (keyed by track URI, falling back to track name).
    pub music_unique_stream_count: u64,
    /// Qualifying podcast plays this year.
    pub podcast_play_count: u64,
    /// Fractional hours of podcasts this year.
    pub podcast_hours: f64,
    /// Indices into the aggregate's event table, in fold order.
    pub entries: Vec<usize>,
}

impl YearBucket {
    /// Day-level drill-down for this year, derived lazily from the retained
    /// entries. Years nobody expands never pay for day bucketing.
    #[must_use]
    pub fn day_breakdown(&self, events: &[PlayEvent]) -> BTreeMap<NaiveDate, DayBucket> {
        let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
        for &idx in &self.entries {
            let event = &events[idx];
            days.entry(event.timestamp.date_naive())
                .or_default()
                .push(idx, event);
        }
        days
    }
}

/// Counts names and returns rows sorted by count descending, ties broken by
/// first appearance, truncated to `limit`.
fn ranked_counts<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> Vec<CountRow> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for name in names {
        counts
            .entry(name)
            .and_modify(|count| *count += 1)
            .or_insert_with(|| {
                order.push(name);
                1
            });
    }

    let mut rows: Vec<CountRow> = order
        .into_iter()
        .map(|name| CountRow {
            count: counts[name],
            name: name.to_string(),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(limit);
    rows
}
