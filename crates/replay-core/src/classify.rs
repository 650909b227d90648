//! Derived per-event flags: stream qualification, skips, shuffle eligibility.

use crate::event::{PlayEvent, PlayKind};

/// Minimum playback for an event to count as a stream.
///
/// Load-bearing for every stream-count statistic: shorter plays still count
/// toward entry totals, listening time, and skips, but never toward streams.
pub const STREAM_THRESHOLD_MS: i64 = 30_000;

/// End-reason codes that indicate a manual skip.
///
/// Used only when the record predates the explicit `skipped` flag.
pub const SKIP_REASONS: [&str; 4] = ["backbtn", "fwdbtn", "endplay", "unknown"];

impl PlayEvent {
    /// Whether this is a music event.
    #[must_use]
    pub const fn is_music(&self) -> bool {
        matches!(self.kind, PlayKind::Music { .. })
    }

    /// Whether this is a podcast event.
    #[must_use]
    pub const fn is_podcast(&self) -> bool {
        matches!(self.kind, PlayKind::Podcast { .. })
    }

    /// Whether playback lasted long enough to qualify as a stream.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        self.ms_played >= STREAM_THRESHOLD_MS
    }

    /// Whether the play counts as a skip.
    ///
    /// The source-reported flag wins when present. Older export versions
    /// omit it, so classification falls back to end-reason codes there.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        match self.skipped {
            Some(flag) => flag,
            None => self
                .reason_end
                .as_deref()
                .is_some_and(|reason| SKIP_REASONS.contains(&reason)),
        }
    }

    /// Whether the event participates in the shuffle-percentage statistic:
    /// qualifying music streams only.
    #[must_use]
    pub const fn is_shuffle_eligible(&self) -> bool {
        self.is_stream() && self.is_music()
    }

    /// Playback duration in fractional hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        self.ms_played as f64 / 3_600_000.0
    }
}
