//! Core domain logic for the streaming-history statistics engine.
//!
//! This crate contains the fundamental types and logic for:
//! - Parsing: normalizing raw export records into canonical play events
//! - Classification: deriving stream/skip/shuffle flags from fixed thresholds
//! - Aggregation: one deterministic pass folding events into entity counters
//!   and calendar buckets
//! - Ranking and summarizing: read-side views over the frozen aggregate
//!
//! The engine itself performs no I/O; the `replay-ingest` crate produces the
//! event collection this crate consumes.

pub mod aggregate;
pub mod bucket;
pub mod classify;
pub mod event;
pub mod query;
pub mod rank;
pub mod stats;
pub mod summary;

pub use aggregate::{Aggregate, Tally};
pub use bucket::{CountRow, DayBucket, YearBucket, day_label};
pub use classify::{SKIP_REASONS, STREAM_THRESHOLD_MS};
pub use event::{ParseError, PlayEvent, PlayKind, RawRecord};
pub use rank::{FirstSeen, Metric, Ranked, top_n};
pub use summary::{FirstTrack, GeneralStats, TimeSpent, general_stats};
