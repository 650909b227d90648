//! Export loading: the filesystem and archive boundary of the engine.
//!
//! An export arrives either as a directory of JSON files or as a ZIP
//! archive of them. This crate discovers the member files, filters out the
//! junk real exports contain (macOS resource forks, `__MACOSX` folders,
//! non-JSON files), ingests duplicate files once, parses files in parallel,
//! and hands the core a flat, deterministic event sequence.
//!
//! Loading is lenient per file and per record: a malformed member file or a
//! record with an unparseable timestamp is counted and skipped, never fatal
//! to the batch. Hard I/O and archive errors abort with context.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

use replay_core::{PlayEvent, RawRecord};

/// How deep nested archives are followed. Real exports occasionally wrap
/// the per-year archive in an outer one; anything deeper is garbage.
const MAX_ARCHIVE_DEPTH: u32 = 2;

/// Errors that abort loading an export.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("export path does not exist: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read archive {}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Diagnostics from one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// JSON files parsed into records.
    pub files_read: usize,
    /// JSON files skipped (unreadable or not a record array).
    pub files_skipped: usize,
    /// Files ignored because an identical file was already ingested.
    pub duplicate_files: usize,
    /// Records successfully normalized into events.
    pub records: usize,
    /// Records dropped by the parser.
    pub dropped_records: usize,
}

/// The event sequence of one export, plus diagnostics.
#[derive(Debug)]
pub struct LoadedExport {
    pub events: Vec<PlayEvent>,
    pub report: IngestReport,
}

/// Loads an export from a directory or a `.zip` archive.
pub fn load_export(path: &Path) -> Result<LoadedExport, IngestError> {
    if !path.exists() {
        return Err(IngestError::Missing(path.to_path_buf()));
    }
    if path.is_file() && has_extension(path, "zip") {
        load_zip(path)
    } else {
        load_dir(path)
    }
}

/// Loads every JSON member file under `dir`.
pub fn load_dir(dir: &Path) -> Result<LoadedExport, IngestError> {
    let mut report = IngestReport::default();

    // Read and deduplicate sequentially in sorted path order so the event
    // sequence (and which copy of a duplicate wins) is deterministic.
    let mut seen_digests: HashSet<[u8; 32]> = HashSet::new();
    let mut pending: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    for path in discover_json_files(dir) {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable file");
                report.files_skipped += 1;
                continue;
            }
        };
        if !seen_digests.insert(Sha256::digest(&bytes).into()) {
            tracing::debug!(path = %path.display(), "skipping duplicate file");
            report.duplicate_files += 1;
            continue;
        }
        pending.push((path, bytes));
    }

    // Parse files in parallel; collect() preserves input order.
    let parsed: Vec<Option<(Vec<PlayEvent>, usize)>> = pending
        .par_iter()
        .map(|(path, bytes)| {
            tracing::debug!(path = %path.display(), "parsing");
            match parse_records(bytes) {
                Ok(result) => Some(result),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping non-record file");
                    None
                }
            }
        })
        .collect();

    let mut events = Vec::new();
    for file in parsed {
        match file {
            Some((file_events, dropped)) => {
                report.files_read += 1;
                report.records += file_events.len();
                report.dropped_records += dropped;
                events.extend(file_events);
            }
            None => report.files_skipped += 1,
        }
    }

    tracing::debug!(
        files = report.files_read,
        records = report.records,
        dropped = report.dropped_records,
        duplicates = report.duplicate_files,
        "export loaded"
    );
    Ok(LoadedExport { events, report })
}

/// Extracts a ZIP export to a temporary directory and loads it.
pub fn load_zip(path: &Path) -> Result<LoadedExport, IngestError> {
    let dir = tempfile::tempdir().map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_archive(path, dir.path(), 0)?;
    load_dir(dir.path())
}

/// All `.json` files under `dir` worth parsing, in sorted path order.
fn discover_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| has_extension(path, "json") && !is_resource_fork(path))
        .collect();
    files.sort();
    files
}

/// Parses one member file: a JSON array of raw records. Returns the
/// normalized events and how many records the parser dropped.
fn parse_records(bytes: &[u8]) -> Result<(Vec<PlayEvent>, usize), serde_json::Error> {
    let raws: Vec<RawRecord> = serde_json::from_slice(bytes)?;
    let mut events = Vec::with_capacity(raws.len());
    let mut dropped = 0;
    for raw in raws {
        match PlayEvent::from_raw(raw) {
            Ok(event) => events.push(event),
            Err(err) => {
                tracing::debug!(%err, "dropping record");
                dropped += 1;
            }
        }
    }
    Ok((events, dropped))
}

fn io_fail(path: &Path, source: io::Error) -> IngestError {
    IngestError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn archive_fail(path: &Path, source: zip::result::ZipError) -> IngestError {
    IngestError::Archive {
        path: path.to_path_buf(),
        source,
    }
}

fn extract_archive(path: &Path, dest: &Path, depth: u32) -> Result<(), IngestError> {
    let file = File::open(path).map_err(|source| io_fail(path, source))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| archive_fail(path, source))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|source| archive_fail(path, source))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if is_junk_member(&name) {
            continue;
        }
        let Some(relative) = sanitize_member_path(&name) else {
            tracing::warn!(member = %name, "skipping archive member with unsafe path");
            continue;
        };
        let nested = has_extension(&relative, "zip");
        if !nested && !has_extension(&relative, "json") {
            continue;
        }

        let out_path = dest.join(&relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| io_fail(&out_path, source))?;
        }
        let mut out = File::create(&out_path).map_err(|source| io_fail(&out_path, source))?;
        io::copy(&mut entry, &mut out).map_err(|source| io_fail(&out_path, source))?;
        drop(out);

        if nested {
            if depth + 1 < MAX_ARCHIVE_DEPTH {
                let nested_dest = out_path.with_extension("unpacked");
                std::fs::create_dir_all(&nested_dest)
                    .map_err(|source| io_fail(&nested_dest, source))?;
                extract_archive(&out_path, &nested_dest, depth + 1)?;
            } else {
                tracing::warn!(member = %name, "nested archive too deep, ignoring");
            }
            // The inner archive itself is not a member file to parse.
            let _ = std::fs::remove_file(&out_path);
        }
    }
    Ok(())
}

/// macOS archive utilities leave resource forks next to the real files.
fn is_resource_fork(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("._"))
}

fn is_junk_member(name: &str) -> bool {
    if name.starts_with("__MACOSX") {
        return true;
    }
    name.rsplit(['/', '\\'])
        .next()
        .is_some_and(|file| file.starts_with("._"))
}

/// Rebuilds a member path from its components, rejecting traversal.
fn sanitize_member_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in name.replace('\\', "/").split('/') {
        if component.is_empty() || component == "." {
            continue;
        }
        if component == ".." || component.contains('\0') {
            return None;
        }
        path.push(component);
    }
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::TempDir;

    const TWO_RECORDS: &str = r#"[
        {
            "ts": "2024-05-03T12:00:00Z",
            "ms_played": 45000,
            "master_metadata_track_name": "A",
            "master_metadata_album_artist_name": "X"
        },
        {
            "ts": "2024-05-03T13:00:00Z",
            "ms_played": 120000,
            "episode_name": "P1",
            "episode_show_name": "S"
        }
    ]"#;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_directory_of_json_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "Streaming_History_Audio_2024.json", TWO_RECORDS);

        let loaded = load_dir(dir.path()).unwrap();
        assert_eq!(loaded.events.len(), 2);
        assert_eq!(loaded.report.files_read, 1);
        assert_eq!(loaded.report.records, 2);
        assert_eq!(loaded.report.dropped_records, 0);
    }

    #[test]
    fn files_load_in_sorted_path_order() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "b.json",
            r#"[{"ts": "2020-01-01T00:00:00Z", "ms_played": 1, "master_metadata_track_name": "FromB"}]"#,
        );
        write_file(
            dir.path(),
            "a.json",
            r#"[{"ts": "2021-01-01T00:00:00Z", "ms_played": 1, "master_metadata_track_name": "FromA"}]"#,
        );

        let loaded = load_dir(dir.path()).unwrap();
        assert_eq!(loaded.events[0].track_name(), Some("FromA"));
        assert_eq!(loaded.events[1].track_name(), Some("FromB"));
    }

    #[test]
    fn duplicate_files_are_ingested_once() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.json", TWO_RECORDS);
        write_file(dir.path(), "a_copy.json", TWO_RECORDS);

        let loaded = load_dir(dir.path()).unwrap();
        assert_eq!(loaded.events.len(), 2);
        assert_eq!(loaded.report.duplicate_files, 1);
        assert_eq!(loaded.report.files_read, 1);
    }

    #[test]
    fn junk_and_non_json_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "._Streaming_History.json", TWO_RECORDS);
        write_file(dir.path(), "ReadMeFirst.pdf", "not json");
        write_file(dir.path(), "real.json", TWO_RECORDS);

        let loaded = load_dir(dir.path()).unwrap();
        assert_eq!(loaded.report.files_read, 1);
        // Ignored files are not "skipped"; they were never candidates.
        assert_eq!(loaded.report.files_skipped, 0);
        assert_eq!(loaded.events.len(), 2);
    }

    #[test]
    fn malformed_member_file_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "bad.json", r#"{"not": "an array"}"#);
        write_file(dir.path(), "good.json", TWO_RECORDS);

        let loaded = load_dir(dir.path()).unwrap();
        assert_eq!(loaded.report.files_skipped, 1);
        assert_eq!(loaded.report.files_read, 1);
        assert_eq!(loaded.events.len(), 2);
    }

    #[test]
    fn bad_records_are_dropped_and_counted() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "partial.json",
            r#"[
                {"ts": "garbage", "ms_played": 1000, "master_metadata_track_name": "Bad"},
                {"ms_played": 1000},
                {"ts": "2024-05-03T12:00:00Z", "ms_played": 45000, "master_metadata_track_name": "Good"}
            ]"#,
        );

        let loaded = load_dir(dir.path()).unwrap();
        assert_eq!(loaded.report.dropped_records, 2);
        assert_eq!(loaded.report.records, 1);
        assert_eq!(loaded.events[0].track_name(), Some("Good"));
    }

    #[test]
    fn empty_directory_loads_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = load_dir(dir.path()).unwrap();
        assert!(loaded.events.is_empty());
        assert_eq!(loaded.report, IngestReport::default());
    }

    #[test]
    fn missing_path_errors() {
        let err = load_export(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, IngestError::Missing(_)));
    }

    fn build_zip(path: &Path, members: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, contents) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn zip_loading_matches_directory_loading() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("export.zip");
        build_zip(
            &zip_path,
            &[
                ("MyData/history.json", TWO_RECORDS.as_bytes()),
                ("__MACOSX/MyData/._history.json", b"junk"),
                ("MyData/._hidden.json", b"junk"),
                ("MyData/ReadMeFirst.pdf", b"not json"),
            ],
        );

        let loaded = load_export(&zip_path).unwrap();
        assert_eq!(loaded.events.len(), 2);
        assert_eq!(loaded.report.files_read, 1);
    }

    #[test]
    fn zip_traversal_members_are_rejected() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("evil.zip");
        build_zip(&zip_path, &[("../evil.json", TWO_RECORDS.as_bytes())]);

        let loaded = load_export(&zip_path).unwrap();
        assert!(loaded.events.is_empty());
        assert_eq!(loaded.report.files_read, 0);
    }

    #[test]
    fn nested_archives_are_unpacked_one_level() {
        let dir = TempDir::new().unwrap();
        let inner_path = dir.path().join("inner.zip");
        build_zip(&inner_path, &[("history.json", TWO_RECORDS.as_bytes())]);
        let inner_bytes = std::fs::read(&inner_path).unwrap();

        let outer_path = dir.path().join("outer.zip");
        build_zip(&outer_path, &[("inner.zip", &inner_bytes)]);

        let loaded = load_export(&outer_path).unwrap();
        assert_eq!(loaded.events.len(), 2);
    }

    #[test]
    fn sanitize_member_path_cases() {
        assert_eq!(
            sanitize_member_path("a/b/c.json"),
            Some(PathBuf::from("a/b/c.json"))
        );
        assert_eq!(
            sanitize_member_path("a//./b.json"),
            Some(PathBuf::from("a/b.json"))
        );
        assert_eq!(sanitize_member_path("../evil.json"), None);
        assert_eq!(sanitize_member_path("a/../evil.json"), None);
        assert_eq!(sanitize_member_path(""), None);
    }
}
