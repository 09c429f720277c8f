// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! File-browser listing parsing.
//!
//! Storage backends return directory listings in whatever format their
//! agent produces: a JSON array of entry objects, `ls -l`-style text, or
//! bare paths one per line. Detection is first-match in that order; a
//! JSON document that does not look like a listing falls through to the
//! text parsers. Empty input is an empty listing, not an error.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub kind: FileKind,
}

/// Parse a raw listing blob into entries.
pub fn parse(raw: &str) -> Vec<FileEntry> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Some(entries) = parse_json(trimmed) {
            return entries;
        }
    }

    if looks_like_ls(trimmed) {
        return parse_ls(trimmed);
    }

    parse_paths(trimmed)
}

// --- JSON listings ---------------------------------------------------

fn parse_json(raw: &str) -> Option<Vec<FileEntry>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let array = match &value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => ["entries", "files", "items"]
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(Value::as_array)
            .cloned()?,
        _ => return None,
    };
    let entries: Vec<FileEntry> = array.iter().filter_map(entry_from_json).collect();
    // A JSON array of something else entirely is not a listing.
    if entries.is_empty() && !array.is_empty() {
        return None;
    }
    Some(entries)
}

fn entry_from_json(value: &Value) -> Option<FileEntry> {
    let obj = value.as_object()?;

    let path_field = string_field(obj, &["path", "fullPath", "full_path"]);
    let name_field = string_field(obj, &["name", "fileName", "file_name"]);
    let (name, path) = match (name_field, path_field) {
        (Some(n), Some(p)) => (n, p),
        (Some(n), None) => (n.clone(), n),
        (None, Some(p)) => (basename(&p).to_string(), p),
        (None, None) => return None,
    };

    let size = ["size", "length", "bytes"].iter().find_map(|k| {
        let v = obj.get(*k)?;
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
    });

    let kind = if ["isDir", "is_dir", "directory", "isDirectory"]
        .iter()
        .any(|k| obj.get(*k).and_then(Value::as_bool) == Some(true))
    {
        FileKind::Dir
    } else {
        match string_field(obj, &["type", "kind"]).as_deref() {
            Some("dir") | Some("directory") | Some("folder") => FileKind::Dir,
            Some("symlink") | Some("link") => FileKind::Symlink,
            _ => FileKind::File,
        }
    };

    let modified = ["modified", "mtime", "lastModified", "last_modified"]
        .iter()
        .find_map(|k| {
            let v = obj.get(*k)?;
            if let Some(epoch) = v.as_i64() {
                return DateTime::from_timestamp(epoch, 0);
            }
            v.as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
        });

    Some(FileEntry {
        name,
        path,
        size,
        modified,
        kind,
    })
}

fn string_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(|s| s.to_string())
}

// --- ls -l listings --------------------------------------------------

static LS_ROW_RE: Lazy<Regex> = Lazy::new(|| {
    // mode links owner group size month day (time|year) name [-> target]
    Regex::new(
        r"^([bcdlps-][rwxsStT-]{9})\S*\s+\d+\s+\S+\s+\S+\s+(\S+)\s+([A-Z][a-z]{2})\s+(\d{1,2})\s+(\d{2}:\d{2}|\d{4})\s+(.+)$",
    )
    .expect("ls row regex")
});

fn looks_like_ls(raw: &str) -> bool {
    raw.lines()
        .find(|l| !l.trim().is_empty() && !l.starts_with("total "))
        .is_some_and(|l| LS_ROW_RE.is_match(l))
}

fn parse_ls(raw: &str) -> Vec<FileEntry> {
    raw.lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with("total "))
        .filter_map(|line| {
            let caps = LS_ROW_RE.captures(line)?;
            let mode = &caps[1];
            let kind = match mode.as_bytes()[0] {
                b'd' => FileKind::Dir,
                b'l' => FileKind::Symlink,
                _ => FileKind::File,
            };
            let size = caps[2].parse::<u64>().ok();

            // Year-form dates carry enough to build a timestamp; the
            // time form omits the year, so we leave modified unset
            // rather than guess.
            let modified = caps[5].parse::<i32>().ok().and_then(|year| {
                let month = month_number(&caps[3])?;
                let day: u32 = caps[4].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            });

            let raw_name = caps[6].trim();
            // Symlinks render as "name -> target"; keep the name.
            let name = raw_name.split(" -> ").next().unwrap_or(raw_name).to_string();

            Some(FileEntry {
                path: name.clone(),
                name,
                size,
                modified,
                kind,
            })
        })
        .collect()
}

fn month_number(abbr: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    MONTHS.iter().position(|m| *m == abbr).map(|i| i as u32 + 1)
}

// --- bare path listings ----------------------------------------------

fn parse_paths(raw: &str) -> Vec<FileEntry> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            let is_dir = line.ends_with('/');
            let path = line.trim_end_matches('/').to_string();
            FileEntry {
                name: basename(&path).to_string(),
                path,
                size: None,
                modified: None,
                kind: if is_dir { FileKind::Dir } else { FileKind::File },
            }
        })
        .collect()
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn json_array_with_field_aliases() {
        let raw = r#"[
            {"name": "data.db", "size": 4096, "isDir": false},
            {"fileName": "backups", "directory": true},
            {"path": "/srv/logs/agent.log", "bytes": "123", "type": "file"}
        ]"#;
        let entries = parse(raw);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].size, Some(4096));
        assert_eq!(entries[1].kind, FileKind::Dir);
        assert_eq!(entries[2].name, "agent.log");
        assert_eq!(entries[2].path, "/srv/logs/agent.log");
        assert_eq!(entries[2].size, Some(123));
    }

    #[test]
    fn json_wrapped_in_entries_object() {
        let raw = r#"{"entries": [{"name": "a", "type": "dir"}], "total": 1}"#;
        let entries = parse(raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, FileKind::Dir);
    }

    #[test]
    fn json_modified_epoch_and_rfc3339() {
        let raw = r#"[
            {"name": "a", "mtime": 1767225600},
            {"name": "b", "modified": "2026-01-15T09:30:00Z"}
        ]"#;
        let entries = parse(raw);
        assert_eq!(
            entries[0].modified,
            DateTime::from_timestamp(1767225600, 0)
        );
        assert_eq!(
            entries[1].modified,
            Some(Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn non_listing_json_falls_through_to_text() {
        // A JSON array of numbers is not a listing; as text it has no
        // path separators either, so each line is a bare entry.
        let entries = parse("[1, 2, 3]");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "[1, 2, 3]");
    }

    #[test]
    fn ls_long_format() {
        let raw = "total 16\n\
                   drwxr-xr-x  3 ops ops 4096 Jan 15 09:30 backups\n\
                   -rw-r--r--  1 ops ops  123 Jan 15 2025 agent.log\n\
                   lrwxrwxrwx  1 ops ops   11 Feb  2 11:00 current -> releases/v2\n";
        let entries = parse(raw);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].kind, FileKind::Dir);
        assert_eq!(entries[0].name, "backups");
        assert_eq!(entries[0].size, Some(4096));
        assert!(entries[0].modified.is_none());

        assert_eq!(entries[1].kind, FileKind::File);
        assert_eq!(
            entries[1].modified,
            Some(Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap())
        );

        assert_eq!(entries[2].kind, FileKind::Symlink);
        assert_eq!(entries[2].name, "current");
    }

    #[test]
    fn bare_paths_with_trailing_slash_dirs() {
        let raw = "/srv/data/\n/srv/data/db.sqlite\nnotes.txt\n";
        let entries = parse(raw);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, FileKind::Dir);
        assert_eq!(entries[0].name, "data");
        assert_eq!(entries[1].kind, FileKind::File);
        assert_eq!(entries[1].name, "db.sqlite");
        assert_eq!(entries[2].path, "notes.txt");
    }

    #[test]
    fn empty_input_is_empty_listing() {
        assert!(parse("").is_empty());
        assert!(parse("   \n  ").is_empty());
        assert!(parse("[]").is_empty());
    }

    #[test]
    fn json_entries_missing_names_are_skipped() {
        let raw = r#"[{"name": "kept"}, {"size": 12}]"#;
        let entries = parse(raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "kept");
    }
}
