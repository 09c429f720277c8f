// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Remote job log parsing.
//!
//! Backend agents emit plain-text logs with a mix of timestamp formats
//! and level markers. This module structures them into [`LogEntry`]
//! records; lines that match nothing fold into the previous entry as
//! continuation text, which keeps multi-line stack traces attached to
//! the line that raised them.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub level: LogLevel,
    pub message: String,
}

// Optional leading timestamp, bracketed or bare.
static TS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[?(\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}(?:\.\d{1,9})?(?:Z|[+-]\d{2}:?\d{2})?)\]?\s*",
    )
    .expect("timestamp regex")
});

// Level token, bracketed or bare, with an optional trailing separator.
static LEVEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[?(?i)(trace|debug|info|warning|warn|error|fatal)\b\]?\s*[:\-]?\s*")
        .expect("level regex")
});

/// Parse a whole log blob into entries.
pub fn parse(text: &str) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let mut rest = line;
        let timestamp = match TS_RE.captures(rest) {
            Some(caps) => {
                let ts = parse_timestamp(&caps[1]);
                rest = &rest[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
                ts
            }
            None => None,
        };

        let level = LEVEL_RE.captures(rest).map(|caps| {
            let level = parse_level(&caps[1]);
            rest = &rest[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
            level
        });

        match (timestamp, level) {
            // No marker at all: continuation of the previous entry.
            (None, None) => match entries.last_mut() {
                Some(prev) => {
                    prev.message.push('\n');
                    prev.message.push_str(line.trim_end());
                }
                None => entries.push(LogEntry {
                    timestamp: None,
                    level: LogLevel::Info,
                    message: line.trim_end().to_string(),
                }),
            },
            (ts, level) => entries.push(LogEntry {
                timestamp: ts,
                level: level.unwrap_or(LogLevel::Info),
                message: rest.trim_end().to_string(),
            }),
        }
    }

    entries
}

/// Warnings and errors only.
pub fn errors(entries: &[LogEntry]) -> Vec<&LogEntry> {
    entries
        .iter()
        .filter(|e| e.level >= LogLevel::Warn)
        .collect()
}

fn parse_level(token: &str) -> LogLevel {
    match token.to_ascii_lowercase().as_str() {
        "trace" => LogLevel::Trace,
        "debug" => LogLevel::Debug,
        "warn" | "warning" => LogLevel::Warn,
        "error" | "fatal" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let naive = raw.replace('T', " ");
    NaiveDateTime::parse_from_str(&naive, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn plain_levels_and_messages() {
        let entries = parse("INFO starting sync\nERROR disk full\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[0].message, "starting sync");
        assert_eq!(entries[1].level, LogLevel::Error);
    }

    #[test]
    fn timestamped_bracketed_entries() {
        let entries = parse("[2026-01-15 09:30:00] [WARN] slow replica\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].timestamp,
            Some(Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap())
        );
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].message, "slow replica");
    }

    #[test]
    fn iso_timestamps_with_offset() {
        let entries = parse("2026-01-15T09:30:00+02:00 ERROR: boom\n");
        assert_eq!(
            entries[0].timestamp,
            Some(Utc.with_ymd_and_hms(2026, 1, 15, 7, 30, 0).unwrap())
        );
        assert_eq!(entries[0].level, LogLevel::Error);
        assert_eq!(entries[0].message, "boom");
    }

    #[test]
    fn timestamp_without_level_defaults_to_info() {
        let entries = parse("2026-01-15 09:30:00 checkpoint reached\n");
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[0].message, "checkpoint reached");
        assert!(entries[0].timestamp.is_some());
    }

    #[test]
    fn continuation_lines_fold_into_previous_entry() {
        let text = "ERROR task failed\n  at sync_volume (agent.rs:120)\n  at main\nINFO retrying\n";
        let entries = parse(text);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].message.contains("at sync_volume"));
        assert!(entries[0].message.contains("at main"));
        assert_eq!(entries[1].message, "retrying");
    }

    #[test]
    fn leading_continuation_becomes_info() {
        let entries = parse("no markers here at all\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert!(entries[0].timestamp.is_none());
    }

    #[test]
    fn warning_and_fatal_aliases() {
        let entries = parse("WARNING low disk\nFATAL cannot continue\n");
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[1].level, LogLevel::Error);
    }

    #[test]
    fn info_prefix_of_a_word_is_not_a_level() {
        // "Information" must not be read as an INFO marker.
        let entries = parse("INFO ok\nInformation about the run\n");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.contains("Information about the run"));
    }

    #[test]
    fn errors_filter_keeps_warn_and_error() {
        let entries = parse("INFO a\nWARN b\nERROR c\nDEBUG d\n");
        let errs = errors(&entries);
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].level, LogLevel::Warn);
        assert_eq!(errs[1].level, LogLevel::Error);
    }

    #[test]
    fn empty_input_yields_no_entries() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n  \n").is_empty());
    }
}
