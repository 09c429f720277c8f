// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Progress extraction from job log lines.
//!
//! Backend jobs report progress as free text: percentages (`42%`),
//! step counters (`step 3 of 7`, `[3/7]`), and ETA hints
//! (`eta: 4m30s`, `ETA 00:02:10`). [`parse_line`] pulls whatever is
//! present out of one line; [`track`] scans a stream and keeps the most
//! recent report.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    /// Explicit percentage, clamped to `0..=100`.
    pub percent: Option<f32>,
    /// `(current, total)` step counter.
    pub step: Option<(u64, u64)>,
    pub eta: Option<Duration>,
}

impl Progress {
    fn is_empty(&self) -> bool {
        self.percent.is_none() && self.step.is_none() && self.eta.is_none()
    }

    /// Completion ratio in `0.0..=1.0`, preferring the explicit
    /// percentage over the step counter.
    pub fn ratio(&self) -> Option<f32> {
        if let Some(pct) = self.percent {
            return Some(pct / 100.0);
        }
        match self.step {
            Some((_, 0)) | None => None,
            Some((cur, total)) => Some((cur as f32 / total as f32).clamp(0.0, 1.0)),
        }
    }
}

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*%").expect("percent regex"));

static STEP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:step\s+)?\[?(\d+)\s*(?:/|of)\s*(\d+)\]?").expect("step regex")
});

static ETA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)eta[:\s]\s*(\d{1,2}:\d{2}(?::\d{2})?|(?:\d+\s*h\s*)?(?:\d+\s*m(?:in)?\s*)?(?:\d+\s*s(?:ec)?)?)")
        .expect("eta regex")
});

/// Extract progress from one line. `None` when the line carries no
/// progress markers at all.
pub fn parse_line(line: &str) -> Option<Progress> {
    let mut progress = Progress::default();

    if let Some(caps) = PERCENT_RE.captures(line) {
        if let Ok(pct) = caps[1].parse::<f32>() {
            progress.percent = Some(pct.clamp(0.0, 100.0));
        }
    }

    // A percent match like "42.5%" also matches the step pattern as
    // "42/5"; only take a step counter when no percent was found.
    if progress.percent.is_none() {
        if let Some(caps) = STEP_RE.captures(line) {
            let cur = caps[1].parse::<u64>().ok()?;
            let total = caps[2].parse::<u64>().ok()?;
            if total > 0 && cur <= total {
                progress.step = Some((cur, total));
            }
        }
    }

    if let Some(caps) = ETA_RE.captures(line) {
        progress.eta = parse_duration(caps[1].trim());
    }

    if progress.is_empty() {
        None
    } else {
        Some(progress)
    }
}

/// Latest progress across a line stream (by appearance order).
pub fn track<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<Progress> {
    lines.into_iter().filter_map(parse_line).last()
}

static HMS_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(h|min|m|sec|s)").expect("duration token regex"));

fn parse_duration(raw: &str) -> Option<Duration> {
    if raw.is_empty() {
        return None;
    }

    // Clock form: "MM:SS" or "HH:MM:SS".
    if raw.contains(':') {
        let parts: Vec<&str> = raw.split(':').collect();
        let nums: Option<Vec<u64>> = parts.iter().map(|p| p.parse().ok()).collect();
        let nums = nums?;
        let secs = match nums.as_slice() {
            [m, s] => m * 60 + s,
            [h, m, s] => h * 3600 + m * 60 + s,
            _ => return None,
        };
        return Some(Duration::from_secs(secs));
    }

    // Token form: "1h 4m 30s", "4m30s", "270s".
    let mut secs = 0u64;
    let mut matched = false;
    for caps in HMS_TOKEN_RE.captures_iter(&raw.to_ascii_lowercase()) {
        let value: u64 = caps[1].parse().ok()?;
        secs += match &caps[2] {
            "h" => value * 3600,
            "m" | "min" => value * 60,
            _ => value,
        };
        matched = true;
    }
    matched.then(|| Duration::from_secs(secs))
}
