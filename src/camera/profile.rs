/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Enumerated camera value ladders.
//!
//! A body exposes ISO and shutter speed as ordered lists of discrete label
//! strings; every setting the planner or scheduler ever emits must be one of
//! those labels. [`CameraProfile`] holds both ladders together with the
//! numeric value derived from each label (ISO number, speed duration in
//! seconds), so selection math and bracketing index arithmetic stay in one
//! place.
//!
//! The expected YAML structure is:
//! ```yaml
//! iso: ["100", "125", "160", "200"]
//! speeds: ["300/10", "1/100", "1/8000"]
//! ```
//!
//! Speed labels use the device's fraction notation: `"N/M"` is N/M seconds
//! (`"300/10"` = 30 s, `"1/8000"` = 125 µs). A built-in profile for the
//! Sony ⍺7R II (the body this tool was written for) is used when no file is
//! supplied.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct ProfileFile {
    iso: Vec<String>,
    speeds: Vec<String>,
}

// ── Label parsing ─────────────────────────────────────────────────────────────

/// Parse a shutter-speed label into a duration in seconds.
///
/// `"N/M"` → N/M; a plain number is taken as whole seconds. Returns `None`
/// for anything that does not parse or is not strictly positive.
pub fn parse_speed_label(label: &str) -> Option<f64> {
    let seconds = match label.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => label.trim().parse().ok()?,
    };
    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

/// Parse an ISO label (`"400"`) into its numeric value.
pub fn parse_iso_label(label: &str) -> Option<f64> {
    let value: f64 = label.trim().parse().ok()?;
    (value > 0.0).then_some(value)
}

// ── CameraProfile ─────────────────────────────────────────────────────────────

/// The discrete value sets of one camera body.
///
/// ISO labels are ordered low → high; speed labels slow → fast (index 0 is
/// the longest exposure), matching the order real bodies enumerate them.
/// Labels and their parsed numeric values are kept in parallel vectors so an
/// index into one is valid for the other.
#[derive(Debug, Clone)]
pub struct CameraProfile {
    iso_labels: Vec<String>,
    iso_numbers: Vec<f64>,
    speed_labels: Vec<String>,
    speed_seconds: Vec<f64>,
}

impl CameraProfile {
    /// Build a profile from raw label lists, deriving the numeric ladders.
    ///
    /// # Errors
    /// Fails if either list is empty or any label does not parse.
    pub fn new(iso_labels: Vec<String>, speed_labels: Vec<String>) -> Result<Self> {
        if iso_labels.is_empty() {
            bail!("camera profile has no ISO values");
        }
        if speed_labels.is_empty() {
            bail!("camera profile has no shutter-speed values");
        }

        let iso_numbers = iso_labels
            .iter()
            .map(|l| parse_iso_label(l).with_context(|| format!("invalid ISO label '{l}'")))
            .collect::<Result<Vec<f64>>>()?;

        let speed_seconds = speed_labels
            .iter()
            .map(|l| {
                parse_speed_label(l).with_context(|| format!("invalid shutter-speed label '{l}'"))
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self {
            iso_labels,
            iso_numbers,
            speed_labels,
            speed_seconds,
        })
    }

    /// Parse `path` as a YAML profile file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, or any label fails to parse.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading camera profile from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open camera profile: {}", path.display()))?;

        let file: ProfileFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let profile = Self::new(file.iso, file.speeds)
            .with_context(|| format!("Invalid camera profile: {}", path.display()))?;

        info!(
            iso_count = profile.iso_labels.len(),
            speed_count = profile.speed_labels.len(),
            "Camera profile loaded"
        );

        Ok(profile)
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    /// Index of an ISO label in the ladder.
    pub fn iso_index(&self, label: &str) -> Option<usize> {
        self.iso_labels.iter().position(|l| l == label)
    }

    /// Index of a speed label in the ladder.
    pub fn speed_index(&self, label: &str) -> Option<usize> {
        self.speed_labels.iter().position(|l| l == label)
    }

    /// ISO labels, low → high.
    pub fn iso_labels(&self) -> &[String] {
        &self.iso_labels
    }

    /// Speed labels, slow → fast.
    pub fn speed_labels(&self) -> &[String] {
        &self.speed_labels
    }

    /// Numeric ISO value at `index`.
    pub fn iso_number(&self, index: usize) -> f64 {
        self.iso_numbers[index]
    }

    /// Exposure duration in seconds at `index`.
    pub fn speed_seconds(&self, index: usize) -> f64 {
        self.speed_seconds[index]
    }

    /// Number of entries in the speed ladder.
    pub fn speed_count(&self) -> usize {
        self.speed_labels.len()
    }
}

impl Default for CameraProfile {
    /// Built-in Sony ⍺7R II ladders (third-stop steps, mechanical shutter).
    fn default() -> Self {
        let iso = [
            "50", "64", "80", "100", "125", "160", "200", "250", "320", "400", "500", "640",
            "800", "1000", "1250", "1600", "2000", "2500", "3200", "4000", "5000", "6400",
            "8000", "10000", "12800", "16000", "20000", "25600", "32000", "40000", "51200",
            "64000", "80000", "102400",
        ];
        let speeds = [
            "300/10", "250/10", "200/10", "150/10", "130/10", "100/10", "80/10", "60/10",
            "50/10", "40/10", "32/10", "25/10", "20/10", "16/10", "13/10", "10/10", "8/10",
            "6/10", "5/10", "4/10", "1/3", "1/4", "1/5", "1/6", "1/8", "1/10", "1/13", "1/15",
            "1/20", "1/25", "1/30", "1/40", "1/50", "1/60", "1/80", "1/100", "1/125", "1/160",
            "1/200", "1/250", "1/320", "1/400", "1/500", "1/640", "1/800", "1/1000", "1/1250",
            "1/1600", "1/2000", "1/2500", "1/3200", "1/4000", "1/5000", "1/6400", "1/8000",
        ];
        Self::new(
            iso.iter().map(|s| s.to_string()).collect(),
            speeds.iter().map(|s| s.to_string()).collect(),
        )
        .expect("built-in profile labels are valid")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
