/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Plan configuration loading.
//!
//! One YAML file describes everything the planner needs for one eclipse:
//! contact times, shadow geometry, sampling, and the exposure search space.
//! Only `contacts` is mandatory — every other section falls back to the
//! defaults baked in for the 2019-01-21 eclipse and the built-in camera
//! profile's usual ranges.
//!
//! The expected YAML structure is:
//! ```yaml
//! contacts:
//!   u1:  "2019-01-21 03:33:54"
//!   u2:  "2019-01-21 04:41:17"
//!   mid: "2019-01-21 05:12:16"
//!   u3:  "2019-01-21 05:43:16"
//!   u4:  "2019-01-21 06:50:39"
//! geometry:
//!   angular_speed_deg_per_hour: 0.592517818551461
//!   axis_deg: 0.37625696
//!   umbral_radius_deg: 0.7634
//!   lunar_diameter_deg: 0.5568
//! samples: 29
//! pad_seconds: 300
//! exposure:
//!   iso_range: ["100", "6400"]
//!   speed_range: ["300/10", "1/8000"]
//!   f_number: 5.6
//!   tolerance: 0.3
//!   max_candidates: 36
//!   iso_penalty_scale: 0.875
//!   speed_penalty_scale: 2.0
//! brightness_curve:
//!   - [0.0, 7.0]
//!   - [0.6, 5.0]
//!   - [1.2, -7.0]
//! ```
//!
//! All timestamps are UTC in `"YYYY-MM-DD HH:MM:SS"` form.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::info;

use crate::exposure::{BrightnessCurve, SelectionOptions};
use crate::planner::{ContactTimes, EclipseGeometry, Planner};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private – callers work with [`PlanConfig`] instead.
#[derive(Debug, Deserialize)]
struct PlanFile {
    contacts: ContactsEntry,
    #[serde(default)]
    geometry: GeometryEntry,
    #[serde(default = "default_samples")]
    samples: usize,
    #[serde(default = "default_pad_seconds")]
    pad_seconds: f64,
    #[serde(default)]
    exposure: ExposureEntry,
    /// Optional override of the built-in Espenak brightness table.
    brightness_curve: Option<Vec<(f64, f64)>>,
}

#[derive(Debug, Deserialize)]
struct ContactsEntry {
    u1: String,
    u2: String,
    mid: String,
    u3: String,
    u4: String,
}

#[derive(Debug, Deserialize)]
struct GeometryEntry {
    #[serde(default = "default_angular_speed")]
    angular_speed_deg_per_hour: f64,
    #[serde(default = "default_axis")]
    axis_deg: f64,
    #[serde(default = "default_umbral_radius")]
    umbral_radius_deg: f64,
    #[serde(default = "default_lunar_diameter")]
    lunar_diameter_deg: f64,
}

#[derive(Debug, Deserialize)]
struct ExposureEntry {
    #[serde(default = "default_iso_range")]
    iso_range: [String; 2],
    #[serde(default = "default_speed_range")]
    speed_range: [String; 2],
    #[serde(default = "default_f_number")]
    f_number: f64,
    #[serde(default = "default_tolerance")]
    tolerance: f64,
    #[serde(default = "default_max_candidates")]
    max_candidates: usize,
    #[serde(default = "default_iso_penalty_scale")]
    iso_penalty_scale: f64,
    #[serde(default = "default_speed_penalty_scale")]
    speed_penalty_scale: f64,
}

// Serde defaults. The geometry values are the 2019-01-21 eclipse; the
// selection knobs mirror SelectionOptions::default().

fn default_samples() -> usize {
    29
}
fn default_pad_seconds() -> f64 {
    300.0
}
fn default_angular_speed() -> f64 {
    0.592517818551461
}
fn default_axis() -> f64 {
    0.37625696
}
fn default_umbral_radius() -> f64 {
    0.7634
}
fn default_lunar_diameter() -> f64 {
    0.5568
}
fn default_iso_range() -> [String; 2] {
    ["100".to_string(), "6400".to_string()]
}
fn default_speed_range() -> [String; 2] {
    ["300/10".to_string(), "1/8000".to_string()]
}
fn default_f_number() -> f64 {
    5.6
}
fn default_tolerance() -> f64 {
    SelectionOptions::default().tolerance
}
fn default_max_candidates() -> usize {
    SelectionOptions::default().max_candidates
}
fn default_iso_penalty_scale() -> f64 {
    SelectionOptions::default().iso_penalty_scale
}
fn default_speed_penalty_scale() -> f64 {
    SelectionOptions::default().speed_penalty_scale
}

impl Default for GeometryEntry {
    fn default() -> Self {
        Self {
            angular_speed_deg_per_hour: default_angular_speed(),
            axis_deg: default_axis(),
            umbral_radius_deg: default_umbral_radius(),
            lunar_diameter_deg: default_lunar_diameter(),
        }
    }
}

impl Default for ExposureEntry {
    fn default() -> Self {
        Self {
            iso_range: default_iso_range(),
            speed_range: default_speed_range(),
            f_number: default_f_number(),
            tolerance: default_tolerance(),
            max_candidates: default_max_candidates(),
            iso_penalty_scale: default_iso_penalty_scale(),
            speed_penalty_scale: default_speed_penalty_scale(),
        }
    }
}

// ── PlanConfig ────────────────────────────────────────────────────────────────

/// Fully validated plan configuration.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    /// The planner, ready to run against an exposure table.
    pub planner: Planner,

    /// Inclusive ISO range labels (low, high).
    pub iso_range: (String, String),

    /// Inclusive speed range labels (slow, fast).
    pub speed_range: (String, String),

    /// Fixed aperture for the exposure table.
    pub f_number: f64,

    /// Candidate-selection knobs.
    pub selection: SelectionOptions,
}

impl PlanConfig {
    /// Parse and validate `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, a timestamp does not parse, the contacts are
    /// out of order, the sample count is below 2, or a custom brightness
    /// curve is malformed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading plan configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open plan configuration: {}", path.display()))?;

        let file: PlanFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let contacts = ContactTimes {
            u1: parse_contact(&file.contacts.u1).context("contact u1")?,
            u2: parse_contact(&file.contacts.u2).context("contact u2")?,
            mid: parse_contact(&file.contacts.mid).context("contact mid")?,
            u3: parse_contact(&file.contacts.u3).context("contact u3")?,
            u4: parse_contact(&file.contacts.u4).context("contact u4")?,
        };
        let ordered = [
            contacts.u1,
            contacts.u2,
            contacts.mid,
            contacts.u3,
            contacts.u4,
        ];
        if ordered.windows(2).any(|w| w[0] >= w[1]) {
            bail!("contact times must be strictly ordered u1 < u2 < mid < u3 < u4");
        }

        if file.samples < 2 {
            bail!("samples must be at least 2, got {}", file.samples);
        }

        let curve = match file.brightness_curve {
            Some(points) => BrightnessCurve::new(points).context("invalid brightness_curve")?,
            None => BrightnessCurve::default(),
        };

        let geometry = EclipseGeometry {
            angular_speed: file.geometry.angular_speed_deg_per_hour / 3_600.0,
            axis: file.geometry.axis_deg,
            umbral_radius: file.geometry.umbral_radius_deg,
            lunar_diameter: file.geometry.lunar_diameter_deg,
        };

        let [iso_lo, iso_hi] = file.exposure.iso_range;
        let [speed_lo, speed_hi] = file.exposure.speed_range;

        let config = Self {
            planner: Planner {
                geometry,
                contacts,
                curve,
                samples: file.samples,
                pad_seconds: file.pad_seconds,
            },
            iso_range: (iso_lo, iso_hi),
            speed_range: (speed_lo, speed_hi),
            f_number: file.exposure.f_number,
            selection: SelectionOptions {
                max_candidates: file.exposure.max_candidates,
                tolerance: file.exposure.tolerance,
                iso_penalty_scale: file.exposure.iso_penalty_scale,
                speed_penalty_scale: file.exposure.speed_penalty_scale,
            },
        };

        info!(
            samples = config.planner.samples,
            pad_seconds = config.planner.pad_seconds,
            iso_range = ?config.iso_range,
            speed_range = ?config.speed_range,
            f_number = config.f_number,
            "plan configuration loaded"
        );

        Ok(config)
    }
}

/// Parse a `"YYYY-MM-DD HH:MM:SS"` UTC timestamp into Unix seconds.
fn parse_contact(s: &str) -> Result<f64> {
    let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("invalid UTC timestamp '{s}' (want YYYY-MM-DD HH:MM:SS)"))?;
    Ok(dt.and_utc().timestamp() as f64)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
