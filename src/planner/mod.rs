/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Exposure planning: eclipse geometry → ordered event schedule.
//!
//! The umbral magnitude over time is a closed-form geometric approximation,
//! not an ephemeris integration. With the moon crossing the shadow at
//! constant angular speed `v`, offset `c` from the umbra axis at
//! mid-eclipse, the moon–umbra separation and eclipse magnitude are:
//!
//! ```text
//! W(t) = sqrt(c² + (v·t)²)              t relative to mid-eclipse
//! M(t) = (R − (W(t) − d/2)) / d         R umbral radius, d lunar diameter
//! ```
//!
//! `W` depends on `t²` only, so `M` is symmetric about mid-eclipse. Sample
//! times are expressed relative to mid-eclipse for numerical stability —
//! Unix-epoch seconds squared would eat most of an f64's mantissa.
//!
//! The planner maps each sample's magnitude through the brightness curve,
//! snaps the result to the exposure table, and emits the ordered
//! [`ExposureEvent`] list. The persisted JSON form of that list is the
//! handoff contract to the capture scheduler.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::exposure::{BrightnessCurve, ExposureError, ExposureTable, SelectionOptions};

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Physical constants of one eclipse, all angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseGeometry {
    /// Angular speed of the moon relative to the umbra, deg/s.
    pub angular_speed: f64,

    /// Minimum moon-centre distance from the umbra axis, deg.
    pub axis: f64,

    /// Umbral radius, deg.
    pub umbral_radius: f64,

    /// Lunar angular diameter, deg.
    pub lunar_diameter: f64,
}

impl Default for EclipseGeometry {
    /// Parameters of the 2019-01-21 total eclipse.
    fn default() -> Self {
        Self {
            angular_speed: 0.592517818551461 / 3600.0,
            axis: 0.37625696,
            umbral_radius: 0.7634,
            lunar_diameter: 0.5568,
        }
    }
}

impl EclipseGeometry {
    /// Moon-umbra angular separation at `t` seconds from mid-eclipse.
    pub fn separation(&self, t: f64) -> f64 {
        let drift = self.angular_speed * t;
        (self.axis * self.axis + drift * drift).sqrt()
    }

    /// Umbral magnitude at `t` seconds from mid-eclipse: how deep the moon's
    /// leading edge sits inside the umbra, in lunar diameters. Exceeds 1
    /// during totality, goes negative outside the partial phases.
    pub fn magnitude(&self, t: f64) -> f64 {
        (self.umbral_radius - (self.separation(t) - self.lunar_diameter / 2.0))
            / self.lunar_diameter
    }
}

// ── Contact times ─────────────────────────────────────────────────────────────

/// The five umbral contact timestamps, Unix seconds UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactTimes {
    /// First umbral contact (partial phase begins).
    pub u1: f64,
    /// Second contact (totality begins).
    pub u2: f64,
    /// Mid-eclipse.
    pub mid: f64,
    /// Third contact (totality ends).
    pub u3: f64,
    /// Fourth contact (partial phase ends).
    pub u4: f64,
}

// ── ExposureEvent ─────────────────────────────────────────────────────────────

/// One scheduled exposure: when to shoot and with what.
///
/// Field names are the persisted JSON contract — do not rename. `exp_calc`
/// is the brightness target the curve asked for; `exp_set` is the score of
/// the table entry actually chosen (within tolerance of each other by
/// construction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureEvent {
    /// Trigger time, Unix seconds UTC.
    pub utcsec: f64,

    /// Computed umbral magnitude at the trigger time.
    pub umbral_mag: f64,

    /// Target brightness `Q` from the curve, log₂ EV.
    pub exp_calc: f64,

    /// Selected ISO label.
    pub iso: String,

    /// Selected shutter-speed label, fraction notation.
    pub speed: String,

    /// Score of the selected ISO/speed/f-number combination.
    pub exp_set: f64,
}

// ── Planner ───────────────────────────────────────────────────────────────────

/// Produces the ordered exposure schedule for one eclipse.
#[derive(Debug, Clone)]
pub struct Planner {
    pub geometry: EclipseGeometry,
    pub contacts: ContactTimes,
    pub curve: BrightnessCurve,

    /// How many exposure events to spread across the eclipse.
    pub samples: usize,

    /// Extension before U1 and after U4, seconds.
    pub pad_seconds: f64,
}

impl Planner {
    /// Compute the ordered event list.
    ///
    /// Events are evenly spaced over `[U1 − pad, U4 + pad]`. Each sample's
    /// magnitude runs through the brightness curve and the result snaps to
    /// the closest enumerated combination in `table`.
    ///
    /// # Errors
    /// Propagates [`ExposureError::NoMatch`] when a sample's brightness has
    /// no in-tolerance combination — the configured ranges do not cover the
    /// eclipse and planning aborts with no partial schedule.
    ///
    /// # Panics
    /// Panics if `samples < 2`; a schedule needs at least both endpoints.
    pub fn plan(
        &self,
        table: &ExposureTable,
        opts: &SelectionOptions,
    ) -> Result<Vec<ExposureEvent>, ExposureError> {
        assert!(self.samples >= 2, "at least two sample times are required");

        // Sample axis relative to mid-eclipse.
        let start = self.contacts.u1 - self.pad_seconds - self.contacts.mid;
        let end = self.contacts.u4 + self.pad_seconds - self.contacts.mid;
        let step_div = (self.samples - 1) as f64;

        info!(
            samples = self.samples,
            start_utc = start + self.contacts.mid,
            end_utc = end + self.contacts.mid,
            "planning exposure schedule"
        );

        let mut events = Vec::with_capacity(self.samples);
        for i in 0..self.samples {
            let t = start + (end - start) * i as f64 / step_div;
            let mag = self.geometry.magnitude(t);
            let target = self.curve.stops_for(mag);
            let entry = table.best(target, opts)?;

            info!(
                utcsec = format!("{:.2}", t + self.contacts.mid),
                mag = format!("{:.4}", mag),
                exp = format!("{:.4}", target),
                iso = %entry.iso,
                speed = %entry.speed,
                q = format!("{:.4}", entry.score),
                "event planned"
            );

            events.push(ExposureEvent {
                utcsec: t + self.contacts.mid,
                umbral_mag: mag,
                exp_calc: target,
                iso: entry.iso.clone(),
                speed: entry.speed.clone(),
                exp_set: entry.score,
            });
        }

        Ok(events)
    }
}

// ── Schedule persistence ──────────────────────────────────────────────────────

/// Write `events` to `path` as the JSON schedule file, order preserved.
pub fn save_schedule(path: &Path, events: &[ExposureEvent]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create schedule file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, events)
        .with_context(|| format!("Failed to write schedule: {}", path.display()))?;
    info!(events = events.len(), path = %path.display(), "schedule saved");
    Ok(())
}

/// Read an ordered event list back from `path`.
pub fn load_schedule(path: &Path) -> Result<Vec<ExposureEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open schedule file: {}", path.display()))?;
    let events: Vec<ExposureEvent> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse schedule: {}", path.display()))?;
    debug!(events = events.len(), "schedule loaded");
    Ok(events)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
