/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Eclipse magnitude → brightness adjustment.
//!
//! The moon's surface brightness across an eclipse is tabulated, not
//! modelled: a short reference table of (umbral magnitude, stop adjustment)
//! pairs, interpolated smoothly in between. The default table follows
//! F. Espenak's lunar-eclipse exposure guide; the last pair sits at
//! magnitude 1.2 inside totality, and queries beyond the table domain are
//! extrapolated from the nearest window — callers must tolerate
//! extrapolated values at deep totality.
//!
//! Interpolation is a local three-point Lagrange quadratic over the knot
//! window containing the query, which passes through every knot exactly and
//! is continuous across segments.

use super::error::ExposureError;

// ── Quadratic kernel ──────────────────────────────────────────────────────────

/// Lagrange quadratic through three points, evaluated at `x`.
fn lagrange3(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), x: f64) -> f64 {
    let (x0, y0) = p0;
    let (x1, y1) = p1;
    let (x2, y2) = p2;
    y0 * (x - x1) * (x - x2) / ((x0 - x1) * (x0 - x2))
        + y1 * (x - x0) * (x - x2) / ((x1 - x0) * (x1 - x2))
        + y2 * (x - x0) * (x - x1) / ((x2 - x0) * (x2 - x1))
}

// ── BrightnessCurve ───────────────────────────────────────────────────────────

/// Monotonic reference table of (magnitude, stop-adjustment) pairs with
/// quadratic interpolation.
///
/// The stop adjustment is the brightness target `Q` handed to the exposure
/// table: the number of stops of light the scene delivers relative to the
/// table's EV reference.
#[derive(Debug, Clone)]
pub struct BrightnessCurve {
    /// Knots ordered by strictly increasing magnitude.
    points: Vec<(f64, f64)>,
}

impl BrightnessCurve {
    /// Build a curve from `(magnitude, stops)` pairs.
    ///
    /// # Errors
    /// * [`ExposureError::CurveTooShort`] – fewer than three points.
    /// * [`ExposureError::CurveNotMonotonic`] – magnitudes not strictly
    ///   increasing.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, ExposureError> {
        if points.len() < 3 {
            return Err(ExposureError::CurveTooShort(points.len()));
        }
        for (i, w) in points.windows(2).enumerate() {
            if w[1].0 <= w[0].0 {
                return Err(ExposureError::CurveNotMonotonic(i + 1));
            }
        }
        Ok(Self { points })
    }

    /// Stop adjustment for umbral magnitude `mag`.
    ///
    /// Inside the table domain this interpolates; outside it extrapolates
    /// the end window's quadratic.
    pub fn stops_for(&self, mag: f64) -> f64 {
        let n = self.points.len();

        // Segment containing mag (clamped to the end segments for
        // extrapolation), then the three-knot window around it.
        let upper = self.points.partition_point(|p| p.0 <= mag);
        let segment = upper.saturating_sub(1).min(n - 2);
        let w = if segment == 0 { 0 } else { (segment - 1).min(n - 3) };

        lagrange3(self.points[w], self.points[w + 1], self.points[w + 2], mag)
    }

    /// The knots this curve was built from.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

impl Default for BrightnessCurve {
    /// Espenak's lunar-eclipse exposure guide.
    fn default() -> Self {
        Self {
            points: vec![
                (0.0, 7.0),
                (0.3, 6.0),
                (0.6, 5.0),
                (0.8, 4.0),
                (0.9, 3.0),
                (0.95, 2.0),
                (1.2, -7.0),
            ],
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
