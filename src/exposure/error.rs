/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for exposure planning.
//!
//! Everything here is fatal to planning: the planner either produces a full
//! schedule or nothing. There is no partial schedule — a gap in the event
//! list would silently lose a phase of the eclipse.

use thiserror::Error;

/// Failure while building the exposure table, the brightness curve, or
/// selecting a setting for a target brightness.
#[derive(Debug, Error)]
pub enum ExposureError {
    /// A range endpoint names an ISO label the camera profile does not have.
    #[error("ISO '{0}' is not in the camera profile")]
    UnknownIso(String),

    /// A range endpoint names a speed label the camera profile does not have.
    #[error("shutter speed '{0}' is not in the camera profile")]
    UnknownSpeed(String),

    /// A range's endpoints are in the wrong ladder order.
    #[error("range '{low}'..'{high}' is reversed in the {ladder} ladder")]
    ReversedRange {
        ladder: &'static str,
        low: String,
        high: String,
    },

    /// No ISO × speed combination lands within `tolerance` stops of the
    /// target brightness.
    ///
    /// Carries the target so the caller can report *which* sample time of
    /// the eclipse cannot be covered by the configured ranges.
    #[error(
        "cannot find optimal exposure: no combination within {tolerance} stops of Q={target:.4}"
    )]
    NoMatch { target: f64, tolerance: f64 },

    /// The brightness curve needs at least three points for quadratic
    /// interpolation.
    #[error("brightness curve has {0} points, need at least 3")]
    CurveTooShort(usize),

    /// Brightness-curve magnitudes must be strictly increasing.
    #[error("brightness curve magnitudes are not strictly increasing at index {0}")]
    CurveNotMonotonic(usize),
}
