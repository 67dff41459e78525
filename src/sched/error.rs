/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the capture scheduler.
//!
//! There is deliberately no retry or skip layer: the camera's state must
//! never drift from what the schedule assumes, so the first failure aborts
//! the remaining schedule rather than continuing with a body in an unknown
//! configuration. Frames already transferred stay on disk under their
//! deterministic names.

use thiserror::Error;

use crate::camera::DeviceError;

/// Top-level failure returned by
/// [`CaptureScheduler::run`](super::CaptureScheduler::run).
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A hardware call failed; the run aborts mid-schedule.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// An event's speed label is not in the camera profile — the schedule
    /// and profile disagree about the device.
    #[error("schedule speed '{speed}' is not in the camera profile")]
    UnknownSpeed { speed: String },

    /// A bracket offset walked off the end of the speed ladder.
    ///
    /// This is a fatal misconfiguration (bracket width vs baseline speed),
    /// surfaced immediately — never silently clamped, which would quietly
    /// produce duplicate exposures at the ladder edge.
    #[error(
        "bracket step {offset:+} from speed index {base_index} leaves the ladder (len {ladder_len})"
    )]
    SpeedStepOutOfRange {
        base_index: usize,
        offset: i64,
        ladder_len: usize,
    },

    /// The destination directory could not be created.
    #[error("cannot create destination directory '{path}': {reason}")]
    Destination { path: String, reason: String },
}
