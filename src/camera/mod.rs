/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The camera seam: everything that touches physical hardware goes through
//! [`CameraDevice`], a four-operation trait.
//!
//! ```text
//! sched ──► CameraDevice ──► libgphoto2 / USB / whatever
//!               ▲
//!               └── SimulatedCamera (rehearsal + tests, no hardware)
//! ```
//!
//! The rest of the crate never names a concrete backend. [`CameraSettings`]
//! is a partial update — `None` fields are left untouched on the device — so
//! a bracket burst can flip only the shutter speed without re-sending ISO
//! and aperture on every frame.

pub mod profile;
pub mod simulated;

pub use profile::CameraProfile;
pub use simulated::SimulatedCamera;

use std::path::Path;

use thiserror::Error;

// ── Settings ──────────────────────────────────────────────────────────────────

/// Desired or current exposure state of the camera body.
///
/// All fields optional: `update_settings` writes only the fields that are
/// `Some`, mirroring per-key config updates on real bodies. ISO and shutter
/// speed are the device's own label strings (`"400"`, `"1/100"`, `"300/10"`)
/// drawn from the [`CameraProfile`] ladders — never free-form values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraSettings {
    /// ISO label, e.g. `"400"`.
    pub iso: Option<String>,

    /// Shutter-speed label in the device's fraction notation, e.g. `"1/100"`
    /// or `"300/10"` (= 30 s).
    pub shutter_speed: Option<String>,

    /// Aperture as an f-number, e.g. `5.6`.
    pub f_number: Option<f64>,
}

impl CameraSettings {
    /// Settings that change only the shutter speed.
    pub fn speed_only(speed: impl Into<String>) -> Self {
        Self {
            shutter_speed: Some(speed.into()),
            ..Self::default()
        }
    }
}

// ── Capture output ────────────────────────────────────────────────────────────

/// Handle to a freshly captured file still sitting on the device.
///
/// Produced by [`CameraDevice::capture_one`] and consumed by
/// [`CameraDevice::download`]; the tuple of `folder` + `name` is how the
/// device addresses its own storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileHandle {
    /// Device-side folder, e.g. `"/store_00010001/DCIM/100MSDCF"`.
    pub folder: String,

    /// Device-side file name, e.g. `"DSC01234.ARW"`.
    pub name: String,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// A hardware call failed.
///
/// Carries which operation failed and the backend's own message. There is no
/// retry layer anywhere above this — a `DeviceError` aborts the run — so the
/// variants exist for diagnosis, not for dispatch.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Reading the current settings off the body failed.
    #[error("failed to read camera settings: {0}")]
    ReadSettings(String),

    /// Writing one or more settings to the body failed.
    #[error("failed to update camera settings: {0}")]
    UpdateSettings(String),

    /// The shutter fired (or failed to) but no file handle came back.
    #[error("capture failed: {0}")]
    Capture(String),

    /// Transferring a captured file from the device to local storage failed.
    #[error("failed to download '{name}' from device: {reason}")]
    Download { name: String, reason: String },
}

// ── Device trait ──────────────────────────────────────────────────────────────

/// The narrow interface every camera backend implements.
///
/// One device handle is exclusively owned by the capture scheduler for the
/// process lifetime; all calls block the single thread.
pub trait CameraDevice {
    /// Read the body's current ISO / speed / aperture.
    fn read_settings(&mut self) -> Result<CameraSettings, DeviceError>;

    /// Write every `Some` field of `settings` to the body, leaving `None`
    /// fields unchanged.
    fn update_settings(&mut self, settings: &CameraSettings) -> Result<(), DeviceError>;

    /// Trigger a single exposure and return a handle to the resulting file
    /// on the device.
    fn capture_one(&mut self) -> Result<RawFileHandle, DeviceError>;

    /// Transfer `handle` from the device to the local path `dest`.
    fn download(&mut self, handle: &RawFileHandle, dest: &Path) -> Result<(), DeviceError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_update_nothing() {
        let s = CameraSettings::default();
        assert!(s.iso.is_none());
        assert!(s.shutter_speed.is_none());
        assert!(s.f_number.is_none());
    }

    #[test]
    fn speed_only_leaves_iso_and_aperture_unset() {
        let s = CameraSettings::speed_only("1/100");
        assert_eq!(s.shutter_speed.as_deref(), Some("1/100"));
        assert!(s.iso.is_none());
        assert!(s.f_number.is_none());
    }

    #[test]
    fn device_error_messages_name_the_operation() {
        let e = DeviceError::Download {
            name: "DSC00001.ARW".into(),
            reason: "USB timeout".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("DSC00001.ARW"));
        assert!(msg.contains("USB timeout"));
    }
}
