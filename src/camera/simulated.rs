/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! A camera that exists only in memory.
//!
//! [`SimulatedCamera`] implements [`CameraDevice`] without hardware: settings
//! updates mutate an in-memory state, captures mint sequential file handles,
//! and downloads materialise empty files at the destination path. Every call
//! is recorded in an operation log so tests (and dry runs) can assert on the
//! exact sequence the scheduler drove.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CameraDevice, CameraSettings, DeviceError, RawFileHandle};

// ── Operation log ─────────────────────────────────────────────────────────────

/// One recorded call against the simulated body, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraOp {
    /// `update_settings` with the partial settings that were applied.
    UpdateSettings(CameraSettings),

    /// `capture_one`, with the device-side name that was minted.
    Capture { name: String },

    /// `download` of `name` to the local path `dest`.
    Download { name: String, dest: PathBuf },
}

// ── SimulatedCamera ───────────────────────────────────────────────────────────

/// In-memory [`CameraDevice`] for rehearsal and tests.
#[derive(Debug)]
pub struct SimulatedCamera {
    state: CameraSettings,
    shot_counter: u32,
    ops: Vec<CameraOp>,
}

impl SimulatedCamera {
    /// A powered-on body with plausible initial settings.
    pub fn new() -> Self {
        Self {
            state: CameraSettings {
                iso: Some("100".to_string()),
                shutter_speed: Some("1/100".to_string()),
                f_number: Some(5.6),
            },
            shot_counter: 0,
            ops: Vec::new(),
        }
    }

    /// Every call made against this body, in order.
    pub fn ops(&self) -> &[CameraOp] {
        &self.ops
    }

    /// Local paths of all downloaded files, in download order.
    pub fn downloaded(&self) -> Vec<&Path> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CameraOp::Download { dest, .. } => Some(dest.as_path()),
                _ => None,
            })
            .collect()
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDevice for SimulatedCamera {
    fn read_settings(&mut self) -> Result<CameraSettings, DeviceError> {
        Ok(self.state.clone())
    }

    fn update_settings(&mut self, settings: &CameraSettings) -> Result<(), DeviceError> {
        if let Some(iso) = &settings.iso {
            self.state.iso = Some(iso.clone());
        }
        if let Some(speed) = &settings.shutter_speed {
            self.state.shutter_speed = Some(speed.clone());
        }
        if let Some(f) = settings.f_number {
            self.state.f_number = Some(f);
        }
        debug!(?settings, "simulated settings update");
        self.ops.push(CameraOp::UpdateSettings(settings.clone()));
        Ok(())
    }

    fn capture_one(&mut self) -> Result<RawFileHandle, DeviceError> {
        self.shot_counter += 1;
        let name = format!("DSC{:05}.ARW", self.shot_counter);
        debug!(name, "simulated capture");
        self.ops.push(CameraOp::Capture { name: name.clone() });
        Ok(RawFileHandle {
            folder: "/store_00010001/DCIM/100MSDCF".to_string(),
            name,
        })
    }

    fn download(&mut self, handle: &RawFileHandle, dest: &Path) -> Result<(), DeviceError> {
        std::fs::write(dest, b"").map_err(|e| DeviceError::Download {
            name: handle.name.clone(),
            reason: e.to_string(),
        })?;
        debug!(name = %handle.name, dest = %dest.display(), "simulated download");
        self.ops.push(CameraOp::Download {
            name: handle.name.clone(),
            dest: dest.to_path_buf(),
        });
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
