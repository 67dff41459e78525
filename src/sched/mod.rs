/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Capture scheduling: walking the planned events against wall-clock time.
//!
//! [`CaptureScheduler`] turns each [`ExposureEvent`] into two actions at
//! absolute trigger times:
//!
//! ```text
//! utcsec − 60   update settings (ISO + speed, aperture untouched)
//! utcsec        bracketed capture burst
//! ```
//!
//! The actions form one explicit list sorted by (trigger time, kind) —
//! settings updates win ties against bursts at the same instant so a burst
//! always sees updated settings — and a single blocking
//! wait-until-next-deadline loop executes them in order. No queue, no
//! threads; camera I/O blocks the loop and nothing else runs.
//!
//! The clock is a trait so tests (and `--dry-run`) drive the loop on virtual
//! time. A uniform debug offset shifts every trigger earlier for rehearsal
//! without changing relative order.

pub mod error;

pub use error::CaptureError;

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::camera::{CameraDevice, CameraProfile, CameraSettings};
use crate::planner::ExposureEvent;

// ── Constants ─────────────────────────────────────────────────────────────────

/// How long before each event its settings are applied, seconds.
///
/// Long enough for any body to commit a config write, short enough that the
/// previous event's burst (a few seconds) is always finished.
pub const PRE_ROLL_SECONDS: f64 = 60.0;

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Time source driving the scheduler loop, in Unix seconds.
pub trait Clock {
    /// Current time.
    fn now(&self) -> f64;

    /// Block until `deadline`; returns immediately if it already passed.
    fn sleep_until(&mut self, deadline: f64);
}

/// Real wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_secs_f64()
    }

    fn sleep_until(&mut self, deadline: f64) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(Duration::from_secs_f64(deadline - now));
        }
    }
}

/// Virtual time: `sleep_until` jumps forward instantly, never backward.
#[derive(Debug)]
pub struct VirtualClock {
    now: f64,
}

impl VirtualClock {
    pub fn starting_at(now: f64) -> Self {
        Self { now }
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn sleep_until(&mut self, deadline: f64) {
        self.now = self.now.max(deadline);
    }
}

// ── Bracketing ────────────────────────────────────────────────────────────────

/// Shape of one capture burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketConfig {
    /// Bracket `±steps` around the baseline speed.
    pub plus_minus_steps: u32,

    /// Ladder indices per bracket step.
    pub step_size: u32,

    /// Frames captured at each step.
    pub frames_per_step: u32,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            plus_minus_steps: 3,
            step_size: 1,
            frames_per_step: 1,
        }
    }
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// What a scheduled action does. Variant order is the same-instant
/// tie-break: settings must land before a burst scheduled at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ActionKind {
    UpdateSettings,
    CaptureBurst,
}

/// One (trigger-time, kind, event) tuple in the run list.
#[derive(Debug, Clone, Copy)]
struct Action {
    at: f64,
    kind: ActionKind,
    event_index: usize,
}

// ── CaptureScheduler ──────────────────────────────────────────────────────────

/// Executes a planned schedule against a camera.
///
/// Owns the device handle for the process lifetime. All per-run state is
/// local to [`run`](Self::run).
#[derive(Debug)]
pub struct CaptureScheduler<'p, C, K> {
    camera: C,
    clock: K,
    profile: &'p CameraProfile,
    dest_dir: PathBuf,
    bracket: BracketConfig,
    time_offset: f64,
}

impl<'p, C: CameraDevice, K: Clock> CaptureScheduler<'p, C, K> {
    /// New scheduler writing frames into `dest_dir`, with the default
    /// bracket and no time offset.
    pub fn new(camera: C, clock: K, profile: &'p CameraProfile, dest_dir: PathBuf) -> Self {
        Self {
            camera,
            clock,
            profile,
            dest_dir,
            bracket: BracketConfig::default(),
            time_offset: 0.0,
        }
    }

    /// Override the burst shape.
    pub fn with_bracket(mut self, bracket: BracketConfig) -> Self {
        self.bracket = bracket;
        self
    }

    /// Shift every trigger `seconds` earlier (rehearsal / debug). Relative
    /// order between actions is unaffected.
    pub fn with_time_offset(mut self, seconds: f64) -> Self {
        self.time_offset = seconds;
        self
    }

    /// Consume the scheduler, returning the camera (for post-run
    /// inspection).
    pub fn into_camera(self) -> C {
        self.camera
    }

    // ── Run loop ──────────────────────────────────────────────────────────────

    /// Execute the whole schedule in trigger-time order.
    ///
    /// # Errors
    /// The first [`CaptureError`] aborts the remaining schedule; frames
    /// already downloaded stay on disk.
    pub fn run(&mut self, events: &[ExposureEvent]) -> Result<(), CaptureError> {
        std::fs::create_dir_all(&self.dest_dir).map_err(|e| CaptureError::Destination {
            path: self.dest_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let current = self.camera.read_settings()?;
        info!(?current, "current camera settings");

        // Two actions per event, one flat list, (time, kind) order.
        let mut actions = Vec::with_capacity(events.len() * 2);
        for (event_index, event) in events.iter().enumerate() {
            let trigger = event.utcsec - self.time_offset;
            actions.push(Action {
                at: trigger - PRE_ROLL_SECONDS,
                kind: ActionKind::UpdateSettings,
                event_index,
            });
            actions.push(Action {
                at: trigger,
                kind: ActionKind::CaptureBurst,
                event_index,
            });

            info!(
                event = event_index,
                utcsec = format!("{:.2}", trigger),
                hours_away = format!("{:.2}", (trigger - self.clock.now()) / 3_600.0),
                mag = format!("{:.4}", event.umbral_mag),
                exp = format!("{:.4}", event.exp_calc),
                iso = %event.iso,
                speed = %event.speed,
                "event scheduled"
            );
        }
        actions.sort_by(|a, b| a.at.total_cmp(&b.at).then(a.kind.cmp(&b.kind)));

        info!(actions = actions.len(), "now running");
        if self.time_offset != 0.0 {
            warn!(offset_s = self.time_offset, "*** DEBUG TIME OFFSET ON ***");
        }

        for action in actions {
            self.clock.sleep_until(action.at);
            let event = &events[action.event_index];
            match action.kind {
                ActionKind::UpdateSettings => {
                    info!(
                        event = action.event_index,
                        iso = %event.iso,
                        speed = %event.speed,
                        "pre-roll settings update"
                    );
                    self.camera.update_settings(&CameraSettings {
                        iso: Some(event.iso.clone()),
                        shutter_speed: Some(event.speed.clone()),
                        f_number: None,
                    })?;
                }
                ActionKind::CaptureBurst => {
                    self.bracket_by_speed(event, action.event_index)?;
                }
            }
        }

        info!("schedule complete");
        Ok(())
    }

    // ── Bracket burst ─────────────────────────────────────────────────────────

    /// Capture one bracketed burst around `event`'s baseline speed.
    ///
    /// Scans offsets in ascending order so each bracket set is
    /// time-contiguous. Output names are
    /// `{unix-timestamp}-{step:02}-{frame:02}.arw`, with the step index
    /// counted from 0 at the lowest offset.
    fn bracket_by_speed(
        &mut self,
        event: &ExposureEvent,
        event_index: usize,
    ) -> Result<Vec<PathBuf>, CaptureError> {
        let timestamp = self.clock.now() as i64;
        info!(event = event_index, timestamp, "bracketing by speed");

        // Baseline: ISO from the event, aperture untouched; the speed is
        // written per step below.
        self.camera.update_settings(&CameraSettings {
            iso: Some(event.iso.clone()),
            ..CameraSettings::default()
        })?;

        let base_index =
            self.profile
                .speed_index(&event.speed)
                .ok_or_else(|| CaptureError::UnknownSpeed {
                    speed: event.speed.clone(),
                })?;
        let ladder_len = self.profile.speed_count();

        let steps = self.bracket.plus_minus_steps as i64;
        let step_size = self.bracket.step_size as i64;

        let mut outputs = Vec::new();
        for step in -steps..=steps {
            let offset = step * step_size;
            let index = base_index as i64 + offset;
            if index < 0 || index >= ladder_len as i64 {
                return Err(CaptureError::SpeedStepOutOfRange {
                    base_index,
                    offset,
                    ladder_len,
                });
            }

            let speed = &self.profile.speed_labels()[index as usize];
            self.camera
                .update_settings(&CameraSettings::speed_only(speed.clone()))?;
            info!(iso = %event.iso, speed = %speed, "set exposure");

            for frame in 0..self.bracket.frames_per_step {
                let handle = self.camera.capture_one()?;
                info!(captured = %handle.name);

                let name = format!("{timestamp}-{:02}-{:02}.arw", step + steps, frame);
                let target = self.dest_dir.join(name);
                info!(target = %target.display(), "transferring");
                self.camera.download(&handle, &target)?;
                outputs.push(target);
            }
        }

        Ok(outputs)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::simulated::CameraOp;
    use crate::camera::{DeviceError, RawFileHandle, SimulatedCamera};
    use std::path::Path;

    fn profile() -> CameraProfile {
        CameraProfile::new(
            vec!["100".into(), "400".into(), "1600".into()],
            vec![
                "10/10".into(),
                "5/10".into(),
                "1/4".into(),
                "1/8".into(),
                "1/15".into(),
            ],
        )
        .unwrap()
    }

    fn event(utcsec: f64, iso: &str, speed: &str) -> ExposureEvent {
        ExposureEvent {
            utcsec,
            umbral_mag: 0.5,
            exp_calc: 5.0,
            iso: iso.into(),
            speed: speed.into(),
            exp_set: 5.0,
        }
    }

    /// File names (no directory) of everything downloaded, in order.
    fn downloaded_names(camera: &SimulatedCamera) -> Vec<String> {
        camera
            .downloaded()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    // ── Clocks ────────────────────────────────────────────────────────────────

    #[test]
    fn virtual_clock_never_runs_backward() {
        let mut clock = VirtualClock::starting_at(100.0);
        clock.sleep_until(150.0);
        assert_eq!(clock.now(), 150.0);
        clock.sleep_until(120.0); // already passed
        assert_eq!(clock.now(), 150.0);
    }

    // ── Bracket burst ─────────────────────────────────────────────────────────

    #[test]
    fn burst_produces_step_contiguous_deterministic_names() {
        let dir = tempfile::tempdir().unwrap();
        let p = profile();
        let clock = VirtualClock::starting_at(1_700_000_000.0 - 100.0);
        let mut sched = CaptureScheduler::new(
            SimulatedCamera::new(),
            clock,
            &p,
            dir.path().to_path_buf(),
        )
        .with_bracket(BracketConfig {
            plus_minus_steps: 1,
            step_size: 1,
            frames_per_step: 2,
        });

        // baseline "1/4" = ladder index 2, so ±1 stays inside
        sched
            .run(&[event(1_700_000_000.0, "400", "1/4")])
            .unwrap();

        let camera = sched.into_camera();
        assert_eq!(
            downloaded_names(&camera),
            vec![
                "1700000000-00-00.arw",
                "1700000000-00-01.arw",
                "1700000000-01-00.arw",
                "1700000000-01-01.arw",
                "1700000000-02-00.arw",
                "1700000000-02-01.arw",
            ],
            "3 steps × 2 frames, step-major, ascending"
        );

        // exactly three per-step speed changes, in ascending ladder order
        let speed_changes: Vec<&str> = camera
            .ops()
            .iter()
            .filter_map(|op| match op {
                CameraOp::UpdateSettings(s) if s.iso.is_none() => s.shutter_speed.as_deref(),
                _ => None,
            })
            .collect();
        assert_eq!(speed_changes, vec!["5/10", "1/4", "1/8"]);
    }

    #[test]
    fn bracket_walking_off_the_ladder_is_fatal_not_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let p = profile();
        let clock = VirtualClock::starting_at(0.0);
        let mut sched = CaptureScheduler::new(
            SimulatedCamera::new(),
            clock,
            &p,
            dir.path().to_path_buf(),
        )
        .with_bracket(BracketConfig {
            plus_minus_steps: 1,
            step_size: 1,
            frames_per_step: 1,
        });

        // baseline "10/10" is ladder index 0: −1 leaves the ladder
        let err = sched.run(&[event(100.0, "100", "10/10")]).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::SpeedStepOutOfRange {
                base_index: 0,
                offset: -1,
                ..
            }
        ));

        // nothing was captured before the range check
        let camera = sched.into_camera();
        assert!(downloaded_names(&camera).is_empty());
    }

    #[test]
    fn schedule_speed_missing_from_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = profile();
        let mut sched = CaptureScheduler::new(
            SimulatedCamera::new(),
            VirtualClock::starting_at(0.0),
            &p,
            dir.path().to_path_buf(),
        );
        let err = sched.run(&[event(100.0, "100", "1/8000")]).unwrap_err();
        assert!(matches!(err, CaptureError::UnknownSpeed { .. }));
    }

    // ── Ordering ──────────────────────────────────────────────────────────────

    /// Indices into the op log of one event's pre-roll and burst start.
    /// A pre-roll is the only update carrying both ISO and speed; a burst
    /// opens with an ISO-only baseline update.
    fn marker_indices(camera: &SimulatedCamera, iso: &str) -> (usize, usize) {
        let preroll = camera
            .ops()
            .iter()
            .position(|op| {
                matches!(op, CameraOp::UpdateSettings(s)
                    if s.iso.as_deref() == Some(iso) && s.shutter_speed.is_some())
            })
            .unwrap();
        let burst = camera
            .ops()
            .iter()
            .position(|op| {
                matches!(op, CameraOp::UpdateSettings(s)
                    if s.iso.as_deref() == Some(iso) && s.shutter_speed.is_none())
            })
            .unwrap();
        (preroll, burst)
    }

    #[test]
    fn events_one_second_apart_fire_in_strict_chronological_order() {
        for offset in [0.0, 3_600.0] {
            let dir = tempfile::tempdir().unwrap();
            let p = profile();
            let t0 = 10_000.0;
            let mut sched = CaptureScheduler::new(
                SimulatedCamera::new(),
                VirtualClock::starting_at(0.0),
                &p,
                dir.path().to_path_buf(),
            )
            .with_bracket(BracketConfig {
                plus_minus_steps: 1,
                step_size: 1,
                frames_per_step: 1,
            })
            .with_time_offset(offset);

            sched
                .run(&[event(t0, "100", "1/4"), event(t0 + 1.0, "400", "1/4")])
                .unwrap();

            let camera = sched.into_camera();
            let (preroll_a, burst_a) = marker_indices(&camera, "100");
            let (preroll_b, burst_b) = marker_indices(&camera, "400");
            assert!(
                preroll_a < preroll_b && preroll_b < burst_a && burst_a < burst_b,
                "expected preroll₁ < preroll₂ < burst₁ < burst₂ (offset {offset}), got \
                 {preroll_a}, {preroll_b}, {burst_a}, {burst_b}"
            );
        }
    }

    #[test]
    fn same_instant_tie_breaks_settings_before_burst() {
        // Event B's pre-roll lands exactly on event A's burst time; the
        // pre-roll must execute first.
        let dir = tempfile::tempdir().unwrap();
        let p = profile();
        let t0 = 10_000.0;
        let mut sched = CaptureScheduler::new(
            SimulatedCamera::new(),
            VirtualClock::starting_at(0.0),
            &p,
            dir.path().to_path_buf(),
        )
        .with_bracket(BracketConfig {
            plus_minus_steps: 0,
            step_size: 1,
            frames_per_step: 1,
        });

        sched
            .run(&[
                event(t0, "100", "1/4"),
                event(t0 + PRE_ROLL_SECONDS, "400", "1/4"),
            ])
            .unwrap();

        let camera = sched.into_camera();
        let (_, burst_a) = marker_indices(&camera, "100");
        let (preroll_b, _) = marker_indices(&camera, "400");
        assert!(
            preroll_b < burst_a,
            "settings update must precede a burst at the same instant"
        );
    }

    // ── Failure semantics ─────────────────────────────────────────────────────

    /// Camera whose shutter is broken: settings work, captures fail.
    struct BrokenShutter(SimulatedCamera);

    impl CameraDevice for BrokenShutter {
        fn read_settings(&mut self) -> Result<CameraSettings, DeviceError> {
            self.0.read_settings()
        }
        fn update_settings(&mut self, s: &CameraSettings) -> Result<(), DeviceError> {
            self.0.update_settings(s)
        }
        fn capture_one(&mut self) -> Result<RawFileHandle, DeviceError> {
            Err(DeviceError::Capture("shutter jammed".into()))
        }
        fn download(&mut self, h: &RawFileHandle, d: &Path) -> Result<(), DeviceError> {
            self.0.download(h, d)
        }
    }

    #[test]
    fn device_failure_aborts_the_remaining_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let p = profile();
        let mut sched = CaptureScheduler::new(
            BrokenShutter(SimulatedCamera::new()),
            VirtualClock::starting_at(0.0),
            &p,
            dir.path().to_path_buf(),
        )
        .with_bracket(BracketConfig {
            plus_minus_steps: 0,
            step_size: 1,
            frames_per_step: 1,
        });

        let err = sched
            .run(&[event(100.0, "100", "1/4"), event(200.0, "400", "1/4")])
            .unwrap_err();
        assert!(matches!(err, CaptureError::Device(DeviceError::Capture(_))));

        // the second event never got its pre-roll: the run stopped at the
        // first failure instead of skipping ahead
        let camera = sched.into_camera().0;
        let saw_second_preroll = camera.ops().iter().any(|op| {
            matches!(op, CameraOp::UpdateSettings(s) if s.iso.as_deref() == Some("400"))
        });
        assert!(!saw_second_preroll);
    }
}
