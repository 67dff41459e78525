/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Umbra – lunar-eclipse photography planner and capture scheduler.
//!
//! Two components, used at different times:
//!
//! ```text
//! lib.rs
//! ├── config/       – YAML plan configuration (contacts, geometry, ranges)
//! ├── camera/       – device trait, settings, value ladders, simulated body
//! ├── exposure/     – brightness curve + ISO×speed exposure table
//! ├── planner/      – eclipse geometry → ordered ExposureEvent schedule
//! └── sched/        – wall-clock action loop + bracketed capture bursts
//! ```
//!
//! Data flows one direction:
//!
//! ```text
//! planner ──(schedule.json)──► sched ──(CameraDevice)──► hardware
//! ```
//!
//! The planner runs days before the eclipse and persists its result; the
//! scheduler replays that file on the night, so the JSON schedule is the
//! contract between the two halves.

pub mod camera;
pub mod config;
pub mod exposure;
pub mod planner;
pub mod sched;
