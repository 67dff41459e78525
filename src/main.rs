/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use umbra::camera::{CameraDevice, CameraProfile, CameraSettings, SimulatedCamera};
use umbra::config::PlanConfig;
use umbra::exposure::ExposureTable;
use umbra::planner::{load_schedule, save_schedule};
use umbra::sched::{
    BracketConfig, CaptureScheduler, SystemClock, VirtualClock, PRE_ROLL_SECONDS,
};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Lunar-eclipse exposure planner and capture scheduler.
///
/// Example:
///   umbra plan -c demos/eclipse_2019.yaml -o schedule.json
///   umbra run  -s schedule.json -d captures --dry-run
#[derive(Debug, Parser)]
#[command(
    name = "umbra",
    about = "Lunar-eclipse exposure planner and capture scheduler",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute an exposure schedule and write it to a JSON file.
    Plan {
        /// Path to the YAML plan configuration (contacts, geometry, exposure ranges).
        #[arg(short = 'c', long = "config")]
        config: PathBuf,

        /// Path to a YAML camera profile; omit for the built-in Sony ⍺7R II ladders.
        #[arg(short = 'p', long = "profile")]
        profile: Option<PathBuf>,

        /// Output path for the JSON schedule.
        #[arg(short = 'o', long = "output", default_value = "schedule.json")]
        output: PathBuf,
    },

    /// Walk a JSON schedule against the clock, driving the camera.
    Run {
        /// Path to the JSON schedule produced by `plan`.
        #[arg(short = 's', long = "schedule")]
        schedule: PathBuf,

        /// Path to a YAML camera profile; omit for the built-in Sony ⍺7R II ladders.
        #[arg(short = 'p', long = "profile")]
        profile: Option<PathBuf>,

        /// Directory that receives the downloaded frames.
        #[arg(short = 'd', long = "dest", default_value = "captures")]
        dest: PathBuf,

        /// Seconds subtracted from every event time (rehearse a past schedule "now").
        #[arg(short = 't', long = "time-offset", default_value_t = 0.0)]
        time_offset: f64,

        /// Run against a virtual clock that never sleeps (finishes instantly).
        #[arg(long = "dry-run", default_value_t = false)]
        dry_run: bool,

        /// Bracket half-width: capture at speed indices −N..=+N around each event.
        #[arg(long = "steps", default_value_t = 3)]
        steps: u32,

        /// Ladder indices between neighbouring bracket steps.
        #[arg(long = "step-size", default_value_t = 1)]
        step_size: u32,

        /// Frames captured at each bracket step.
        #[arg(long = "frames-per-step", default_value_t = 1)]
        frames_per_step: u32,
    },

    /// Exercise every ISO and shutter-speed setting the profile declares.
    Check {
        /// Path to a YAML camera profile; omit for the built-in Sony ⍺7R II ladders.
        #[arg(short = 'p', long = "profile")]
        profile: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Plan {
            config,
            profile,
            output,
        } => cmd_plan(&config, profile.as_deref(), &output),
        Command::Run {
            schedule,
            profile,
            dest,
            time_offset,
            dry_run,
            steps,
            step_size,
            frames_per_step,
        } => cmd_run(
            &schedule,
            profile.as_deref(),
            dest,
            time_offset,
            dry_run,
            BracketConfig {
                plus_minus_steps: steps,
                step_size,
                frames_per_step,
            },
        ),
        Command::Check { profile } => cmd_check(profile.as_deref()),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn load_profile(path: Option<&std::path::Path>) -> Result<CameraProfile> {
    match path {
        Some(p) => {
            info!("Loading camera profile from: {}", p.display());
            CameraProfile::load_from_file(p)
        }
        None => {
            info!("No camera profile provided, using built-in ladders");
            Ok(CameraProfile::default())
        }
    }
}

fn cmd_plan(
    config: &std::path::Path,
    profile: Option<&std::path::Path>,
    output: &std::path::Path,
) -> Result<()> {
    let cfg = PlanConfig::load_from_file(config)?;
    let profile = load_profile(profile)?;

    let table = ExposureTable::build(
        &profile,
        (&cfg.iso_range.0, &cfg.iso_range.1),
        (&cfg.speed_range.0, &cfg.speed_range.1),
        cfg.f_number,
    )
    .context("cannot build the exposure table")?;

    let events = cfg
        .planner
        .plan(&table, &cfg.selection)
        .context("planning failed")?;

    save_schedule(output, &events)?;
    info!(
        events = events.len(),
        output = %output.display(),
        "schedule written"
    );
    Ok(())
}

fn cmd_run(
    schedule: &std::path::Path,
    profile: Option<&std::path::Path>,
    dest: PathBuf,
    time_offset: f64,
    dry_run: bool,
    bracket: BracketConfig,
) -> Result<()> {
    let profile = load_profile(profile)?;
    let events = load_schedule(schedule)?;
    if events.is_empty() {
        warn!("schedule is empty, nothing to capture");
        return Ok(());
    }

    info!(
        events = events.len(),
        dest = %dest.display(),
        time_offset,
        dry_run,
        "starting capture run"
    );

    let camera = SimulatedCamera::new();
    if dry_run {
        // Start the virtual clock just before the first action so the whole
        // run replays without a single real sleep.
        let first = events[0].utcsec - time_offset - PRE_ROLL_SECONDS;
        let clock = VirtualClock::starting_at(first);
        CaptureScheduler::new(camera, clock, &profile, dest)
            .with_bracket(bracket)
            .with_time_offset(time_offset)
            .run(&events)?;
    } else {
        CaptureScheduler::new(camera, SystemClock, &profile, dest)
            .with_bracket(bracket)
            .with_time_offset(time_offset)
            .run(&events)?;
    }

    info!("capture run finished");
    Ok(())
}

/// Step through every ISO and speed label, confirming the body accepts and
/// reports each one. Catches profile/firmware mismatches before eclipse night.
///
/// Until a hardware backend implements [`CameraDevice`], this drives the
/// simulated body, whose readback succeeds by construction — the walk
/// exercises the profile and the call sequence, not a real shutter.
fn cmd_check(profile: Option<&std::path::Path>) -> Result<()> {
    let profile = load_profile(profile)?;
    let mut camera = SimulatedCamera::new();

    info!(
        isos = profile.iso_labels().len(),
        speeds = profile.speed_labels().len(),
        "checking every profile setting against the camera"
    );

    for iso in profile.iso_labels() {
        camera.update_settings(&CameraSettings {
            iso: Some(iso.clone()),
            shutter_speed: None,
            f_number: None,
        })?;
        let read_back = camera.read_settings()?;
        if read_back.iso.as_deref() != Some(iso.as_str()) {
            return Err(anyhow!(
                "camera reports ISO {:?} after setting '{iso}'",
                read_back.iso
            ));
        }
    }

    for speed in profile.speed_labels() {
        camera.update_settings(&CameraSettings::speed_only(speed.clone()))?;
        let read_back = camera.read_settings()?;
        if read_back.shutter_speed.as_deref() != Some(speed.as_str()) {
            return Err(anyhow!(
                "camera reports speed {:?} after setting '{speed}'",
                read_back.shutter_speed
            ));
        }
    }

    info!("every profile setting round-tripped through the camera");
    Ok(())
}
