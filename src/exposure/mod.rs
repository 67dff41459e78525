/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Exposure table construction and candidate selection.
//!
//! [`ExposureTable`] is the precomputed cross-product of the allowed
//! ISO × shutter-speed combinations at a fixed aperture, each scored in
//! log₂ EV. It is an explicit immutable value built once by the planner and
//! passed to the selection function — there is no shared global.
//!
//! Scoring (per the mreclipse.com exposure guide):
//!
//! ```text
//! Q = log₂( f² / (ISO · t) )
//! ```
//!
//! Brighter scenes have higher `Q`; a one-stop change in any of the three
//! controls moves `Q` by exactly 1.
//!
//! Selection ranks entries by distance from the target `Q`, keeps the
//! closest few within a hard tolerance, then breaks ties with a weighted
//! penalty that prefers low ISO (noise) and speeds near the fast end of the
//! configured range (less motion blur; `speed_offset` is 0 at the fast end
//! and grows in magnitude toward the slow end). The penalty weights fit one
//! particular
//! body and lens and carry no derivation — they are configuration, not
//! physics.

pub mod curve;
pub mod error;

pub use curve::BrightnessCurve;
pub use error::ExposureError;

use tracing::debug;

use crate::camera::CameraProfile;

// ── Selection options ─────────────────────────────────────────────────────────

/// Tunable knobs for [`ExposureTable::best`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionOptions {
    /// How many closest-by-score entries survive the first ranking pass.
    pub max_candidates: usize,

    /// Hard cap on `|score − target|`, in stops. Entries beyond this never
    /// win, no matter their penalty.
    pub tolerance: f64,

    /// Penalty divisor for distance from the low-ISO end of the range.
    pub iso_penalty_scale: f64,

    /// Penalty divisor for distance from the fast end of the speed range.
    pub speed_penalty_scale: f64,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            max_candidates: 36,
            tolerance: 0.3,
            iso_penalty_scale: 0.875,
            speed_penalty_scale: 2.0,
        }
    }
}

// ── Table entries ─────────────────────────────────────────────────────────────

/// One ISO × speed combination at the table's fixed aperture.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureEntry {
    /// Brightness score `Q` in log₂ EV.
    pub score: f64,

    /// Index of `iso` in the profile's ISO ladder.
    pub iso_index: usize,

    /// Index of `speed` in the profile's speed ladder.
    pub speed_index: usize,

    /// ISO label, e.g. `"400"`.
    pub iso: String,

    /// Speed label, e.g. `"1/100"`.
    pub speed: String,

    /// Steps above the low-ISO end of the configured range (≥ 0).
    pub iso_offset: i64,

    /// Steps below the fast end of the configured speed range (≤ 0).
    pub speed_offset: i64,
}

impl ExposureEntry {
    /// Weighted tie-break penalty; lower is better.
    fn penalty(&self, opts: &SelectionOptions) -> f64 {
        let iso = self.iso_offset as f64 / opts.iso_penalty_scale;
        let speed = self.speed_offset as f64 / opts.speed_penalty_scale;
        iso * iso + speed * speed
    }
}

// ── ExposureTable ─────────────────────────────────────────────────────────────

/// Sorted, read-only cross-product of the allowed exposure combinations.
#[derive(Debug, Clone)]
pub struct ExposureTable {
    entries: Vec<ExposureEntry>,
    f_number: f64,
}

impl ExposureTable {
    /// Build the table for the inclusive ISO range `iso_range` and speed
    /// range `speed_range` (both as `(low-end label, high-end label)` in
    /// ladder order: low → high ISO, slow → fast speed) at aperture
    /// `f_number`.
    ///
    /// # Errors
    /// * [`ExposureError::UnknownIso`] / [`ExposureError::UnknownSpeed`] –
    ///   an endpoint label is not in the profile ladder.
    /// * [`ExposureError::ReversedRange`] – endpoints are in the wrong
    ///   ladder order.
    pub fn build(
        profile: &CameraProfile,
        iso_range: (&str, &str),
        speed_range: (&str, &str),
        f_number: f64,
    ) -> Result<Self, ExposureError> {
        let iso_lo = profile
            .iso_index(iso_range.0)
            .ok_or_else(|| ExposureError::UnknownIso(iso_range.0.to_string()))?;
        let iso_hi = profile
            .iso_index(iso_range.1)
            .ok_or_else(|| ExposureError::UnknownIso(iso_range.1.to_string()))?;
        let speed_lo = profile
            .speed_index(speed_range.0)
            .ok_or_else(|| ExposureError::UnknownSpeed(speed_range.0.to_string()))?;
        let speed_hi = profile
            .speed_index(speed_range.1)
            .ok_or_else(|| ExposureError::UnknownSpeed(speed_range.1.to_string()))?;

        if iso_lo > iso_hi {
            return Err(ExposureError::ReversedRange {
                ladder: "ISO",
                low: iso_range.0.to_string(),
                high: iso_range.1.to_string(),
            });
        }
        if speed_lo > speed_hi {
            return Err(ExposureError::ReversedRange {
                ladder: "speed",
                low: speed_range.0.to_string(),
                high: speed_range.1.to_string(),
            });
        }

        let mut entries = Vec::with_capacity((iso_hi - iso_lo + 1) * (speed_hi - speed_lo + 1));
        for iso_index in iso_lo..=iso_hi {
            for speed_index in speed_lo..=speed_hi {
                let seconds = profile.speed_seconds(speed_index);
                let score =
                    (f_number * f_number / (profile.iso_number(iso_index) * seconds)).log2();
                entries.push(ExposureEntry {
                    score,
                    iso_index,
                    speed_index,
                    iso: profile.iso_labels()[iso_index].clone(),
                    speed: profile.speed_labels()[speed_index].clone(),
                    iso_offset: (iso_index - iso_lo) as i64,
                    speed_offset: speed_index as i64 - speed_hi as i64,
                });
            }
        }
        entries.sort_by(|a, b| a.score.total_cmp(&b.score));

        debug!(
            entries = entries.len(),
            f_number,
            q_min = entries.first().map(|e| e.score),
            q_max = entries.last().map(|e| e.score),
            "exposure table built"
        );

        Ok(Self { entries, f_number })
    }

    /// The combination best matching the target brightness `target` (in
    /// log₂ EV stops).
    ///
    /// Ranks entries by `|score − target|`, keeps the closest
    /// `opts.max_candidates` that are within `opts.tolerance`, and among
    /// those returns the minimum-penalty entry (first such entry on penalty
    /// ties, i.e. the one closest to the target).
    ///
    /// # Errors
    /// [`ExposureError::NoMatch`] when no entry is within tolerance.
    pub fn best(
        &self,
        target: f64,
        opts: &SelectionOptions,
    ) -> Result<&ExposureEntry, ExposureError> {
        let mut ranked: Vec<&ExposureEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| {
            (a.score - target)
                .abs()
                .total_cmp(&(b.score - target).abs())
        });

        let best = ranked
            .into_iter()
            .take(opts.max_candidates)
            .filter(|e| (e.score - target).abs() <= opts.tolerance)
            .min_by(|a, b| a.penalty(opts).total_cmp(&b.penalty(opts)))
            .ok_or(ExposureError::NoMatch {
                target,
                tolerance: opts.tolerance,
            })?;

        debug!(
            target,
            score = best.score,
            iso = %best.iso,
            speed = %best.speed,
            "selected exposure"
        );
        Ok(best)
    }

    /// All entries, sorted by score ascending.
    pub fn entries(&self) -> &[ExposureEntry] {
        &self.entries
    }

    /// The fixed aperture the table was built for.
    pub fn f_number(&self) -> f64 {
        self.f_number
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraProfile;

    fn small_profile() -> CameraProfile {
        CameraProfile::new(
            vec!["100".into(), "200".into(), "400".into()],
            vec!["10/10".into(), "5/10".into(), "1/4".into(), "1/8".into()],
        )
        .unwrap()
    }

    fn full_table() -> ExposureTable {
        ExposureTable::build(
            &CameraProfile::default(),
            ("100", "6400"),
            ("300/10", "1/8000"),
            5.6,
        )
        .unwrap()
    }

    // ── build ─────────────────────────────────────────────────────────────────

    #[test]
    fn table_is_total_cross_product_sorted_by_score() {
        let table = full_table();
        // 100..6400 = 19 ISO steps, 300/10..1/8000 = the whole 55-step ladder
        assert_eq!(table.entries().len(), 19 * 55);

        for w in table.entries().windows(2) {
            assert!(w[0].score <= w[1].score, "table must be sorted by score");
        }

        // no duplicated (iso, speed) cell
        let mut cells: Vec<(usize, usize)> = table
            .entries()
            .iter()
            .map(|e| (e.iso_index, e.speed_index))
            .collect();
        cells.sort_unstable();
        let before = cells.len();
        cells.dedup();
        assert_eq!(cells.len(), before);
    }

    #[test]
    fn scores_follow_the_ev_formula() {
        let table = ExposureTable::build(&small_profile(), ("100", "100"), ("10/10", "10/10"), 1.0)
            .unwrap();
        // Q = log2(1² / (100 · 1 s)) = −log2(100)
        assert_eq!(table.entries().len(), 1);
        assert!((table.entries()[0].score - (-(100f64.log2()))).abs() < 1e-12);
    }

    #[test]
    fn offsets_are_anchored_to_the_range_ends() {
        let table =
            ExposureTable::build(&small_profile(), ("100", "400"), ("10/10", "1/8"), 1.0).unwrap();
        for e in table.entries() {
            assert!(e.iso_offset >= 0, "iso_offset counts up from the low end");
            assert!(e.speed_offset <= 0, "speed_offset counts down from the fast end");
        }
        // the low-ISO / fastest-speed corner sits at (0, 0) and (max, 0)
        let corner = table
            .entries()
            .iter()
            .find(|e| e.iso == "100" && e.speed == "1/8")
            .unwrap();
        assert_eq!((corner.iso_offset, corner.speed_offset), (0, 0));
        let slowest = table
            .entries()
            .iter()
            .find(|e| e.iso == "100" && e.speed == "10/10")
            .unwrap();
        assert_eq!(slowest.speed_offset, -3);
    }

    #[test]
    fn unknown_range_labels_are_errors() {
        let p = small_profile();
        let err = ExposureTable::build(&p, ("99", "400"), ("10/10", "1/8"), 1.0).unwrap_err();
        assert!(matches!(err, ExposureError::UnknownIso(_)));

        let err = ExposureTable::build(&p, ("100", "400"), ("10/10", "1/500"), 1.0).unwrap_err();
        assert!(matches!(err, ExposureError::UnknownSpeed(_)));
    }

    #[test]
    fn reversed_ranges_are_errors() {
        let p = small_profile();
        let err = ExposureTable::build(&p, ("400", "100"), ("10/10", "1/8"), 1.0).unwrap_err();
        assert!(matches!(err, ExposureError::ReversedRange { ladder: "ISO", .. }));

        let err = ExposureTable::build(&p, ("100", "400"), ("1/8", "10/10"), 1.0).unwrap_err();
        assert!(matches!(err, ExposureError::ReversedRange { ladder: "speed", .. }));
    }

    // ── best ──────────────────────────────────────────────────────────────────

    #[test]
    fn best_never_exceeds_tolerance() {
        let table = full_table();
        let opts = SelectionOptions::default();
        // Sweep the whole brightness range an eclipse covers (and then some).
        let mut q = -8.0;
        while q <= 8.0 {
            if let Ok(e) = table.best(q, &opts) {
                assert!(
                    (e.score - q).abs() <= opts.tolerance,
                    "Q={q}: picked score {} outside tolerance",
                    e.score
                );
            }
            q += 0.05;
        }
    }

    #[test]
    fn unreachable_target_is_a_planning_error() {
        let table = full_table();
        let err = table.best(100.0, &SelectionOptions::default()).unwrap_err();
        assert!(matches!(err, ExposureError::NoMatch { .. }));
    }

    #[test]
    fn equal_scores_prefer_low_iso() {
        // ISO 100 @ 1 s and ISO 200 @ 0.5 s have identical Q; the penalty
        // must resolve the tie toward the lower ISO.
        let table =
            ExposureTable::build(&small_profile(), ("100", "200"), ("10/10", "5/10"), 1.0)
                .unwrap();
        let target = -(100f64.log2()); // exact Q of both combinations
        let e = table.best(target, &SelectionOptions::default()).unwrap();
        assert_eq!(e.iso, "100");
        assert_eq!(e.speed, "10/10");
    }

    #[test]
    fn wide_tolerance_still_prefers_the_penalty_minimum() {
        let table = full_table();
        let opts = SelectionOptions {
            tolerance: 0.3,
            ..SelectionOptions::default()
        };
        // A bright partial-phase target: plenty of candidates; the winner
        // must be one of the within-tolerance set.
        let e = table.best(7.0, &opts).unwrap();
        assert!((e.score - 7.0).abs() <= 0.3);
    }
}
