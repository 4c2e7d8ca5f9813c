// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A simplified FSRS (Free Spaced Repetition Scheduler) model.
//!
//! Memory is described by two numbers: stability `S`, the number of days
//! until recall probability decays to 90%, and difficulty `D` in `[1, 10]`.
//! The weights are the published FSRS defaults; there is no optimiser and
//! no short-term (same day) scheduling.

use crate::error::ReviewError;
use crate::types::quality::Quality;

pub type Stability = f64;
pub type Difficulty = f64;

/// Recall probability the scheduler aims for when none is configured.
pub const DEFAULT_DESIRED_RETENTION: f64 = 0.9;

/// Stability never drops below this, so intervals and the decay curve stay
/// well defined.
pub const MIN_STABILITY: Stability = 0.1;

pub const MIN_DIFFICULTY: Difficulty = 1.0;
pub const MAX_DIFFICULTY: Difficulty = 10.0;

const F: f64 = 19.0 / 81.0;
const C: f64 = -0.5;

const W: [f64; 19] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

/// The four FSRS answer buttons.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Grade {
    Forgot,
    Hard,
    Good,
    Easy,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Forgot => "forgot",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }
}

/// Failing grades (0-2) all count as `Forgot`; 3, 4 and 5 are `Hard`,
/// `Good` and `Easy`.
impl From<Quality> for Grade {
    fn from(q: Quality) -> Grade {
        match q.value() {
            0..=2 => Grade::Forgot,
            3 => Grade::Hard,
            4 => Grade::Good,
            _ => Grade::Easy,
        }
    }
}

impl From<Grade> for f64 {
    fn from(g: Grade) -> f64 {
        match g {
            Grade::Forgot => 1.0,
            Grade::Hard => 2.0,
            Grade::Good => 3.0,
            Grade::Easy => 4.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FsrsOutcome {
    pub stability: Stability,
    pub difficulty: Difficulty,
    pub interval_days: u32,
}

/// Probability of recall after `t` days for a card of stability `s`.
///
/// Equals 1 at `t = 0` and decays towards 0 as `t` grows, never reaching it.
pub fn retrievability(t: f64, s: Stability) -> f64 {
    (1.0 + F * (t / s)).powf(C)
}

/// Days until retrievability falls to `r_d`.
pub fn interval(r_d: f64, s: Stability) -> f64 {
    (s / F) * (r_d.powf(1.0 / C) - 1.0)
}

pub fn initial_stability(g: Grade) -> Stability {
    match g {
        Grade::Forgot => W[0],
        Grade::Hard => W[1],
        Grade::Good => W[2],
        Grade::Easy => W[3],
    }
}

pub fn initial_difficulty(g: Grade) -> Difficulty {
    let g: f64 = g.into();
    clamp_d(W[4] - f64::exp(W[5] * (g - 1.0)) + 1.0)
}

pub fn new_stability(d: Difficulty, s: Stability, r: f64, g: Grade) -> Stability {
    let s = if g == Grade::Forgot {
        s_fail(d, s, r)
    } else {
        s_success(d, s, r, g)
    };
    s.max(MIN_STABILITY)
}

/// Easy lowers difficulty, Good holds it, Hard and Forgot raise it. The step
/// shrinks as difficulty approaches 10.
pub fn new_difficulty(d: Difficulty, g: Grade) -> Difficulty {
    let g: f64 = g.into();
    let delta = -W[6] * (g - 3.0);
    clamp_d(d + delta * ((10.0 - d) / 9.0))
}

fn clamp_d(d: Difficulty) -> Difficulty {
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

fn s_success(d: Difficulty, s: Stability, r: f64, g: Grade) -> Stability {
    let t_d = 11.0 - d;
    // Diminishing returns: the larger the stability, the smaller the factor.
    let t_s = s.powf(-W[9]);
    let t_r = f64::exp(W[10] * (1.0 - r)) - 1.0;
    let h = if g == Grade::Hard { W[15] } else { 1.0 };
    let b = if g == Grade::Easy { W[16] } else { 1.0 };
    let c = f64::exp(W[8]);
    let alpha = 1.0 + t_d * t_s * t_r * h * b * c;
    // At zero elapsed days `alpha` is exactly 1; a pass must still count.
    (s * alpha).max(s + MIN_STABILITY)
}

fn s_fail(d: Difficulty, s: Stability, r: f64) -> Stability {
    let d_f = d.powf(-W[12]);
    let s_f = (s + 1.0).powf(W[13]) - 1.0;
    let r_f = f64::exp(W[14] * (1.0 - r));
    let c_f = W[11];
    let s_f = d_f * s_f * r_f * c_f;
    f64::min(s_f, s)
}

/// Computes the next FSRS parameters with the default desired retention.
pub fn compute_fsrs(
    prev_stability: Stability,
    prev_difficulty: Difficulty,
    elapsed_days: f64,
    quality: Quality,
) -> Result<FsrsOutcome, ReviewError> {
    compute_fsrs_with_retention(
        prev_stability,
        prev_difficulty,
        elapsed_days,
        quality,
        DEFAULT_DESIRED_RETENTION,
    )
}

/// Computes the next FSRS parameters.
///
/// A non-positive `prev_stability` means the card has never been reviewed:
/// stability and difficulty are seeded from the grade. A warm card whose
/// difficulty was never set gets the seeded difficulty.
pub fn compute_fsrs_with_retention(
    prev_stability: Stability,
    prev_difficulty: Difficulty,
    elapsed_days: f64,
    quality: Quality,
    desired_retention: f64,
) -> Result<FsrsOutcome, ReviewError> {
    if !prev_stability.is_finite() || !prev_difficulty.is_finite() {
        return Err(ReviewError::validation(format!(
            "stability and difficulty must be finite, got S={prev_stability} D={prev_difficulty}"
        )));
    }
    if !elapsed_days.is_finite() || elapsed_days < 0.0 {
        return Err(ReviewError::validation(format!(
            "elapsed days must be a non-negative number, got {elapsed_days}"
        )));
    }
    if !(desired_retention > 0.0 && desired_retention < 1.0) {
        return Err(ReviewError::validation(format!(
            "desired retention must be between 0 and 1, got {desired_retention}"
        )));
    }

    let grade = Grade::from(quality);
    let (stability, difficulty) = if prev_stability <= 0.0 {
        (initial_stability(grade), initial_difficulty(grade))
    } else {
        let d = if prev_difficulty <= 0.0 {
            initial_difficulty(grade)
        } else {
            clamp_d(prev_difficulty)
        };
        let r = retrievability(elapsed_days, prev_stability);
        (
            new_stability(d, prev_stability, r, grade),
            new_difficulty(d, grade),
        )
    };

    let days = interval(desired_retention, stability).round().max(1.0);
    Ok(FsrsOutcome {
        stability,
        difficulty,
        // `as` saturates at u32::MAX.
        interval_days: days as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64) -> Quality {
        Quality::new(n).unwrap()
    }

    #[test]
    fn test_retrievability_at_zero() {
        let r = retrievability(0.0, 1.0);
        assert!((r - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_retrievability_decays() {
        let s = 4.0;
        let mut previous = retrievability(0.0, s);
        for t in 1..200 {
            let r = retrievability(t as f64, s);
            assert!(r < previous);
            assert!(r > 0.0);
            previous = r;
        }
        let far = retrievability(1e300, s);
        assert!(far >= 0.0);
        assert!(far < 1e-100);
    }

    #[test]
    fn test_interval_at_default_retention_equals_stability() {
        let s = 5.0;
        let i = interval(DEFAULT_DESIRED_RETENTION, s);
        assert!((i - s).abs() < 1e-10);
    }

    #[test]
    fn test_quality_to_grade() {
        assert_eq!(Grade::from(q(0)), Grade::Forgot);
        assert_eq!(Grade::from(q(2)), Grade::Forgot);
        assert_eq!(Grade::from(q(3)), Grade::Hard);
        assert_eq!(Grade::from(q(4)), Grade::Good);
        assert_eq!(Grade::from(q(5)), Grade::Easy);
        assert_eq!(Grade::from(q(3)).as_str(), "hard");
    }

    #[test]
    fn test_cold_start() -> Result<(), ReviewError> {
        let out = compute_fsrs(0.0, 0.0, 0.0, q(4))?;
        assert!(out.stability.is_finite());
        assert!((out.stability - W[2]).abs() < 1e-10);
        assert!(out.difficulty >= MIN_DIFFICULTY && out.difficulty <= MAX_DIFFICULTY);
        assert_eq!(out.interval_days, 3);
        Ok(())
    }

    #[test]
    fn test_cold_start_negative_stability() -> Result<(), ReviewError> {
        let out = compute_fsrs(-3.0, 5.0, 12.0, q(1))?;
        assert!((out.stability - W[0]).abs() < 1e-10);
        assert_eq!(out.interval_days, 1);
        Ok(())
    }

    #[test]
    fn test_success_increases_stability() -> Result<(), ReviewError> {
        for grade in 3..=5 {
            let out = compute_fsrs(3.0, 5.0, 3.0, q(grade))?;
            assert!(out.stability > 3.0);
        }
        Ok(())
    }

    #[test]
    fn test_immediate_success_increases_stability() -> Result<(), ReviewError> {
        for grade in 3..=5 {
            let out = compute_fsrs(3.0, 5.0, 0.0, q(grade))?;
            assert!(out.stability > 3.0);
        }
        Ok(())
    }

    #[test]
    fn test_diminishing_returns() {
        let d = 5.0;
        let gain = |s: f64| new_stability(d, s, 0.9, Grade::Good) / s;
        assert!(gain(1.0) > gain(10.0));
        assert!(gain(10.0) > gain(100.0));
    }

    #[test]
    fn test_failure_reduces_stability() -> Result<(), ReviewError> {
        let out = compute_fsrs(30.0, 5.0, 30.0, q(0))?;
        assert!(out.stability < 30.0);
        assert!(out.stability >= MIN_STABILITY);
        Ok(())
    }

    #[test]
    fn test_stability_floor() -> Result<(), ReviewError> {
        let mut s = 0.0;
        let mut d = 0.0;
        for _ in 0..500 {
            let out = compute_fsrs(s, d, 0.0, q(0))?;
            assert!(out.stability > 0.0);
            assert!(out.stability >= MIN_STABILITY);
            assert!(out.interval_days >= 1);
            s = out.stability;
            d = out.difficulty;
        }
        Ok(())
    }

    #[test]
    fn test_difficulty_clamped() {
        let mut d = initial_difficulty(Grade::Forgot);
        for _ in 0..100 {
            d = new_difficulty(d, Grade::Forgot);
        }
        assert!(d <= MAX_DIFFICULTY);
        assert!(d >= MIN_DIFFICULTY);

        let mut d = initial_difficulty(Grade::Easy);
        for _ in 0..100 {
            d = new_difficulty(d, Grade::Easy);
        }
        assert!(d >= MIN_DIFFICULTY);
        assert!(d <= MAX_DIFFICULTY);
    }

    #[test]
    fn test_difficulty_monotone_in_quality() {
        let d = 5.0;
        let forgot = new_difficulty(d, Grade::Forgot);
        let hard = new_difficulty(d, Grade::Hard);
        let good = new_difficulty(d, Grade::Good);
        let easy = new_difficulty(d, Grade::Easy);
        assert!(forgot > hard);
        assert!(hard > good);
        assert_eq!(good, d);
        assert!(good > easy);
    }

    #[test]
    fn test_interval_monotone_in_stability() -> Result<(), ReviewError> {
        let mut previous = 0.0;
        for s in [0.1, 0.5, 1.0, 3.0, 10.0, 50.0, 400.0] {
            let i = interval(DEFAULT_DESIRED_RETENTION, s);
            assert!(i > previous);
            previous = i;
        }
        Ok(())
    }

    #[test]
    fn test_large_elapsed_is_finite() -> Result<(), ReviewError> {
        let out = compute_fsrs(2.0, 5.0, 1e12, q(4))?;
        assert!(out.stability.is_finite());
        assert!(out.stability > 2.0);
        let out = compute_fsrs(2.0, 5.0, 1e12, q(0))?;
        assert!(out.stability.is_finite());
        assert!(out.stability >= MIN_STABILITY);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(compute_fsrs(f64::NAN, 5.0, 1.0, q(3)).is_err());
        assert!(compute_fsrs(2.0, f64::INFINITY, 1.0, q(3)).is_err());
        assert!(compute_fsrs(2.0, 5.0, -1.0, q(3)).is_err());
        assert!(compute_fsrs(2.0, 5.0, f64::INFINITY, q(3)).is_err());
        assert!(compute_fsrs_with_retention(2.0, 5.0, 1.0, q(3), 1.0).is_err());
        assert!(compute_fsrs_with_retention(2.0, 5.0, 1.0, q(3), 0.0).is_err());
    }

    #[test]
    fn test_higher_retention_shortens_intervals() -> Result<(), ReviewError> {
        let relaxed = compute_fsrs_with_retention(20.0, 5.0, 20.0, q(4), 0.8)?;
        let strict = compute_fsrs_with_retention(20.0, 5.0, 20.0, q(4), 0.95)?;
        assert!(strict.interval_days < relaxed.interval_days);
        Ok(())
    }

    #[test]
    fn test_pure() -> Result<(), ReviewError> {
        let a = compute_fsrs(7.5, 6.1, 9.25, q(3))?;
        let b = compute_fsrs(7.5, 6.1, 9.25, q(3))?;
        assert_eq!(a, b);
        Ok(())
    }
}
