//! Scales map a measured quantity onto a score in `[0, 1]`.
//!
//! Scales are pure values: they are built once from configuration and then
//! shared by every rule that uses them.

use crate::error::{Error, Result};

/// Piecewise-linear interpolation between control points.
///
/// Outside the covered range the score is clamped to the nearest endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    points: Vec<(f64, f64)>,
}

impl LinearScale {
    /// Build a scale from `(x, score)` control points.
    ///
    /// At least two points are required, x values must be strictly
    /// increasing and scores must lie in `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use instruction_oxide::rules::scale::LinearScale;
    ///
    /// let scale = LinearScale::new(vec![(0.0, 0.0), (10.0, 1.0), (20.0, 0.0)]).unwrap();
    /// assert_eq!(scale.score(5.0), 0.5);
    /// assert_eq!(scale.score(10.0), 1.0);
    /// assert_eq!(scale.score(-3.0), 0.0);
    /// assert_eq!(scale.score(25.0), 0.0);
    /// ```
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::InvalidConfig(
                "linear scale needs at least two control points".into(),
            ));
        }
        if points.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(Error::InvalidConfig(
                "linear scale x values must be strictly increasing".into(),
            ));
        }
        if points.iter().any(|&(_, s)| !(0.0..=1.0).contains(&s)) {
            return Err(Error::InvalidConfig(
                "linear scale scores must lie in [0, 1]".into(),
            ));
        }
        Ok(Self { points })
    }

    /// Score a value.
    pub fn score(&self, x: f64) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if x.is_nan() {
            return 0.0;
        }
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        for w in self.points.windows(2) {
            let (x0, s0) = w[0];
            let (x1, s1) = w[1];
            if x <= x1 {
                let t = (x - x0) / (x1 - x0);
                return s0 + t * (s1 - s0);
            }
        }
        last.1
    }
}

/// Lookup table of half-open ranges `[lo, hi)` with a fallback score.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteScale {
    ranges: Vec<(f64, f64, f64)>,
    default: f64,
}

impl DiscreteScale {
    /// Build a lookup from `(lo, hi, score)` triples.
    pub fn new(ranges: Vec<(f64, f64, f64)>, default: f64) -> Result<Self> {
        if ranges.iter().any(|&(lo, hi, _)| lo >= hi) {
            return Err(Error::InvalidConfig(
                "discrete scale ranges must have lo < hi".into(),
            ));
        }
        Ok(Self {
            ranges,
            default: default.clamp(0.0, 1.0),
        })
    }

    /// Score a value; the first matching range wins.
    pub fn score(&self, x: f64) -> f64 {
        self.ranges
            .iter()
            .find(|&&(lo, hi, _)| x >= lo && x < hi)
            .map_or(self.default, |&(_, _, s)| s.clamp(0.0, 1.0))
    }
}

/// Step function: each threshold sets the score for values at or above it.
#[derive(Debug, Clone, PartialEq)]
pub struct StepScale {
    steps: Vec<(f64, f64)>,
    below: f64,
}

impl StepScale {
    /// Build a step scale from ascending `(threshold, score)` pairs and the
    /// score used below the first threshold.
    pub fn new(steps: Vec<(f64, f64)>, below: f64) -> Result<Self> {
        if steps.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(Error::InvalidConfig(
                "step scale thresholds must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            steps,
            below: below.clamp(0.0, 1.0),
        })
    }

    /// Score a value.
    pub fn score(&self, x: f64) -> f64 {
        self.steps
            .iter()
            .rev()
            .find(|&&(threshold, _)| x >= threshold)
            .map_or(self.below, |&(_, s)| s.clamp(0.0, 1.0))
    }
}

/// Any of the supported scale shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Scale {
    /// Piecewise-linear interpolation
    Linear(LinearScale),
    /// Range lookup
    Discrete(DiscreteScale),
    /// `exp(-x / length)` for non-negative x, 1.0 below zero
    ExponentialDecay {
        /// Distance at which the score drops to 1/e
        length: f64,
    },
    /// Step thresholds
    Step(StepScale),
}

impl Scale {
    /// Convenience constructor for a linear scale.
    pub fn linear(points: Vec<(f64, f64)>) -> Result<Self> {
        LinearScale::new(points).map(Scale::Linear)
    }

    /// Convenience constructor for an exponential decay.
    pub fn decay(length: f64) -> Result<Self> {
        if length <= 0.0 || !length.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "decay length must be positive, got {}",
                length
            )));
        }
        Ok(Scale::ExponentialDecay { length })
    }

    /// A linear ramp from 1.0 at zero down to 0.0 at `max`.
    pub fn linear_falloff(max: f64) -> Result<Self> {
        Self::linear(vec![(0.0, 1.0), (max, 0.0)])
    }

    /// Score a value, always within `[0, 1]`.
    pub fn score(&self, x: f64) -> f64 {
        match self {
            Scale::Linear(s) => s.score(x),
            Scale::Discrete(s) => s.score(x),
            Scale::ExponentialDecay { length } => {
                if x.is_nan() {
                    0.0
                } else if x <= 0.0 {
                    1.0
                } else {
                    (-x / length).exp()
                }
            }
            Scale::Step(s) => s.score(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale_interpolates_and_clamps() {
        let s = LinearScale::new(vec![(1.0, 0.2), (3.0, 1.0)]).unwrap();
        assert_eq!(s.score(0.0), 0.2);
        assert!((s.score(2.0) - 0.6).abs() < 1e-12);
        assert_eq!(s.score(10.0), 1.0);
        assert_eq!(s.score(f64::NAN), 0.0);
    }

    #[test]
    fn test_linear_scale_rejects_bad_points() {
        assert!(LinearScale::new(vec![(0.0, 1.0)]).is_err());
        assert!(LinearScale::new(vec![(1.0, 1.0), (1.0, 0.0)]).is_err());
        assert!(LinearScale::new(vec![(0.0, 1.5), (1.0, 0.0)]).is_err());
    }

    #[test]
    fn test_discrete_scale() {
        let s = DiscreteScale::new(vec![(0.0, 1.0, 0.3), (1.0, 5.0, 1.0)], 0.1).unwrap();
        assert_eq!(s.score(0.5), 0.3);
        assert_eq!(s.score(1.0), 1.0);
        assert_eq!(s.score(5.0), 0.1);
        assert!(DiscreteScale::new(vec![(2.0, 1.0, 0.5)], 0.0).is_err());
    }

    #[test]
    fn test_step_scale() {
        let s = StepScale::new(vec![(2.0, 0.5), (4.0, 1.0)], 0.0).unwrap();
        assert_eq!(s.score(1.9), 0.0);
        assert_eq!(s.score(2.0), 0.5);
        assert_eq!(s.score(100.0), 1.0);
    }

    #[test]
    fn test_exponential_decay() {
        let s = Scale::decay(10.0).unwrap();
        assert_eq!(s.score(-1.0), 1.0);
        assert_eq!(s.score(0.0), 1.0);
        assert!((s.score(10.0) - (-1.0f64).exp()).abs() < 1e-12);
        assert!(Scale::decay(0.0).is_err());
    }
}
