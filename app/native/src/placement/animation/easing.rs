//! Easing curves for animation progress.

use std::f64::consts::PI;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Linear interpolation between `start` and `end`.
#[inline]
#[must_use]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 { (end - start).mul_add(t, start) }

/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    #[default]
    CubicOut,
    CubicInOut,
    /// Settles with decaying bounces at the end.
    Bounce,
    /// Overshoots and oscillates into place.
    Elastic,
}

impl Easing {
    /// Applies the curve. Input is clamped to `[0, 1]`; both ends are exact.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => t * (2.0 - t),
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    (4.0 - 2.0 * t).mul_add(t, -1.0)
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => {
                let t1 = t - 1.0;
                (t1 * t1).mul_add(t1, 1.0)
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t1 = 2.0f64.mul_add(t, -2.0);
                    (0.5 * t1 * t1).mul_add(t1, 1.0)
                }
            }
            Self::Bounce => bounce_out(t),
            Self::Elastic => elastic_out(t),
        }
    }

    /// All curves, for schema docs and the CLI.
    pub const ALL: [Self; 9] = [
        Self::Linear,
        Self::QuadIn,
        Self::QuadOut,
        Self::QuadInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::Bounce,
        Self::Elastic,
    ];
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        (N * t).mul_add(t, 0.75)
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        (N * t).mul_add(t, 0.9375)
    } else {
        let t = t - 2.625 / D;
        (N * t).mul_add(t, 0.984_375)
    }
}

fn elastic_out(t: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let c4 = (2.0 * PI) / 3.0;
    2.0f64.powf(-10.0 * t).mul_add((t.mul_add(10.0, -0.75) * c4).sin(), 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < f64::EPSILON);
        assert!((lerp(50.0, 150.0, 0.25) - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_endpoints_are_exact() {
        for easing in Easing::ALL {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert!((Easing::Linear.apply(1.7) - 1.0).abs() < f64::EPSILON);
        assert!(Easing::CubicIn.apply(-0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_curve_shapes() {
        assert!(Easing::QuadIn.apply(0.5) < 0.5);
        assert!(Easing::QuadOut.apply(0.5) > 0.5);
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-9);
        assert!(Easing::CubicInOut.apply(0.25) < 0.25);
        assert!(Easing::CubicInOut.apply(0.75) > 0.75);
        assert!((Easing::QuadInOut.apply(0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_elastic_overshoots() {
        let peak = (1..100).map(|i| Easing::Elastic.apply(f64::from(i) / 100.0)).fold(0.0, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_bounce_stays_in_range() {
        for i in 0..=100 {
            let value = Easing::Bounce.apply(f64::from(i) / 100.0);
            assert!((0.0..=1.0 + 1e-9).contains(&value));
        }
    }
}
