//! Easing functions for animation interpolation.
//!
//! Provides various easing curves for smooth visual transitions. All
//! functions are designed for <100ns evaluation time.

/// Easing function variants for animation curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-in (slow start, fast end).
    QuadraticIn,
    /// Quadratic ease-out (fast start, slow end).
    QuadraticOut,
    /// Cubic ease-out (fast start, long settle). Matches the "power2.out"
    /// feel used for snap transitions.
    CubicOut,
    /// Piecewise bounce-style ease used for reset transitions: quadratic
    /// ease-in for the first half, cubic ease-out for the second.
    Bounce,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First control point.
        c1: f32,
        /// Second control point.
        c2: f32,
    },
}

impl EasingFunction {
    /// Default easing: cubic ease-out, the curve used by snap and
    /// drag-release transitions.
    pub const DEFAULT: EasingFunction = EasingFunction::CubicOut;

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0]. Returns the eased value, also in
    /// [0.0, 1.0].
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::QuadraticIn => t * t,
            EasingFunction::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            EasingFunction::CubicOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt * omt
            }
            EasingFunction::Bounce => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::CubicHermite { c1, c2 } => {
                // f(t) = c1·3t(1-t)² + c2·3(1-t)t² + t³
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
        }
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_endpoints() {
        let linear = EasingFunction::Linear;
        assert_eq!(linear.evaluate(0.0), 0.0);
        assert_eq!(linear.evaluate(0.5), 0.5);
        assert_eq!(linear.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_cubic_out_endpoints() {
        let ease = EasingFunction::CubicOut;
        assert_eq!(ease.evaluate(0.0), 0.0);
        assert!((ease.evaluate(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cubic_out_ease_out_shape() {
        // Ease-out: early progress (t=0.25) should yield a result > 0.25
        let ease = EasingFunction::CubicOut;
        let result_at_quarter = ease.evaluate(0.25);
        assert!(
            result_at_quarter > 0.25,
            "Ease-out should have value > 0.25 at t=0.25, got {result_at_quarter}"
        );
    }

    #[test]
    fn test_bounce_endpoints_and_midpoint() {
        let bounce = EasingFunction::Bounce;
        assert_eq!(bounce.evaluate(0.0), 0.0);
        assert!((bounce.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!((bounce.evaluate(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_input_clamping() {
        let linear = EasingFunction::Linear;
        assert_eq!(linear.evaluate(-0.5), 0.0);
        assert_eq!(linear.evaluate(1.5), 1.0);

        let hermite = EasingFunction::CubicHermite { c1: 0.33, c2: 1.0 };
        assert_eq!(hermite.evaluate(-0.5), 0.0);
        assert!((hermite.evaluate(1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_quadratic_out() {
        let quad_out = EasingFunction::QuadraticOut;
        assert_eq!(quad_out.evaluate(0.0), 0.0);
        assert_eq!(quad_out.evaluate(0.5), 0.75); // 1 - (1-0.5)² = 0.75
        assert_eq!(quad_out.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_default_is_cubic_out() {
        assert_eq!(EasingFunction::default(), EasingFunction::CubicOut);
    }
}
