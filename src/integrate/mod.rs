//! Left-Riemann-sum quadrature.
//!
//! Approximates the area between a one-variable function and the x-axis,
//! counting only the part **above** the axis: negative excursions neither
//! add nor subtract. The rule is the plain left-rectangle sum — no
//! trapezoids, no adaptive refinement — because that simple rule *is* the
//! numeric contract the explorer displays and the tests pin down.
//!
//! Unlike the sampler, faults are not coerced here: a fault in one
//! rectangle would make the whole estimate wrong, and a silently-zeroed
//! integral is numerically misleading in a way a flat surface patch is
//! not. Callers get an [`EvalError`] and display "unavailable" instead.

use crate::expr::{EvalError, Expression};
use crate::plot::Bounds1;

/// Approximate the area under `y = f(x)` over `bounds` with `samples`
/// left-endpoint rectangles.
///
/// Edge cases:
/// - `samples == 0` integrates nothing and returns `0.0`.
/// - A non-finite positive value (e.g. `1/x` sampled at 0) propagates into
///   the sum per IEEE semantics; `NaN` heights fail the `y > 0` filter and
///   contribute nothing.
pub fn area_under_curve(text: &str, bounds: Bounds1, samples: u32) -> Result<f64, EvalError> {
    let expr = Expression::compile(text)?;

    let dx = bounds.width() / samples as f64;
    let mut area = 0.0;

    for i in 0..samples {
        let x = bounds.min + i as f64 * dx;
        let y = expr.eval_x(x)?;
        if y > 0.0 {
            area += y * dx;
        }
    }

    Ok(area)
}

/// Approximate the area under the slice `y = f(x, y0)` of a two-variable
/// expression, with the same left-rectangle rule and positive-part filter
/// as [`area_under_curve`].
pub fn slice_area(text: &str, bounds: Bounds1, y0: f64, samples: u32) -> Result<f64, EvalError> {
    let expr = Expression::compile(text)?;

    let dx = bounds.width() / samples as f64;
    let mut area = 0.0;

    for i in 0..samples {
        let x = bounds.min + i as f64 * dx;
        let y = expr.eval_xy(x, y0)?;
        if y > 0.0 {
            area += y * dx;
        }
    }

    Ok(area)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn constant_one_over_ten_units_is_exactly_ten() {
        let area = area_under_curve("1", Bounds1::new(0.0, 10.0), 10).unwrap();
        assert_eq!(area, 10.0);
    }

    #[test]
    fn entirely_negative_functions_contribute_nothing() {
        let area = area_under_curve("-1", Bounds1::new(0.0, 10.0), 10).unwrap();
        assert_eq!(area, 0.0);
    }

    #[test]
    fn left_endpoints_are_used() {
        // f(x) = x on [0, 1] with 4 rectangles: (0 + 0.25 + 0.5 + 0.75)/4.
        let area = area_under_curve("x", Bounds1::new(0.0, 1.0), 4).unwrap();
        assert_relative_eq!(area, 0.375);
    }

    #[test]
    fn negative_excursions_are_excluded_not_subtracted() {
        // Left endpoints -1, -0.5, 0, 0.5: only x = 0.5 clears the filter.
        let area = area_under_curve("x", Bounds1::new(-1.0, 1.0), 4).unwrap();
        assert_relative_eq!(area, 0.25);
    }

    #[test]
    fn malformed_text_propagates_as_parse_error() {
        let err = area_under_curve("x +* 1", Bounds1::new(0.0, 1.0), 4).unwrap_err();
        assert!(matches!(err, EvalError::Parse(_)));
    }

    #[test]
    fn unknown_identifier_propagates_as_eval_error() {
        let err = area_under_curve("q", Bounds1::new(0.0, 1.0), 4).unwrap_err();
        assert!(matches!(err, EvalError::Eval(_)));
    }

    #[test]
    fn slice_area_pins_the_second_variable() {
        // f(x, 1) = x + 1 on [0, 1]: (1 + 1.25 + 1.5 + 1.75) / 4.
        let area = slice_area("x + y", Bounds1::new(0.0, 1.0), 1.0, 4).unwrap();
        assert_relative_eq!(area, 1.375);
    }

    #[test]
    fn zero_samples_integrate_nothing() {
        let area = area_under_curve("1", Bounds1::new(0.0, 1.0), 0).unwrap();
        assert_eq!(area, 0.0);
    }
}
