//! Canonical function templates.
//!
//! These are the starter formulas offered by the template picker: a small,
//! curated set that exercises the full pipeline (polynomial bowl, periodic
//! surface, decaying bump) without requiring the user to type anything.
//!
//! The `expr` strings are in the expression engine's syntax (`^` is power,
//! `e()` is Euler's number), while `display` is the human-facing form.

/// One selectable function template.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Template {
    /// Stable identifier (used by the UI layer for selection state).
    pub id: &'static str,
    /// Human-facing label.
    pub label: &'static str,
    /// Human-facing formula rendering.
    pub display: &'static str,
    /// Machine form handed to [`crate::expr::Expression::compile`].
    pub expr: &'static str,
}

/// All built-in templates, in presentation order.
pub const TEMPLATES: &[Template] = &[
    Template {
        id: "polynomial",
        label: "Polynomial",
        display: "f(x,y) = x² + y²",
        expr: "x^2 + y^2",
    },
    Template {
        id: "trigonometric",
        label: "Trigonometric",
        display: "f(x,y) = sin(x) × cos(y)",
        expr: "sin(x) * cos(y)",
    },
    Template {
        id: "exponential",
        label: "Exponential",
        display: "f(x,y) = e^(-(x² + y²)/4)",
        expr: "e()^(-(x^2 + y^2) / 4)",
    },
];

/// Look up a template by id.
pub fn by_id(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// The template shown on first launch.
#[inline]
pub fn default_template() -> &'static Template {
    &TEMPLATES[0]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::expr::Expression;

    #[test]
    fn every_template_id_resolves() {
        for t in TEMPLATES {
            assert_eq!(by_id(t.id).unwrap().expr, t.expr);
        }
        assert!(by_id("no-such-template").is_none());
    }

    #[test]
    fn every_template_compiles_and_evaluates_finite() {
        for t in TEMPLATES {
            let e = Expression::compile(t.expr).unwrap();
            let v = e.eval_xy(0.5, -0.5).unwrap();
            assert!(v.is_finite(), "{} produced {v}", t.id);
        }
    }

    #[test]
    fn default_template_is_the_polynomial_bowl() {
        assert_eq!(default_template().id, "polynomial");
    }
}
