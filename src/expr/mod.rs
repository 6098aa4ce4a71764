//! Expression engine integration.
//!
//! This module is responsible for:
//! - compiling a user-typed expression string into an evaluable form
//! - evaluating it at `x` (and optionally `y`) bindings
//! - exposing a stable, engine-agnostic entrypoint for the plotting layer
//!
//! The actual expression language (syntax, built-in functions, operator
//! precedence) is delegated to [`fasteval`]; nothing in the numeric core
//! depends on `fasteval` types. The contract the rest of the crate relies on:
//!
//! - `Expression::compile(text)` fails with [`EvalError::Parse`] on
//!   malformed input.
//! - `eval_xy` / `eval_x` fail with [`EvalError::Eval`] on evaluation
//!   faults (undefined identifiers, wrong arity, ...).
//! - Arithmetic domain faults (`1/0`, `sqrt(-1)`) do NOT fail; they come
//!   back as non-finite `f64` values, and callers decide how to coerce them.
//!
//! Expressions are compiled once and evaluated many times; a surface at
//! resolution `n` costs `(n+1)^2` evaluations per recompute.

pub mod templates;

use std::collections::BTreeMap;

use fasteval::{Compiler as _, Evaler as _};

/// Failure modes of the expression engine.
///
/// Variants carry the engine's diagnostic rendered to a string so this type
/// stays independent of the backing crate's error enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("evaluation error: {0}")]
    Eval(String),
}

/// A compiled expression in the variables `x` and (optionally) `y`.
///
/// Holds the parse slab and the compiled instruction together so evaluation
/// needs no further allocation beyond the per-call binding map.
pub struct Expression {
    slab: fasteval::Slab,
    compiled: fasteval::Instruction,
    text: String,
}

impl Expression {
    /// Compile `text` into an evaluable expression.
    ///
    /// Unknown identifiers are not rejected here; they surface as
    /// [`EvalError::Eval`] when the expression is evaluated without a
    /// matching binding.
    pub fn compile(text: &str) -> Result<Self, EvalError> {
        let parser = fasteval::Parser::new();
        let mut slab = fasteval::Slab::new();

        let compiled = parser
            .parse(text, &mut slab.ps)
            .map_err(|e| EvalError::Parse(format!("{e:?}")))?
            .from(&slab.ps)
            .compile(&slab.ps, &mut slab.cs);

        Ok(Self {
            slab,
            compiled,
            text: text.to_string(),
        })
    }

    /// The source text this expression was compiled from.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Evaluate with both `x` and `y` bound.
    pub fn eval_xy(&self, x: f64, y: f64) -> Result<f64, EvalError> {
        let mut ns = BTreeMap::new();
        ns.insert("x".to_string(), x);
        ns.insert("y".to_string(), y);
        self.eval_with(&mut ns)
    }

    /// Evaluate with only `x` bound.
    pub fn eval_x(&self, x: f64) -> Result<f64, EvalError> {
        let mut ns = BTreeMap::new();
        ns.insert("x".to_string(), x);
        self.eval_with(&mut ns)
    }

    fn eval_with(&self, ns: &mut BTreeMap<String, f64>) -> Result<f64, EvalError> {
        self.compiled
            .eval(&self.slab, ns)
            .map_err(|e| EvalError::Eval(format!("{e:?}")))
    }
}

impl std::fmt::Debug for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expression")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn compiles_and_evaluates_two_variables() {
        let e = Expression::compile("x^2 + y^2").unwrap();
        assert_relative_eq!(e.eval_xy(3.0, 4.0).unwrap(), 25.0);
    }

    #[test]
    fn compiles_and_evaluates_one_variable() {
        let e = Expression::compile("2 * x + 1").unwrap();
        assert_relative_eq!(e.eval_x(0.5).unwrap(), 2.0);
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = Expression::compile("x +* 2").unwrap_err();
        assert!(matches!(err, EvalError::Parse(_)));
    }

    #[test]
    fn unknown_identifier_is_an_eval_error() {
        let e = Expression::compile("q + 1").unwrap();
        let err = e.eval_x(1.0).unwrap_err();
        assert!(matches!(err, EvalError::Eval(_)));
    }

    #[test]
    fn domain_faults_return_non_finite_not_error() {
        let e = Expression::compile("1 / x").unwrap();
        assert!(!e.eval_x(0.0).unwrap().is_finite());

        let e = Expression::compile("log(x)").unwrap();
        assert!(!e.eval_x(-1.0).unwrap().is_finite());
    }
}
