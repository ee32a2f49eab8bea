//! Derived field evaluation.
//!
//! [`OperatorEvaluator`] does not parse formulas. It only looks for the first
//! operator character present (checked in the order `+`, `-`, `*`, `/`) and
//! folds the parent values with that operation. Other engines can be plugged
//! in through [`Evaluator`].

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::model::{FieldId, FormField, FormSchema};
use crate::value::{FieldValue, FieldValues};

/// Shown in place of a derived value that could not be computed.
pub const ERROR_SENTINEL: &str = "Error";

#[derive(Clone, Debug, PartialEq)]
pub enum DerivedValue {
    Value(FieldValue),
    Error,
}

impl DerivedValue {
    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            DerivedValue::Value(v) => Some(v),
            DerivedValue::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DerivedValue::Error)
    }
}

impl fmt::Display for DerivedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedValue::Value(v) => fmt::Display::fmt(v, f),
            DerivedValue::Error => f.write_str(ERROR_SENTINEL),
        }
    }
}

pub trait Evaluator {
    /// Compute the value of a derived `field` from `values`. Never fails;
    /// problems surface as [`DerivedValue::Error`].
    fn evaluate(&self, field: &FormField, values: &FieldValues) -> DerivedValue;
}

#[derive(Error, Debug, PartialEq)]
enum EvalError {
    #[error("reduction over no operands")]
    NoOperands,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not finite")]
    NotFinite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reduction {
    Sum,
    Difference,
    Product,
    Quotient,
}

impl Reduction {
    fn detect(formula: &str) -> Option<Self> {
        [
            ('+', Reduction::Sum),
            ('-', Reduction::Difference),
            ('*', Reduction::Product),
            ('/', Reduction::Quotient),
        ]
        .into_iter()
        .find(|(op, _)| formula.contains(*op))
        .map(|(_, reduction)| reduction)
    }
}

/// A parent value after defaulting. Absent values and empty text are missing.
#[derive(Clone, Copy, Debug)]
enum Operand<'a> {
    Missing,
    Present(&'a FieldValue),
}

impl Operand<'_> {
    fn resolve<'a>(id: &FieldId, values: &'a FieldValues) -> Operand<'a> {
        match values.get(id) {
            Some(FieldValue::Text(s)) if s.is_empty() => Operand::Missing,
            Some(value) => Operand::Present(value),
            None => Operand::Missing,
        }
    }

    fn number(self) -> f64 {
        match self {
            Operand::Missing => 0.0,
            Operand::Present(v) => v.as_number(),
        }
    }

    fn divisor(self) -> Result<f64, EvalError> {
        match self {
            Operand::Missing => Ok(1.0),
            Operand::Present(v) => match v.as_number() {
                n if n == 0.0 => Err(EvalError::DivisionByZero),
                n => Ok(n),
            },
        }
    }

    fn to_value(self) -> FieldValue {
        match self {
            Operand::Missing => FieldValue::Number(0.0),
            Operand::Present(v) => v.clone(),
        }
    }
}

/// The operator-sniffing evaluator.
#[derive(Clone, Copy, Debug, Default)]
pub struct OperatorEvaluator;

impl OperatorEvaluator {
    fn reduce(reduction: Reduction, operands: &[Operand<'_>]) -> Result<FieldValue, EvalError> {
        let result = match reduction {
            Reduction::Sum => operands.iter().fold(0.0, |acc, o| acc + o.number()),
            Reduction::Product => operands.iter().fold(1.0, |acc, o| acc * o.number()),
            Reduction::Difference | Reduction::Quotient => {
                let (first, rest) = operands.split_first().ok_or(EvalError::NoOperands)?;
                if rest.is_empty() {
                    // a fold without seed never touches a lone operand
                    return Ok(first.to_value());
                }
                let mut acc = first.number();
                for operand in rest {
                    acc = match reduction {
                        Reduction::Difference => acc - operand.number(),
                        _ => acc / operand.divisor()?,
                    };
                }
                acc
            }
        };

        if result.is_finite() {
            Ok(FieldValue::Number(result))
        } else {
            Err(EvalError::NotFinite)
        }
    }
}

impl Evaluator for OperatorEvaluator {
    fn evaluate(&self, field: &FormField, values: &FieldValues) -> DerivedValue {
        let Some(config) = field.derived() else {
            return DerivedValue::Value(FieldValue::text(""));
        };

        let operands: Vec<Operand<'_>> = config
            .parent_fields
            .iter()
            .map(|id| Operand::resolve(id, values))
            .collect();

        let Some(reduction) = Reduction::detect(&config.formula) else {
            // a zero first operand reads as empty, like a missing one
            return DerivedValue::Value(match operands.first() {
                Some(Operand::Present(FieldValue::Number(n))) if *n == 0.0 || n.is_nan() => {
                    FieldValue::text("")
                }
                Some(Operand::Present(v)) => (*v).clone(),
                _ => FieldValue::text(""),
            });
        };

        match Self::reduce(reduction, &operands) {
            Ok(value) => DerivedValue::Value(value),
            Err(err) => {
                tracing::debug!(field = %field.id, formula = %config.formula, "derived value failed: {err}");
                DerivedValue::Error
            }
        }
    }
}

/// Recompute every derived field of `schema` from the entered `values`.
pub fn evaluate_all<E: Evaluator + ?Sized>(
    evaluator: &E,
    schema: &FormSchema,
    values: &FieldValues,
) -> HashMap<FieldId, DerivedValue> {
    schema
        .derived_fields()
        .map(|field| (field.id, evaluator.evaluate(field, values)))
        .collect()
}
