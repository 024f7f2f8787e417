//! Arithmetic over extracted operands and answer formatting.
//!
//! Subtraction and division are position-sensitive: the first operand is
//! the base, everything after it is taken away (or divides it). Division
//! uses only the first two operands and rejects a zero divisor.
//!
//! Answers are rendered with exactly two fractional digits through the
//! standard formatter, so the rounding policy is whatever `{:.2}` does
//! (round half to even on the decimal rendering). Negative zero is
//! normalized so "0.00" never grows a sign.

use crate::error::SolveError;
use crate::extract::{Extraction, OperationTag};

/// Apply the inferred operation to the operand list.
///
/// The extractor guarantees at least two operands; `challenge` is only
/// used for error context.
pub fn compute(extraction: &Extraction, challenge: &str) -> Result<f64, SolveError> {
    let numbers = &extraction.numbers;
    if numbers.len() < 2 {
        return Err(SolveError::InsufficientNumbers {
            challenge: challenge.to_string(),
            found: numbers.len(),
        });
    }
    let value = match extraction.operation {
        OperationTag::Add => numbers.iter().sum(),
        OperationTag::Subtract => numbers[0] - numbers[1..].iter().sum::<f64>(),
        OperationTag::Multiply => numbers.iter().product(),
        OperationTag::Divide => {
            if numbers[1] == 0.0 {
                return Err(SolveError::DivisionByZero {
                    challenge: challenge.to_string(),
                });
            }
            numbers[0] / numbers[1]
        }
    };
    Ok(value)
}

/// Render the answer with exactly two fractional digits.
pub fn format_answer(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.2}", value)
}
