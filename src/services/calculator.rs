// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error("Cannot divide by zero")]
    DivideByZero,
    #[error("Cannot calculate square root of negative number")]
    NegativeSquareRoot,
    #[error("Invalid operation")]
    InvalidOperation,
    #[error("Calculation error: '{0}' needs a second operand")]
    MissingOperand(Operation),
    #[error("Calculation error: result of '{0}' is not a finite number")]
    NonFiniteResult(Operation),
}

impl CalculationError {
    /// Whether the caller sent something we refuse, as opposed to something we failed at.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            CalculationError::MissingOperand(_) | CalculationError::NonFiniteResult(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    SquareRoot,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
        Operation::SquareRoot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
            Operation::SquareRoot => "square_root",
        }
    }
}

impl FromStr for Operation {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or(CalculationError::InvalidOperation)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluate `operation` on the operands. Only `square_root` ignores `num2`.
pub fn perform_calculation(
    operation: &str,
    num1: f64,
    num2: Option<f64>,
) -> Result<f64, CalculationError> {
    let operation: Operation = operation.parse()?;
    let rhs = || num2.ok_or(CalculationError::MissingOperand(operation));

    let result = match operation {
        Operation::Add => num1 + rhs()?,
        Operation::Subtract => num1 - rhs()?,
        Operation::Multiply => num1 * rhs()?,
        Operation::Divide => {
            let divisor = rhs()?;
            if divisor == 0.0 {
                return Err(CalculationError::DivideByZero);
            }
            num1 / divisor
        }
        Operation::Power => num1.powf(rhs()?),
        Operation::SquareRoot => {
            if num1 < 0.0 {
                return Err(CalculationError::NegativeSquareRoot);
            }
            num1.sqrt()
        }
    };

    // JSON has no NaN or infinity
    if !result.is_finite() {
        return Err(CalculationError::NonFiniteResult(operation));
    }
    Ok(result)
}
