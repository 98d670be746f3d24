//! Complex arithmetic on `a+bj` literals

use crate::format::complex_repr;
use errors::{CalcError, CalcResult};
use num_complex::Complex64;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ComplexOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ComplexOperation {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

// Unsigned decimal: 3, 2.5, .5, 1e3
const DECIMAL: &str = r"(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?";

fn literal_patterns() -> CalcResult<[Regex; 3]> {
    let build = |pattern: String| {
        Regex::new(&pattern)
            .map_err(|e| CalcError::computation(format!("complex literal pattern: {}", e)))
    };
    Ok([
        // real only
        build(format!(r"^(?P<re>[+-]?{DECIMAL})$"))?,
        // imaginary only, coefficient optional: j, -j, 2.5j
        build(format!(r"^(?P<im>[+-]?(?:{DECIMAL})?)[jJ]$"))?,
        // real and imaginary: 3+4j, 1-j
        build(format!(r"^(?P<re>[+-]?{DECIMAL})(?P<im>[+-](?:{DECIMAL})?)[jJ]$"))?,
    ])
}

fn coefficient(text: &str) -> Option<f64> {
    match text {
        "" | "+" => Some(1.0),
        "-" => Some(-1.0),
        _ => text.parse().ok(),
    }
}

/// Parse a complex literal: `3+4j`, `1-2j`, `-2j`, `j`, `5`, optionally parenthesised
pub fn parse_complex(input: &str) -> CalcResult<Complex64> {
    let invalid = || CalcError::InvalidComplex {
        input: input.to_string(),
    };

    let mut text = input.trim();
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        text = inner.trim();
    }

    for pattern in literal_patterns()? {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let re = match caps.name("re") {
            Some(m) => m.as_str().parse::<f64>().map_err(|_| invalid())?,
            None => 0.0,
        };
        let im = match caps.name("im") {
            Some(m) => coefficient(m.as_str()).ok_or_else(invalid)?,
            None => 0.0,
        };
        if !re.is_finite() || !im.is_finite() {
            return Err(invalid());
        }
        return Ok(Complex64::new(re, im));
    }
    Err(invalid())
}

/// Apply the operation and return `(result, calculation)` strings
pub fn complex_arithmetic(
    num1: &str,
    num2: &str,
    operation: ComplexOperation,
) -> CalcResult<(String, String)> {
    let a = parse_complex(num1)?;
    let b = parse_complex(num2)?;

    let result = match operation {
        ComplexOperation::Add => a + b,
        ComplexOperation::Subtract => a - b,
        ComplexOperation::Multiply => a * b,
        ComplexOperation::Divide => {
            if b.re == 0.0 && b.im == 0.0 {
                return Err(CalcError::ComplexDivisionByZero {
                    divisor: num2.to_string(),
                });
            }
            a / b
        },
    };

    let calculation = format!("({}) {} ({})", num1, operation.symbol(), num2);
    let formatted = complex_repr(result);
    debug!(%calculation, result = %formatted, "complex evaluated");
    Ok((formatted, calculation))
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplexRequest {
    /// First operand, e.g. `3+4j`
    pub num1: String,
    /// Second operand, e.g. `1-2j`
    pub num2: String,
    pub operation: ComplexOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplexResponse {
    pub result: String,
    pub calculation: String,
}

pub fn evaluate(request: &ComplexRequest) -> CalcResult<ComplexResponse> {
    let (result, calculation) =
        complex_arithmetic(&request.num1, &request.num2, request.operation)?;
    Ok(ComplexResponse {
        result,
        calculation,
    })
}
