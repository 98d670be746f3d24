//! Trigonometric and hyperbolic functions with angle-unit conversion
//!
//! Degrees affect only the circular functions: `sin`/`cos`/`tan` convert their
//! input to radians, `asin`/`acos`/`atan` convert their output back to degrees.
//! Hyperbolic functions accept the unit and ignore it.

use errors::{CalcError, CalcResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TrigFunction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
}

impl TrigFunction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Asinh => "asinh",
            Self::Acosh => "acosh",
            Self::Atanh => "atanh",
        }
    }

    /// Circular functions taking an angle
    fn takes_angle(self) -> bool {
        matches!(self, Self::Sin | Self::Cos | Self::Tan)
    }

    /// Inverse circular functions returning an angle
    fn returns_angle(self) -> bool {
        matches!(self, Self::Asin | Self::Acos | Self::Atan)
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => x.asin(),
            Self::Acos => x.acos(),
            Self::Atan => x.atan(),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Asinh => x.asinh(),
            Self::Acosh => x.acosh(),
            Self::Atanh => x.atanh(),
        }
    }
}

impl fmt::Display for TrigFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

/// Evaluate a trigonometric function; NaN or infinite results are domain errors
pub fn evaluate_trig(function: TrigFunction, value: f64, unit: AngleUnit) -> CalcResult<f64> {
    let input = if unit == AngleUnit::Degrees && function.takes_angle() {
        value.to_radians()
    } else {
        value
    };

    let mut result = function.apply(input);
    if unit == AngleUnit::Degrees && function.returns_angle() {
        result = result.to_degrees();
    }

    if !result.is_finite() {
        return Err(CalcError::outside_domain(function.name(), value));
    }

    debug!(function = function.name(), value, ?unit, result, "trig evaluated");
    Ok(result)
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TrigRequest {
    pub function: TrigFunction,
    pub value: f64,
    #[serde(default)]
    pub unit: AngleUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TrigResponse {
    pub result: f64,
    pub function: TrigFunction,
    pub input_value: f64,
    pub unit: AngleUnit,
}

pub fn evaluate(request: &TrigRequest) -> CalcResult<TrigResponse> {
    let result = evaluate_trig(request.function, request.value, request.unit)?;
    Ok(TrigResponse {
        result,
        function: request.function,
        input_value: request.value,
        unit: request.unit,
    })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_degrees_convert_circular_input() {
        let r = evaluate_trig(TrigFunction::Sin, 30.0, AngleUnit::Degrees).unwrap();
        assert!((r - 0.5).abs() < EPS);
        let r = evaluate_trig(TrigFunction::Cos, std::f64::consts::PI, AngleUnit::Radians).unwrap();
        assert!((r + 1.0).abs() < EPS);
    }

    #[test]
    fn test_degrees_convert_inverse_output() {
        let r = evaluate_trig(TrigFunction::Asin, 1.0, AngleUnit::Degrees).unwrap();
        assert!((r - 90.0).abs() < EPS);
        let r = evaluate_trig(TrigFunction::Atan, 1.0, AngleUnit::Radians).unwrap();
        assert!((r - std::f64::consts::FRAC_PI_4).abs() < EPS);
    }

    #[test]
    fn test_hyperbolic_ignores_unit() {
        let rad = evaluate_trig(TrigFunction::Sinh, 1.0, AngleUnit::Radians).unwrap();
        let deg = evaluate_trig(TrigFunction::Sinh, 1.0, AngleUnit::Degrees).unwrap();
        assert_eq!(rad, deg);
    }

    #[test]
    fn test_tan_at_right_angle_is_large_not_error() {
        let r = evaluate_trig(TrigFunction::Tan, 90.0, AngleUnit::Degrees).unwrap();
        assert!(r.is_finite());
        assert!(r.abs() > 1e16);
    }

    #[test]
    fn test_domain_errors() {
        for (function, value) in [
            (TrigFunction::Asin, 1.1),
            (TrigFunction::Acos, -2.0),
            (TrigFunction::Acosh, 0.5),
            (TrigFunction::Atanh, 1.0),
        ] {
            let err = evaluate_trig(function, value, AngleUnit::Radians).unwrap_err();
            assert!(matches!(err, CalcError::OutsideDomain { .. }));
            assert!(err.to_string().contains(function.name()));
        }
    }

    #[test]
    fn test_function_names() {
        let request: TrigRequest =
            serde_json::from_str(r#"{"function": "acosh", "value": 2.0}"#).unwrap();
        assert_eq!(request.function, TrigFunction::Acosh);
        assert!(serde_json::from_str::<TrigRequest>(r#"{"function": "sec", "value": 1.0}"#).is_err());
        let request: TrigRequest =
            serde_json::from_str(r#"{"function": "tan", "value": 1.0}"#).unwrap();
        assert_eq!(request.unit, AngleUnit::Radians);
    }
}
