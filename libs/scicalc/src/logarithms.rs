//! Natural, common and arbitrary-base logarithms

use errors::{CalcError, CalcResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum LogFunction {
    /// Base e
    Ln,
    /// Base 10
    Log10,
    /// Custom base, `base` required
    Log,
}

impl LogFunction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Log => "log",
        }
    }
}

/// Check the companion `base` field against the function
fn check_base(function: LogFunction, base: Option<f64>) -> CalcResult<()> {
    let context = format!("the '{}' function", function.name());
    match (function, base) {
        (LogFunction::Log, None) => Err(CalcError::missing_field("base", context)),
        (LogFunction::Log, Some(b)) if b <= 0.0 || b == 1.0 || !b.is_finite() => {
            Err(CalcError::InvalidLogBase { base: b })
        },
        (LogFunction::Ln | LogFunction::Log10, Some(_)) => {
            Err(CalcError::forbidden_field("base", context))
        },
        _ => Ok(()),
    }
}

pub fn evaluate_log(function: LogFunction, value: f64, base: Option<f64>) -> CalcResult<f64> {
    check_base(function, base)?;

    let (result, effective_base) = match (function, base) {
        (LogFunction::Ln, _) => (value.ln(), std::f64::consts::E),
        (LogFunction::Log10, _) => (value.log10(), 10.0),
        (LogFunction::Log, Some(b)) => (value.ln() / b.ln(), b),
        (LogFunction::Log, None) => {
            return Err(CalcError::missing_field("base", "the 'log' function"))
        },
    };

    if !result.is_finite() {
        return Err(CalcError::LogDomain {
            value,
            base: effective_base,
        });
    }

    debug!(
        function = function.name(),
        value,
        base = effective_base,
        result,
        "log evaluated"
    );
    Ok(result)
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LogRequest {
    pub function: LogFunction,
    pub value: f64,
    /// Required if function is `log`, forbidden otherwise
    #[serde(default)]
    pub base: Option<f64>,
}

impl LogRequest {
    pub fn validate(&self) -> CalcResult<()> {
        check_base(self.function, self.base)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LogResponse {
    pub result: f64,
    pub function: LogFunction,
    pub input_value: f64,
    pub base: Option<f64>,
}

pub fn evaluate(request: &LogRequest) -> CalcResult<LogResponse> {
    request.validate()?;
    let result = evaluate_log(request.function, request.value, request.base)?;
    Ok(LogResponse {
        result,
        function: request.function,
        input_value: request.value,
        base: request.base,
    })
}
