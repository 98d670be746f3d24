//! Integer conversion between bases 2, 8, 10 and 16
//!
//! Input follows the usual integer-literal conventions: surrounding whitespace,
//! an optional sign, an optional prefix matching the source base (`0b`, `0o`,
//! `0x`) and single underscores between digits. Values are arbitrary precision.

use errors::{CalcError, CalcResult};
use num_bigint::BigInt;
use num_traits::Num;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum NumberBase {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl NumberBase {
    pub fn radix(self) -> u32 {
        match self {
            Self::Binary => 2,
            Self::Octal => 8,
            Self::Decimal => 10,
            Self::Hexadecimal => 16,
        }
    }

    fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Binary => Some("0b"),
            Self::Octal => Some("0o"),
            Self::Decimal => None,
            Self::Hexadecimal => Some("0x"),
        }
    }
}

impl TryFrom<u32> for NumberBase {
    type Error = CalcError;

    fn try_from(base: u32) -> Result<Self, Self::Error> {
        match base {
            2 => Ok(Self::Binary),
            8 => Ok(Self::Octal),
            10 => Ok(Self::Decimal),
            16 => Ok(Self::Hexadecimal),
            _ => Err(CalcError::UnsupportedBase { base }),
        }
    }
}

impl From<NumberBase> for u32 {
    fn from(base: NumberBase) -> Self {
        base.radix()
    }
}

impl fmt::Display for NumberBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.radix())
    }
}

/// Parse `value` as an integer numeral in `base`
pub fn parse_numeral(value: &str, base: NumberBase) -> CalcResult<BigInt> {
    let invalid = || CalcError::InvalidNumeral {
        value: value.to_string(),
        base: base.radix(),
    };

    let mut text = value.trim();
    let negative = text.starts_with('-');
    if let Some(rest) = text.strip_prefix(['+', '-']) {
        text = rest;
    }

    let mut allow_leading_underscore = false;
    if let Some(prefix) = base.prefix() {
        if text.get(..2).is_some_and(|head| head.eq_ignore_ascii_case(prefix)) {
            text = &text[2..];
            allow_leading_underscore = true;
        }
    }
    if allow_leading_underscore {
        if let Some(rest) = text.strip_prefix('_') {
            text = rest;
        }
    }

    // Underscores only as single separators between digits
    if text.is_empty()
        || text.starts_with('_')
        || text.ends_with('_')
        || text.contains("__")
    {
        return Err(invalid());
    }
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    if !digits.chars().all(|c| c.is_digit(base.radix())) {
        return Err(invalid());
    }

    let magnitude = BigInt::from_str_radix(&digits, base.radix()).map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Render an integer in `base`: no prefix, uppercase hexadecimal, leading `-` when negative
pub fn render_numeral(value: &BigInt, base: NumberBase) -> String {
    let text = value.to_str_radix(base.radix());
    if base == NumberBase::Hexadecimal {
        text.to_uppercase()
    } else {
        text
    }
}

pub fn convert_base(value: &str, from_base: NumberBase, to_base: NumberBase) -> CalcResult<String> {
    let parsed = parse_numeral(value, from_base)?;
    let result = render_numeral(&parsed, to_base);
    debug!(value, %from_base, %to_base, %result, "base converted");
    Ok(result)
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConversionRequest {
    /// Numeral to convert, e.g. `FF`
    pub value: String,
    #[cfg_attr(feature = "openapi", schema(value_type = u32))]
    pub from_base: NumberBase,
    #[cfg_attr(feature = "openapi", schema(value_type = u32))]
    pub to_base: NumberBase,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConversionResponse {
    pub result: String,
    #[cfg_attr(feature = "openapi", schema(value_type = u32))]
    pub from_base: NumberBase,
    #[cfg_attr(feature = "openapi", schema(value_type = u32))]
    pub to_base: NumberBase,
    pub original_value: String,
}

pub fn evaluate(request: &ConversionRequest) -> CalcResult<ConversionResponse> {
    let result = convert_base(&request.value, request.from_base, request.to_base)?;
    Ok(ConversionResponse {
        result,
        from_base: request.from_base,
        to_base: request.to_base,
        original_value: request.value.clone(),
    })
}
