//! Float and complex rendering compatible with the conventional Python forms
//!
//! | Function | 1e20 | 5.0 | 0.1 |
//! |----------|------|-----|-----|
//! | [`float_repr`] | `1e+20` | `5.0` | `0.1` |
//! | [`component_repr`] | `1e+20` | `5` | `0.1` |

use num_complex::Complex64;

/// Decimal digits and exponent of a float: `value = 0.d1d2d3... * 10^(exponent + 1)`
struct Decomposed {
    negative: bool,
    digits: String,
    exponent: i32,
}

fn decompose(value: f64, precision: Option<usize>) -> Decomposed {
    // `{:e}` yields the shortest round-trip digits, `{:.Ne}` a fixed count
    let sci = match precision {
        Some(p) => format!("{:.*e}", p, value),
        None => format!("{:e}", value),
    };
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    Decomposed {
        negative,
        digits,
        exponent: exponent.parse().unwrap_or(0),
    }
}

fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("nan".to_string())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "inf" } else { "-inf" }.to_string())
    } else {
        None
    }
}

fn render_fixed(d: &Decomposed, min_fraction_zero: bool) -> String {
    let mut out = String::new();
    if d.negative {
        out.push('-');
    }
    if d.exponent >= 0 {
        let int_len = d.exponent as usize + 1;
        if d.digits.len() <= int_len {
            out.push_str(&d.digits);
            out.push_str(&"0".repeat(int_len - d.digits.len()));
            if min_fraction_zero {
                out.push_str(".0");
            }
        } else {
            out.push_str(&d.digits[..int_len]);
            out.push('.');
            out.push_str(&d.digits[int_len..]);
        }
    } else {
        out.push_str("0.");
        out.push_str(&"0".repeat((-d.exponent - 1) as usize));
        out.push_str(&d.digits);
    }
    out
}

fn render_scientific(d: &Decomposed, padded_exponent: bool, min_fraction_zero: bool) -> String {
    let mut out = String::new();
    if d.negative {
        out.push('-');
    }
    out.push_str(&d.digits[..1]);
    if d.digits.len() > 1 {
        out.push('.');
        out.push_str(&d.digits[1..]);
    } else if min_fraction_zero {
        out.push_str(".0");
    }
    let sign = if d.exponent < 0 { '-' } else { '+' };
    if padded_exponent {
        out.push_str(&format!("e{}{:02}", sign, d.exponent.abs()));
    } else {
        out.push_str(&format!("e{}{}", sign, d.exponent.abs()));
    }
    out
}

fn repr(value: f64, dot_zero: bool) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    let d = decompose(value, None);
    if (-4..16).contains(&d.exponent) {
        render_fixed(&d, dot_zero)
    } else {
        render_scientific(&d, true, false)
    }
}

/// Shortest round-trip rendering of a float, e.g. `5.0`, `0.1`, `1e+20`
pub fn float_repr(value: f64) -> String {
    repr(value, true)
}

/// Like [`float_repr`] but integral values carry no `.0`, as inside a complex literal
pub fn component_repr(value: f64) -> String {
    repr(value, false)
}

/// Render a complex result: a bare real when the imaginary part is exactly zero,
/// otherwise `a+bj` / `a-bj` / `bj` with no surrounding parentheses
pub fn complex_repr(c: Complex64) -> String {
    if c.im == 0.0 {
        return float_repr(c.re);
    }
    let imag = format!("{}j", component_repr(c.im.abs()));
    if c.re == 0.0 && c.re.is_sign_positive() {
        return if c.im.is_sign_negative() {
            format!("-{}", imag)
        } else {
            imag
        };
    }
    let sign = if c.im.is_sign_negative() { '-' } else { '+' };
    format!("{}{}{}", component_repr(c.re), sign, imag)
}

/// Float rendering used by the symbolic printer: 15 significant digits, fixed
/// notation for exponents in (-5, 15). `strip` removes trailing zeros (keeping `.0`).
pub fn float_sig15(value: f64, strip: bool) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    if value == 0.0 {
        return "0.0".to_string();
    }
    let mut d = decompose(value, Some(14));
    if strip {
        let trimmed = d.digits.trim_end_matches('0');
        d.digits = if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        };
    }
    if d.exponent > -5 && d.exponent < 15 {
        let out = render_fixed(&d, true);
        if out.ends_with('.') {
            format!("{}0", out)
        } else {
            out
        }
    } else {
        render_scientific(&d, false, true)
    }
}

/// Fixed-point with at most 10 decimals, trailing zeros and point stripped (`8.0000000000` -> `8`)
pub fn trimmed_decimal(value: f64) -> String {
    let s = format!("{:.10}", value);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}
