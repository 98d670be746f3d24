//! Polynomial root solver and display formatter
//!
//! Roots are the eigenvalues of the companion matrix, so their order is whatever
//! the eigen-solver produces and callers must compare them as a set.

use errors::{CalcError, CalcResult};
use nalgebra::DMatrix;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coefficients within this distance of zero are treated as zero
const ZERO_TOL: f64 = 1e-8;
/// Relative tolerance used when deciding whether a coefficient is ±1
const UNIT_RTOL: f64 = 1e-5;

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ZERO_TOL + UNIT_RTOL * b.abs()
}

/// Render coefficients (descending power) as e.g. `x**2 - 3*x + 2`
pub fn format_polynomial(coefficients: &[f64]) -> String {
    if coefficients.iter().all(|&c| c == 0.0) {
        return "0".to_string();
    }

    let degree = coefficients.len().saturating_sub(1);
    let mut out = String::new();
    for (i, &coeff) in coefficients.iter().enumerate() {
        if is_close(coeff, 0.0) {
            continue;
        }
        let power = degree - i;

        let sign = match (out.is_empty(), coeff < 0.0) {
            (true, true) => "-",
            (true, false) => "",
            (false, true) => " - ",
            (false, false) => " + ",
        };

        let magnitude = coeff.abs();
        let coeff_str = if is_close(magnitude, 1.0) && power > 0 {
            String::new()
        } else {
            let fixed = format!("{:.1}", magnitude);
            fixed.strip_suffix(".0").map(str::to_string).unwrap_or(fixed)
        };

        let var_str = match power {
            0 => String::new(),
            1 => "x".to_string(),
            p => format!("x**{}", p),
        };

        let joiner = if !coeff_str.is_empty() && !var_str.is_empty() {
            "*"
        } else {
            ""
        };
        out.push_str(sign);
        out.push_str(&coeff_str);
        out.push_str(joiner);
        out.push_str(&var_str);
    }
    out
}

/// Render a root: `R.RRRR` when real, `R.RRRR±I.IIIIj` otherwise
pub fn format_root(root: Complex64) -> String {
    if root.im.abs() <= ZERO_TOL {
        format!("{:.4}", root.re)
    } else {
        let real = if root.re.abs() <= ZERO_TOL { 0.0 } else { root.re };
        format!("{:.4}{:+.4}j", real, root.im)
    }
}

/// All roots of the polynomial with the given coefficients (descending power)
pub fn polynomial_roots(coefficients: &[f64]) -> CalcResult<Vec<Complex64>> {
    // Leading zeros lower the degree; trailing zeros are roots at the origin
    let start = coefficients
        .iter()
        .position(|&c| c != 0.0)
        .unwrap_or(coefficients.len());
    let trimmed = &coefficients[start..];
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let end = trimmed
        .iter()
        .rposition(|&c| c != 0.0)
        .map_or(0, |i| i + 1);
    let zero_roots = trimmed.len() - end;
    let core = &trimmed[..end];

    let degree = core.len() - 1;
    let mut roots = Vec::with_capacity(degree + zero_roots);
    if degree == 1 {
        roots.push(Complex64::new(-core[1] / core[0], 0.0));
    } else if degree > 1 {
        let leading = core[0];
        let mut companion = DMatrix::<Complex64>::zeros(degree, degree);
        for row in 1..degree {
            companion[(row, row - 1)] = Complex64::new(1.0, 0.0);
        }
        for (column, coeff) in core.iter().skip(1).enumerate() {
            companion[(0, column)] = Complex64::new(-coeff / leading, 0.0);
        }
        let eigenvalues = companion.eigenvalues().ok_or_else(|| {
            CalcError::computation("failed to compute eigenvalues of the companion matrix")
        })?;
        roots.extend(eigenvalues.iter().copied());
    }
    roots.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(zero_roots));
    Ok(roots)
}

/// Solve and format; fewer than two coefficients is a domain error
pub fn solve_polynomial(coefficients: &[f64]) -> CalcResult<(Vec<String>, String)> {
    if coefficients.len() < 2 {
        return Err(CalcError::InsufficientCoefficients {
            count: coefficients.len(),
        });
    }

    let polynomial = format_polynomial(coefficients);
    let roots: Vec<String> = polynomial_roots(coefficients)?
        .into_iter()
        .map(format_root)
        .collect();

    debug!(%polynomial, roots = roots.len(), "polynomial solved");
    Ok((roots, polynomial))
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PolynomialRequest {
    /// Coefficients in descending power order, e.g. `[1, -3, 2]` for x² - 3x + 2
    pub coefficients: Vec<f64>,
}

impl PolynomialRequest {
    pub fn validate(&self) -> CalcResult<()> {
        if self.coefficients.is_empty() {
            return Err(CalcError::empty_collection("coefficients"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PolynomialResponse {
    pub roots: Vec<String>,
    pub polynomial: String,
}

pub fn evaluate(request: &PolynomialRequest) -> CalcResult<PolynomialResponse> {
    request.validate()?;
    let (roots, polynomial) = solve_polynomial(&request.coefficients)?;
    Ok(PolynomialResponse { roots, polynomial })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn root_set(coefficients: &[f64]) -> BTreeSet<String> {
        solve_polynomial(coefficients).unwrap().0.into_iter().collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_real_roots() {
        assert_eq!(root_set(&[1.0, -3.0, 2.0]), set(&["1.0000", "2.0000"]));
        assert_eq!(
            solve_polynomial(&[1.0, -3.0, 2.0]).unwrap().1,
            "x**2 - 3*x + 2"
        );
    }

    #[test]
    fn test_complex_roots() {
        assert_eq!(
            root_set(&[1.0, 0.0, 4.0]),
            set(&["0.0000+2.0000j", "0.0000-2.0000j"])
        );
    }

    #[test]
    fn test_linear_and_cubic() {
        assert_eq!(root_set(&[2.0, -4.0]), set(&["2.0000"]));
        assert_eq!(
            root_set(&[1.0, -6.0, 11.0, -6.0]),
            set(&["1.0000", "2.0000", "3.0000"])
        );
    }

    #[test]
    fn test_trailing_zeros_give_zero_roots() {
        let (roots, _) = solve_polynomial(&[1.0, -1.0, 0.0]).unwrap();
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&"0.0000".to_string()));
        assert!(roots.contains(&"1.0000".to_string()));
    }

    #[test]
    fn test_insufficient_coefficients() {
        for coefficients in [vec![], vec![5.0]] {
            let err = solve_polynomial(&coefficients).unwrap_err();
            assert!(matches!(err, CalcError::InsufficientCoefficients { .. }));
            assert!(err.to_string().contains("At least two coefficients"));
        }
        let request = PolynomialRequest {
            coefficients: vec![],
        };
        assert!(matches!(
            request.validate(),
            Err(CalcError::EmptyCollection { .. })
        ));
    }

    #[test]
    fn test_format_polynomial() {
        assert_eq!(format_polynomial(&[0.0, 0.0]), "0");
        assert_eq!(format_polynomial(&[1.0, 0.0, -4.0]), "x**2 - 4");
        assert_eq!(format_polynomial(&[-1.0, 2.5, -1.0]), "-x**2 + 2.5*x - 1");
        assert_eq!(format_polynomial(&[0.0, 3.0, 1.0]), "3*x + 1");
        assert_eq!(format_polynomial(&[2.0, 0.0, 0.0, 1.0]), "2*x**3 + 1");
    }

    #[test]
    fn test_format_root_snaps_real_part() {
        assert_eq!(format_root(Complex64::new(1e-12, 2.0)), "0.0000+2.0000j");
        assert_eq!(format_root(Complex64::new(-0.5, -1.25)), "-0.5000-1.2500j");
        assert_eq!(format_root(Complex64::new(3.0, 1e-10)), "3.0000");
    }
}
