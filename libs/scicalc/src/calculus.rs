//! Differentiation and integration of single-variable expressions
//!
//! Indefinite integrals carry no constant term. Before a definite integral is
//! evaluated, the bounds are scanned for singularities: zeros of denominators,
//! of logarithm arguments and of `cos` under a tangent. A pole whose growth is
//! at least `1/|x - x0|` makes the integral divergent; weaker (integrable)
//! singularities split the interval. Each piece is the antiderivative evaluated
//! at its ends, or adaptive Simpson quadrature when there is no closed form.

use crate::format::trimmed_decimal;
use crate::symbolic::{self, Expr, Func};
use errors::{CalcError, CalcResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Grid intervals used to scan the bounds
const SCAN_POINTS: usize = 4096;
const BISECTION_STEPS: usize = 200;
const GOLDEN_STEPS: usize = 100;
/// `|f|` growing like `|x - x0|^-p` with `p` at least this is not integrable
const POLE_ORDER: f64 = 0.999;
/// Below this growth exponent a point is regular
const REGULAR_ORDER: f64 = 0.01;
const QUADRATURE_TOLERANCE: f64 = 1e-10;
/// Relative change under which a Simpson panel is settled by rounding alone
const QUADRATURE_RELATIVE: f64 = 1e-13;
const QUADRATURE_MAX_DEPTH: u32 = 18;
/// Fraction of a panel by which a singular endpoint is stepped inside
const ENDPOINT_NUDGE: f64 = 1e-9;
/// Offsets used to approach a bound where the antiderivative is undefined
const APPROACH_STEPS: [f64; 2] = [1e-12, 1e-14];
const APPROACH_AGREEMENT: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum CalculusOperation {
    Differentiate,
    Integrate,
}

impl CalculusOperation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Differentiate => "differentiate",
            Self::Integrate => "integrate",
        }
    }
}

/// Value of `f` at `x`, approached from `toward` when `f(x)` itself is undefined
fn approach(f: &Expr, x: f64, toward: f64) -> Option<f64> {
    let direct = f.eval(x);
    if direct.is_finite() {
        return Some(direct);
    }
    let dir = if toward >= x { 1.0 } else { -1.0 };
    let scale = x.abs().max(1.0);
    let [near, nearer] = APPROACH_STEPS.map(|h| f.eval(x + dir * h * scale));
    (near.is_finite() && nearer.is_finite() && (near - nearer).abs() < APPROACH_AGREEMENT)
        .then_some(nearer)
}

/// Subexpressions whose zeros are candidate singularities of `e`
fn singular_factors(e: &Expr, out: &mut Vec<Expr>) {
    match e {
        Expr::Add(items) | Expr::Mul(items) => {
            items.iter().for_each(|item| singular_factors(item, out))
        },
        Expr::Pow(base, exp) => {
            if !base.is_free_of_x() && exp.is_free_of_x() && exp.eval(0.0) < 0.0 {
                out.push((**base).clone());
            }
            singular_factors(base, out);
            singular_factors(exp, out);
        },
        Expr::Func(f, arg) => {
            if !arg.is_free_of_x() {
                match f {
                    Func::Log => out.push((**arg).clone()),
                    Func::Tan => out.push(Expr::Func(Func::Cos, arg.clone())),
                    _ => {},
                }
            }
            singular_factors(arg, out);
        },
        Expr::Num(_) | Expr::Var | Expr::Const(_) | Expr::Integral(_) => {},
    }
}

fn bisect(g: &Expr, mut lo: f64, mut hi: f64, g_lo: f64) -> f64 {
    let negative_at_lo = g_lo < 0.0;
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let v = g.eval(mid);
        if v == 0.0 {
            return mid;
        }
        if (v < 0.0) == negative_at_lo {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Point of smallest `|g|` in `[lo, hi]`, assuming a single dip
fn golden_min(g: &Expr, mut lo: f64, mut hi: f64) -> f64 {
    let inv_phi = (5f64.sqrt() - 1.0) / 2.0;
    for _ in 0..GOLDEN_STEPS {
        let c = hi - inv_phi * (hi - lo);
        let d = lo + inv_phi * (hi - lo);
        if g.eval(c).abs() < g.eval(d).abs() {
            hi = d;
        } else {
            lo = c;
        }
    }
    0.5 * (lo + hi)
}

/// Points of the grid span where `g` vanishes, changes sign or dips towards zero
fn near_zeros(g: &Expr, grid: &[f64]) -> Vec<f64> {
    let values: Vec<f64> = grid.iter().map(|&x| g.eval(x)).collect();
    let mut points = Vec::new();
    for i in 0..grid.len() {
        let v = values[i];
        if v == 0.0 {
            points.push(grid[i]);
            continue;
        }
        if let Some(&w) = values.get(i + 1) {
            if v.is_finite() && w.is_finite() && w != 0.0 && v.signum() != w.signum() {
                points.push(bisect(g, grid[i], grid[i + 1], v));
            }
        }
        if i > 0 && i + 1 < grid.len() && v.abs() < values[i - 1].abs() && v.abs() <= values[i + 1].abs()
        {
            points.push(golden_min(g, grid[i - 1], grid[i + 1]));
        }
    }
    points
}

/// Exponent `p` of the growth `|f| ~ |x - x0|^-p` approaching `x0` from `side`
///
/// Infinite when `f` is not finite right next to `x0`.
fn growth_order(f: &Expr, x0: f64, side: f64, room: f64) -> f64 {
    let scale = x0.abs().max(1.0);
    let far_step = (1e-4 * scale).min(room / 4.0);
    let near_step = (far_step * 1e-4).max(8.0 * f64::EPSILON * scale);
    if near_step >= far_step {
        return 0.0;
    }
    let far = f.eval(x0 + side * far_step).abs();
    let near = f.eval(x0 + side * near_step).abs();
    if !far.is_finite() || !near.is_finite() {
        return f64::INFINITY;
    }
    if far == 0.0 || near <= far {
        return 0.0;
    }
    (near / far).ln() / (far_step / near_step).ln()
}

fn diverges(integrand: &Expr, lower: f64, upper: f64, at: f64) -> CalcError {
    CalcError::non_finite(format!(
        "the integral of '{}' from {} to {} diverges: the integrand is unbounded near x = {}",
        integrand, lower, upper, at
    ))
}

/// Interior points where the integrand has an integrable singularity
///
/// Fails when the integrand is undefined somewhere in `[a, b]` or has a
/// non-integrable pole there, endpoints included.
fn singular_points(f: &Expr, a: f64, b: f64) -> CalcResult<Vec<f64>> {
    let grid: Vec<f64> = (0..=SCAN_POINTS)
        .map(|k| a + (b - a) * k as f64 / SCAN_POINTS as f64)
        .collect();

    let mut candidates = Vec::new();
    for &x in &grid[1..SCAN_POINTS] {
        let y = f.eval(x);
        if y.is_infinite() {
            candidates.push(x);
        } else if y.is_nan() {
            // 0*inf at an isolated point, e.g. sin(x)/x at 0
            let h = ENDPOINT_NUDGE * x.abs().max(1.0);
            if !(f.eval(x - h).is_finite() && f.eval(x + h).is_finite()) {
                return Err(CalcError::non_finite(format!(
                    "the integrand '{}' is undefined at x = {} inside the bounds",
                    f, x
                )));
            }
            candidates.push(x);
        }
    }

    let mut factors = Vec::new();
    singular_factors(f, &mut factors);
    for g in &factors {
        candidates.extend(near_zeros(g, &grid));
    }

    for (x0, side) in [(a, 1.0), (b, -1.0)] {
        if growth_order(f, x0, side, b - a) >= POLE_ORDER {
            return Err(diverges(f, a, b, x0));
        }
    }

    candidates.retain(|&x| x > a && x < b);
    candidates.sort_by(f64::total_cmp);
    candidates.dedup_by(|x, y| (*x - *y).abs() <= 1e-12 * x.abs().max(1.0));

    let mut breaks = Vec::new();
    for x0 in candidates {
        let room = (x0 - a).min(b - x0);
        let order = growth_order(f, x0, -1.0, room).max(growth_order(f, x0, 1.0, room));
        if order >= POLE_ORDER {
            return Err(diverges(f, a, b, x0));
        }
        if order > REGULAR_ORDER || !f.eval(x0).is_finite() {
            breaks.push(x0);
        }
    }
    Ok(breaks)
}

struct Simpson<'a> {
    f: &'a Expr,
}

impl Simpson<'_> {
    fn estimate(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
        (b - a) / 6.0 * (fa + 4.0 * fm + fb)
    }

    /// `f(x)`, or `f` just inside the panel when `x` is a singular endpoint
    fn sample(&self, x: f64, toward: f64) -> f64 {
        let y = self.f.eval(x);
        if y.is_finite() {
            return y;
        }
        self.f.eval(x + (toward - x) * ENDPOINT_NUDGE)
    }

    /// `None` when a panel is still unsettled at the depth limit
    #[allow(clippy::too_many_arguments)]
    fn refine(
        &self,
        a: f64,
        b: f64,
        fa: f64,
        fm: f64,
        fb: f64,
        whole: f64,
        tol: f64,
        depth: u32,
    ) -> Option<f64> {
        let m = (a + b) / 2.0;
        let (lm, rm) = ((a + m) / 2.0, (m + b) / 2.0);
        let (flm, frm) = (self.f.eval(lm), self.f.eval(rm));
        let left = Self::estimate(a, m, fa, flm, fm);
        let right = Self::estimate(m, b, fm, frm, fb);
        let delta = left + right - whole;
        if !delta.is_finite() {
            return None;
        }
        if delta.abs() <= 15.0 * tol || delta.abs() <= QUADRATURE_RELATIVE * (left + right).abs() {
            return Some(left + right + delta / 15.0);
        }
        if depth == 0 {
            return None;
        }
        Some(
            self.refine(a, m, fa, flm, fm, left, tol / 2.0, depth - 1)?
                + self.refine(m, b, fm, frm, fb, right, tol / 2.0, depth - 1)?,
        )
    }

    fn integrate(&self, a: f64, b: f64) -> Option<f64> {
        let m = (a + b) / 2.0;
        let (fa, fm, fb) = (self.sample(a, b), self.f.eval(m), self.sample(b, a));
        let whole = Self::estimate(a, b, fa, fm, fb);
        self.refine(a, b, fa, fm, fb, whole, QUADRATURE_TOLERANCE, QUADRATURE_MAX_DEPTH)
    }
}

/// Closed form over consecutive pieces, or `None` when it cannot be evaluated
fn closed_form(integrand: &Expr, cuts: &[f64]) -> Option<f64> {
    let anti = symbolic::integrate(integrand)?;
    let mut total = 0.0;
    for piece in cuts.windows(2) {
        let (lo, hi) = (piece[0], piece[1]);
        total += approach(&anti, hi, lo)? - approach(&anti, lo, hi)?;
    }
    total.is_finite().then_some(total)
}

fn quadrature(integrand: &Expr, cuts: &[f64]) -> CalcResult<f64> {
    let (a, b) = (cuts[0], cuts[cuts.len() - 1]);
    let mut total = 0.0;
    for piece in cuts.windows(2) {
        let value = Simpson { f: integrand }
            .integrate(piece[0], piece[1])
            .ok_or_else(|| {
                CalcError::non_finite(format!(
                    "the integral of '{}' from {} to {} does not converge",
                    integrand, a, b
                ))
            })?;
        total += value;
    }
    if !total.is_finite() {
        return Err(CalcError::non_finite(format!(
            "the integral of '{}' from {} to {} diverges",
            integrand, a, b
        )));
    }
    debug!(%integrand, a, b, total, "definite integral by quadrature");
    Ok(total)
}

pub fn definite_integral(integrand: &Expr, lower: f64, upper: f64) -> CalcResult<f64> {
    if lower == upper {
        return Ok(0.0);
    }
    let (a, b) = if lower < upper { (lower, upper) } else { (upper, lower) };

    let mut cuts = vec![a];
    cuts.extend(singular_points(integrand, a, b)?);
    cuts.push(b);

    let value = match closed_form(integrand, &cuts) {
        Some(value) => value,
        None => quadrature(integrand, &cuts)?,
    };
    Ok(if lower < upper { value } else { -value })
}

/// Run the operation; returns the result string and whether it is a definite integral
pub fn calculus_operation(
    expression: &str,
    operation: CalculusOperation,
    bounds: Option<(f64, f64)>,
) -> CalcResult<(String, bool)> {
    if operation == CalculusOperation::Differentiate && bounds.is_some() {
        return Err(CalcError::forbidden_field("integration_bounds", "differentiation"));
    }
    let parsed = symbolic::parse(expression)?;

    let outcome = match (operation, bounds) {
        (CalculusOperation::Differentiate, _) => {
            (symbolic::differentiate(&parsed).to_string(), false)
        },
        (CalculusOperation::Integrate, None) => {
            let anti = symbolic::integrate(&parsed)
                .unwrap_or_else(|| Expr::Integral(Box::new(parsed.clone())));
            (anti.to_string(), false)
        },
        (CalculusOperation::Integrate, Some((lower, upper))) => {
            let value = definite_integral(&parsed, lower, upper)?;
            (trimmed_decimal(value), true)
        },
    };

    debug!(expression, operation = operation.name(), result = %outcome.0, "calculus evaluated");
    Ok(outcome)
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalculusRequest {
    /// Expression in `x`, e.g. `x**2 + sin(x)`
    pub expression: String,
    pub operation: CalculusOperation,
    /// `[lower, upper]`; integrate only
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<f64>>))]
    pub integration_bounds: Option<(f64, f64)>,
}

impl CalculusRequest {
    pub fn validate(&self) -> CalcResult<()> {
        if self.operation == CalculusOperation::Differentiate && self.integration_bounds.is_some() {
            return Err(CalcError::forbidden_field("integration_bounds", "differentiation"));
        }
        if self.expression.trim().is_empty() {
            return Err(CalcError::EmptyExpression);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalculusResponse {
    pub result: String,
    pub input_expression: String,
    pub operation: CalculusOperation,
    pub is_definite_integral: bool,
}

pub fn evaluate(request: &CalculusRequest) -> CalcResult<CalculusResponse> {
    request.validate()?;
    let (result, is_definite_integral) = calculus_operation(
        &request.expression,
        request.operation,
        request.integration_bounds,
    )?;
    Ok(CalculusResponse {
        result,
        input_expression: request.expression.clone(),
        operation: request.operation,
        is_definite_integral,
    })
}
