//! Antiderivatives with respect to `x`
//!
//! Covers polynomials, constant multiples, sums, power and reciprocal rules, the
//! elementary functions of a linear argument, `1/(x**2 + 1)`, `1/sqrt(1 - x**2)`
//! and integration by parts for a polynomial times `sin`, `cos` or `exp` of a
//! linear argument. Anything else yields `None` and the caller keeps the
//! integral unevaluated.

use super::diff::differentiate;
use super::expr::{add, div, func, mul, neg, pow, sub, Expr, Func, Number};

/// Highest power expanded when reading an expression as a polynomial
const MAX_EXPANDED_DEGREE: i64 = 64;

/// Coefficients in ascending powers of `x`, if `e` is a polynomial with numeric coefficients
fn polynomial_coeffs(e: &Expr) -> Option<Vec<Number>> {
    match e {
        Expr::Num(n) => Some(vec![n.clone()]),
        Expr::Var => Some(vec![Number::int(0), Number::int(1)]),
        Expr::Add(terms) => {
            let mut total = vec![Number::int(0)];
            for term in terms {
                total = poly_add(&total, &polynomial_coeffs(term)?);
            }
            Some(total)
        },
        Expr::Mul(factors) => {
            let mut total = vec![Number::int(1)];
            for factor in factors {
                total = poly_mul(&total, &polynomial_coeffs(factor)?);
            }
            Some(total)
        },
        Expr::Pow(base, exp) => {
            let Expr::Num(n) = &**exp else {
                return None;
            };
            let n = n.as_i64().filter(|n| (0..=MAX_EXPANDED_DEGREE).contains(n))?;
            let base = polynomial_coeffs(base)?;
            let mut total = vec![Number::int(1)];
            for _ in 0..n {
                total = poly_mul(&total, &base);
            }
            Some(total)
        },
        _ => None,
    }
}

fn poly_add(a: &[Number], b: &[Number]) -> Vec<Number> {
    let zero = Number::int(0);
    (0..a.len().max(b.len()))
        .map(|i| a.get(i).unwrap_or(&zero).add(b.get(i).unwrap_or(&zero)))
        .collect()
}

fn poly_mul(a: &[Number], b: &[Number]) -> Vec<Number> {
    let mut out = vec![Number::int(0); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] = out[i + j].add(&x.mul(y));
        }
    }
    out
}

fn integrate_polynomial(coeffs: &[Number]) -> Expr {
    let terms = coeffs
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_zero())
        .map(|(k, c)| {
            let k = k as i64;
            mul(vec![
                Expr::Num(c.mul(&Number::ratio(1, k + 1))),
                pow(Expr::Var, Expr::int(k + 1)),
            ])
        })
        .collect();
    add(terms)
}

/// `(a, b)` when `e == a*x + b` with `a != 0`
fn linear_parts(e: &Expr) -> Option<(Expr, Expr)> {
    let coeffs = polynomial_coeffs(e)?;
    match coeffs.as_slice() {
        [b, a] if !a.is_zero() => Some((Expr::Num(a.clone()), Expr::Num(b.clone()))),
        _ => None,
    }
}

fn matches_polynomial(e: &Expr, expected: &[i64]) -> bool {
    polynomial_coeffs(e).is_some_and(|coeffs| {
        coeffs.len() == expected.len()
            && coeffs
                .iter()
                .zip(expected)
                .all(|(c, &want)| *c == Number::int(want))
    })
}

/// Antiderivative of `f(u)` in terms of `u`, before dividing by `du/dx`
fn function_table(f: Func, u: &Expr) -> Expr {
    let u = u.clone();
    let u_squared = || pow(u.clone(), Expr::int(2));
    match f {
        Func::Sin => neg(func(Func::Cos, u)),
        Func::Cos => func(Func::Sin, u),
        Func::Tan => neg(func(Func::Log, func(Func::Cos, u))),
        Func::Sinh => func(Func::Cosh, u),
        Func::Cosh => func(Func::Sinh, u),
        Func::Tanh => sub(
            u.clone(),
            func(Func::Log, add(vec![func(Func::Tanh, u), Expr::int(1)])),
        ),
        Func::Exp => func(Func::Exp, u),
        Func::Log => sub(mul(vec![u.clone(), func(Func::Log, u.clone())]), u),
        Func::Atan => sub(
            mul(vec![u.clone(), func(Func::Atan, u.clone())]),
            div(
                func(Func::Log, add(vec![u_squared(), Expr::int(1)])),
                Expr::int(2),
            ),
        ),
        Func::Asin => add(vec![
            mul(vec![u.clone(), func(Func::Asin, u.clone())]),
            pow(add(vec![Expr::int(1), neg(u_squared())]), Expr::ratio(1, 2)),
        ]),
        Func::Acos => sub(
            mul(vec![u.clone(), func(Func::Acos, u.clone())]),
            pow(add(vec![Expr::int(1), neg(u_squared())]), Expr::ratio(1, 2)),
        ),
    }
}

fn integrate_power(e: &Expr, base: &Expr, exp: &Expr) -> Option<Expr> {
    if exp.is_free_of_x() {
        if let Expr::Num(n) = exp {
            if n.equals_ratio(-1, 1) && matches_polynomial(base, &[1, 0, 1]) {
                return Some(func(Func::Atan, Expr::Var));
            }
            if n.equals_ratio(-1, 2) && matches_polynomial(base, &[1, 0, -1]) {
                return Some(func(Func::Asin, Expr::Var));
            }
        }
        let (a, _) = linear_parts(base)?;
        if matches!(exp, Expr::Num(n) if n.equals_ratio(-1, 1)) {
            return Some(div(func(Func::Log, base.clone()), a));
        }
        let raised = add(vec![exp.clone(), Expr::int(1)]);
        return Some(div(
            pow(base.clone(), raised.clone()),
            mul(vec![a, raised]),
        ));
    }
    if base.is_free_of_x() {
        // c**(a*x + b) -> c**(a*x + b)/(a*log(c))
        let (a, _) = linear_parts(exp)?;
        return Some(div(e.clone(), mul(vec![a, func(Func::Log, base.clone())])));
    }
    None
}

fn integrate_function(f: Func, arg: &Expr) -> Option<Expr> {
    let (a, _) = linear_parts(arg)?;
    Some(div(function_table(f, arg), a))
}

/// Kernels whose repeated antiderivatives stay in closed form
fn is_parts_kernel(e: &Expr) -> bool {
    matches!(e, Expr::Func(Func::Sin | Func::Cos | Func::Exp, arg) if linear_parts(arg).is_some())
}

/// Integration by parts for `p(x) * g(x)` with polynomial `p` and a kernel `g`
fn integrate_by_parts(factors: &[Expr]) -> Option<Expr> {
    let position = factors.iter().position(is_parts_kernel)?;
    let kernel = &factors[position];
    let mut rest = factors.to_vec();
    rest.remove(position);
    let p = mul(rest);
    polynomial_coeffs(&p)?;

    let g = integrate(kernel)?;
    let dp = differentiate(&p);
    let first = mul(vec![p, g.clone()]);
    if dp.is_zero() {
        return Some(first);
    }
    let remainder = integrate(&mul(vec![dp, g]))?;
    Some(sub(first, remainder))
}

/// Indefinite integral without the constant, or `None` when no rule applies
pub fn integrate(e: &Expr) -> Option<Expr> {
    if e.is_free_of_x() {
        return Some(mul(vec![e.clone(), Expr::Var]));
    }
    if let Some(coeffs) = polynomial_coeffs(e) {
        return Some(integrate_polynomial(&coeffs));
    }
    match e {
        Expr::Add(terms) => {
            let parts = terms.iter().map(integrate).collect::<Option<Vec<_>>>()?;
            Some(add(parts))
        },
        Expr::Mul(factors) => {
            let (constant, dependent): (Vec<Expr>, Vec<Expr>) =
                factors.iter().cloned().partition(Expr::is_free_of_x);
            if !constant.is_empty() {
                let mut out = constant;
                out.push(integrate(&mul(dependent))?);
                return Some(mul(out));
            }
            integrate_by_parts(factors)
        },
        Expr::Pow(base, exp) => integrate_power(e, base, exp),
        Expr::Func(f, arg) => integrate_function(*f, arg),
        Expr::Num(_) | Expr::Var | Expr::Const(_) | Expr::Integral(_) => None,
    }
}
