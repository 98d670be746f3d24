//! Canonical text form of expressions
//!
//! Output follows the conventional computer-algebra string form: `**` for powers,
//! `sqrt(..)` for square roots, fractions pulled into `a/b`, and sum terms in
//! lexicographic monomial order (`3*x**2 + cos(x)`, `x*sin(x) + cos(x)`).

use super::expr::{self, Constant, Expr, Number};
use crate::format::float_sig15;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive};
use std::cmp::Ordering;

const PREC_ADD: u8 = 40;
const PREC_MUL: u8 = 50;
// Unary minus binds between multiplication and exponentiation
const PREC_NEG: u8 = 55;
const PREC_POW: u8 = 60;
const PREC_FUNC: u8 = 70;
const PREC_ATOM: u8 = 100;

/// Render a complete expression; a bare float keeps all 15 digits
pub fn print(e: &Expr) -> String {
    match e {
        Expr::Num(Number::Float(v)) => float_sig15(*v, false),
        other => render(other),
    }
}

/// Render a subexpression; floats drop trailing zeros
pub fn print_nested(e: &Expr) -> String {
    render(e)
}

fn render(e: &Expr) -> String {
    match e {
        Expr::Num(n) => render_number(n),
        Expr::Var => "x".to_string(),
        Expr::Const(c) => constant_name(*c).to_string(),
        Expr::Add(terms) => render_add(terms),
        Expr::Mul(factors) => render_mul(factors),
        Expr::Pow(b, e) => render_pow(b, e),
        Expr::Func(f, arg) => format!("{}({})", f.name(), render(arg)),
        Expr::Integral(inner) => format!("Integral({}, x)", render(inner)),
    }
}

fn render_number(n: &Number) -> String {
    match n {
        Number::Rational(r) if r.is_integer() => r.numer().to_string(),
        Number::Rational(r) => format!("{}/{}", r.numer(), r.denom()),
        Number::Float(v) => float_sig15(*v, true),
    }
}

fn constant_name(c: Constant) -> &'static str {
    match c {
        Constant::Pi => "pi",
        Constant::E => "E",
        Constant::ComplexInfinity => "zoo",
    }
}

fn precedence(e: &Expr) -> u8 {
    match e {
        Expr::Num(Number::Rational(r)) => {
            if r.is_negative() {
                PREC_ADD
            } else if r.is_integer() {
                PREC_ATOM
            } else {
                PREC_MUL
            }
        },
        Expr::Num(Number::Float(v)) => {
            if *v < 0.0 {
                PREC_ADD
            } else {
                PREC_ATOM
            }
        },
        Expr::Var | Expr::Const(_) | Expr::Integral(_) => PREC_ATOM,
        Expr::Add(_) => PREC_ADD,
        Expr::Mul(_) if e.could_extract_minus_sign() => PREC_ADD,
        Expr::Mul(_) => PREC_MUL,
        Expr::Pow(_, _) => PREC_POW,
        Expr::Func(_, _) => PREC_FUNC,
    }
}

fn parenthesize(e: &Expr, level: u8) -> String {
    if precedence(e) <= level {
        format!("({})", render(e))
    } else {
        render(e)
    }
}

fn render_pow(base: &Expr, exp: &Expr) -> String {
    if let Expr::Num(n) = exp {
        if n.equals_ratio(1, 2) {
            return format!("sqrt({})", render(base));
        }
        if n.equals_ratio(-1, 2) {
            return format!("1/sqrt({})", render(base));
        }
        if n.equals_ratio(-1, 1) {
            return format!("1/{}", parenthesize(base, PREC_POW));
        }
    }
    format!(
        "{}**{}",
        parenthesize(base, PREC_POW),
        parenthesize(exp, PREC_POW)
    )
}

/// Exponent is a negative number or carries a negative coefficient
fn has_negative_exponent(exp: &Expr) -> bool {
    exp.could_extract_minus_sign()
}

fn render_mul(factors: &[Expr]) -> String {
    let prec = precedence(&Expr::Mul(factors.to_vec()));
    let mut items = factors.to_vec();
    let mut sign = "";
    if let Some(Expr::Num(c)) = items.first() {
        if c.is_negative() {
            sign = "-";
            let positive = c.neg();
            if positive.is_one() {
                items.remove(0);
            } else {
                items[0] = Expr::Num(positive);
            }
        }
    }
    items.sort_by(|a, b| sort_key(a).compare(&sort_key(b)));

    let mut numer: Vec<Expr> = Vec::new();
    let mut denom: Vec<Expr> = Vec::new();
    for item in items {
        match item {
            Expr::Pow(base, exp) if has_negative_exponent(&exp) => {
                let flipped = expr::neg(*exp);
                if matches!(&flipped, Expr::Num(n) if n.is_one()) {
                    denom.push(*base);
                } else {
                    denom.push(Expr::Pow(base, Box::new(flipped)));
                }
            },
            Expr::Num(Number::Rational(r)) => {
                if !r.numer().is_one() {
                    numer.push(integer(r.numer()));
                }
                if !r.denom().is_one() {
                    denom.push(integer(r.denom()));
                }
            },
            other => numer.push(other),
        }
    }
    if numer.is_empty() {
        numer.push(Expr::int(1));
    }

    let a_str: Vec<String> = if numer.len() == 1 && !sign.is_empty() {
        vec![parenthesize(&numer[0], PREC_NEG)]
    } else {
        numer.iter().map(|x| parenthesize(x, prec)).collect()
    };
    let b_str: Vec<String> = denom.iter().map(|x| parenthesize(x, prec)).collect();

    match b_str.len() {
        0 => format!("{}{}", sign, a_str.join("*")),
        1 => format!("{}{}/{}", sign, a_str.join("*"), b_str[0]),
        _ => format!("{}{}/({})", sign, a_str.join("*"), b_str.join("*")),
    }
}

fn integer(n: &BigInt) -> Expr {
    Expr::Num(Number::Rational(BigRational::from_integer(n.clone())))
}

fn render_add(terms: &[Expr]) -> String {
    let mut out = String::new();
    for (i, term) in ordered_terms(terms).into_iter().enumerate() {
        let text = render(term);
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest.to_string()),
            None => (false, text),
        };
        if i == 0 {
            if negative {
                out.push('-');
            }
        } else {
            out.push_str(if negative { " - " } else { " + " });
        }
        out.push_str(&body);
    }
    out
}

/// Ordering key for factors and generators
struct SortKey {
    class: (u8, u16, &'static str),
    args: String,
    exp: f64,
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        self.class
            .cmp(&other.class)
            .then_with(|| self.args.cmp(&other.args))
            .then_with(|| self.exp.partial_cmp(&other.exp).unwrap_or(Ordering::Equal))
    }
}

fn class_key(e: &Expr) -> (u8, u16, &'static str) {
    match e {
        Expr::Num(_) => (1, 0, "Number"),
        Expr::Var => (2, 0, "Symbol"),
        Expr::Const(Constant::Pi) => (2, 0, "Pi"),
        Expr::Const(Constant::E) => (2, 0, "Exp1"),
        Expr::Const(Constant::ComplexInfinity) => (2, 0, "ComplexInfinity"),
        Expr::Mul(_) => (3, 0, "Mul"),
        Expr::Add(_) => (3, 1, "Add"),
        Expr::Pow(b, _) => class_key(b),
        Expr::Func(f, _) => {
            let rank = match f.name() {
                "exp" => 10,
                "log" => 11,
                "sin" => 20,
                "cos" => 21,
                "tan" => 22,
                "sinh" => 30,
                "cosh" => 31,
                "tanh" => 32,
                _ => 10000,
            };
            (4, rank, f.name())
        },
        Expr::Integral(_) => (5, 0, "Integral"),
    }
}

fn sort_key(e: &Expr) -> SortKey {
    match e {
        Expr::Num(n) => SortKey {
            class: class_key(e),
            args: String::new(),
            exp: n.to_f64(),
        },
        Expr::Pow(base, exp) => {
            let base_key = sort_key(base);
            SortKey {
                exp: if exp.is_free_of_x() { exp.eval(0.0) } else { 0.0 },
                ..base_key
            }
        },
        Expr::Func(_, arg) | Expr::Integral(arg) => SortKey {
            class: class_key(e),
            args: render(arg),
            exp: 1.0,
        },
        _ => SortKey {
            class: class_key(e),
            args: render(e),
            exp: 1.0,
        },
    }
}

/// Split a factor into a generator and an integer power (`x**(3/2)` -> (sqrt(x), 3))
fn decompose_power(factor: &Expr) -> (Expr, f64) {
    let (base, exp) = match factor {
        Expr::Pow(b, e) => ((**b).clone(), (**e).clone()),
        Expr::Func(expr::Func::Exp, arg) => (Expr::Const(Constant::E), (**arg).clone()),
        other => return (other.clone(), 1.0),
    };
    match &exp {
        Expr::Num(Number::Rational(r)) if r.is_integer() => (base, r.to_f64().unwrap_or(1.0)),
        Expr::Num(Number::Rational(r)) => {
            let root = Expr::Num(Number::Rational(BigRational::new(
                BigInt::from(1),
                r.denom().clone(),
            )));
            (expr::pow(base, root), r.numer().to_f64().unwrap_or(1.0))
        },
        Expr::Num(Number::Float(_)) => (factor.clone(), 1.0),
        _ => {
            let (coeff, tail) = exp.split_coeff();
            match coeff {
                Number::Rational(c) if !c.is_one() => {
                    let scaled = expr::mul(vec![
                        Expr::Num(Number::Rational(BigRational::new(
                            BigInt::from(1),
                            c.denom().clone(),
                        ))),
                        tail,
                    ]);
                    (expr::pow(base, scaled), c.numer().to_f64().unwrap_or(1.0))
                },
                _ => (factor.clone(), 1.0),
            }
        },
    }
}

fn is_positive_numeric_atom(e: &Expr) -> bool {
    match e {
        Expr::Num(n) => !n.is_negative() && !n.is_zero(),
        Expr::Const(Constant::Pi | Constant::E) => true,
        _ => false,
    }
}

fn ordered_terms(terms: &[Expr]) -> Vec<&Expr> {
    // `1 - x` rather than `-x + 1`
    if terms.len() == 2 {
        let numeric = |e: &Expr| matches!(e, Expr::Num(_) | Expr::Const(Constant::Pi | Constant::E));
        let (first, second) = if !numeric(&terms[0]) && numeric(&terms[1]) {
            (&terms[1], &terms[0])
        } else {
            (&terms[0], &terms[1])
        };
        if is_positive_numeric_atom(first) {
            if let Expr::Mul(factors) = second {
                if factors.len() == 2
                    && matches!(&factors[0], Expr::Num(n) if n.is_negative())
                {
                    return vec![first, second];
                }
            }
        }
    }

    struct Term<'a> {
        expr: &'a Expr,
        coeff: f64,
        powers: Vec<(String, f64)>,
    }

    let mut gens: Vec<(SortKey, String)> = Vec::new();
    let mut analyzed: Vec<Term> = Vec::with_capacity(terms.len());
    for term in terms {
        let factors: &[Expr] = match term {
            Expr::Mul(fs) => fs,
            other => std::slice::from_ref(other),
        };
        let mut coeff = 1.0;
        let mut powers = Vec::new();
        for factor in factors {
            if let Expr::Num(n) = factor {
                coeff *= n.to_f64();
                continue;
            }
            let (gen, exp) = decompose_power(factor);
            let key = render(&gen);
            if !gens.iter().any(|(_, k)| *k == key) {
                gens.push((sort_key(&gen), key.clone()));
            }
            powers.push((key, exp));
        }
        analyzed.push(Term {
            expr: term,
            coeff,
            powers,
        });
    }
    gens.sort_by(|a, b| a.0.compare(&b.0));

    let monom = |t: &Term| -> Vec<f64> {
        gens.iter()
            .map(|(_, k)| {
                t.powers
                    .iter()
                    .filter(|(pk, _)| pk == k)
                    .map(|(_, e)| *e)
                    .sum()
            })
            .collect()
    };
    let mut keyed: Vec<(Vec<f64>, f64, &Expr)> = analyzed
        .iter()
        .map(|t| (monom(t), t.coeff, t.expr))
        .collect();
    keyed.sort_by(|a, b| {
        // Descending monomial, then ascending coefficient
        let by_monom = b
            .0
            .iter()
            .zip(a.0.iter())
            .map(|(x, y)| x.partial_cmp(y).unwrap_or(Ordering::Equal))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal);
        by_monom.then_with(|| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
    });
    keyed.into_iter().map(|(_, _, e)| e).collect()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::super::expr::{add, div, func, mul, neg, pow, Func};
    use super::*;

    fn x() -> Expr {
        Expr::Var
    }

    #[test]
    fn test_polynomial_order() {
        let e = add(vec![
            Expr::int(2),
            mul(vec![Expr::int(2), x()]),
            pow(x(), Expr::int(2)),
        ]);
        assert_eq!(print(&e), "x**2 + 2*x + 2");
        let e = add(vec![
            func(Func::Cos, x()),
            mul(vec![Expr::int(3), pow(x(), Expr::int(2))]),
        ]);
        assert_eq!(print(&e), "3*x**2 + cos(x)");
    }

    #[test]
    fn test_mixed_function_terms() {
        let e = add(vec![
            func(Func::Cos, x()),
            mul(vec![x(), func(Func::Sin, x())]),
        ]);
        assert_eq!(print(&e), "x*sin(x) + cos(x)");
        let e = add(vec![mul(vec![x(), func(Func::Log, x())]), neg(x())]);
        assert_eq!(print(&e), "x*log(x) - x");
    }

    #[test]
    fn test_number_leads_negative_term() {
        let e = add(vec![
            Expr::int(1),
            neg(pow(func(Func::Tanh, x()), Expr::int(2))),
        ]);
        assert_eq!(print(&e), "1 - tanh(x)**2");
        assert_eq!(print(&sub_one(x())), "x - 1");
    }

    fn sub_one(e: Expr) -> Expr {
        add(vec![e, Expr::int(-1)])
    }

    #[test]
    fn test_fractions() {
        assert_eq!(print(&div(pow(x(), Expr::int(2)), Expr::int(2))), "x**2/2");
        assert_eq!(print(&div(Expr::int(1), x())), "1/x");
        assert_eq!(print(&neg(pow(x(), Expr::int(-2)))), "-1/x**2");
        assert_eq!(
            print(&mul(vec![Expr::ratio(1, 2), pow(x(), Expr::ratio(-1, 2))])),
            "1/(2*sqrt(x))"
        );
        assert_eq!(print(&pow(x(), Expr::ratio(3, 2))), "x**(3/2)");
        assert_eq!(print(&pow(x(), Expr::int(-2))), "x**(-2)");
    }

    #[test]
    fn test_parenthesized_bases() {
        let sum = add(vec![x(), Expr::int(1)]);
        assert_eq!(print(&pow(sum.clone(), Expr::int(2))), "(x + 1)**2");
        assert_eq!(print(&pow(sum, Expr::int(-1))), "1/(x + 1)");
        assert_eq!(print(&neg(func(Func::Sin, x()))), "-sin(x)");
    }

    #[test]
    fn test_floats() {
        assert_eq!(print(&Expr::Num(Number::Float(0.5))), "0.500000000000000");
        assert_eq!(
            print(&mul(vec![Expr::Num(Number::Float(0.5)), x()])),
            "0.5*x"
        );
    }
}
