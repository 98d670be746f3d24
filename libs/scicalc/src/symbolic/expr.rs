//! Expression tree over the single variable `x`
//!
//! Trees are only built through [`add`], [`mul`], [`pow`] and [`func`], which
//! keep them in canonical form: sums and products are flat, numbers are folded,
//! like terms and like powers are collected, and a numeric factor is
//! distributed over a lone sum. Two equal expressions therefore print the same,
//! and the printed form doubles as the key for collecting terms.

use super::printer;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Largest integer exponent evaluated exactly
const MAX_EXACT_EXPONENT: i64 = 512;
/// Largest numerator or denominator, in bits, produced by an exact power
const MAX_EXACT_BITS: u64 = 8192;

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Rational(BigRational),
    Float(f64),
}

impl Number {
    pub fn int(n: i64) -> Self {
        Self::Rational(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn ratio(numer: i64, denom: i64) -> Self {
        Self::Rational(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Rational(r) => {
                let n = r.numer().to_f64().unwrap_or(f64::NAN);
                let d = r.denom().to_f64().unwrap_or(f64::NAN);
                n / d
            },
            Self::Float(v) => *v,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Rational(r) => r.is_zero(),
            Self::Float(v) => *v == 0.0,
        }
    }

    /// Exactly the rational one; `1.0` stays visible as a float coefficient
    pub fn is_one(&self) -> bool {
        matches!(self, Self::Rational(r) if r.is_one())
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Self::Rational(r) => r.is_negative(),
            Self::Float(v) => *v < 0.0,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Rational(r) if r.is_integer())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Rational(r) if r.is_integer() => r.numer().to_i64(),
            _ => None,
        }
    }

    pub fn equals_ratio(&self, numer: i64, denom: i64) -> bool {
        matches!(self, Self::Rational(r) if *r == BigRational::new(numer.into(), denom.into()))
    }

    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Self::Rational(a), Self::Rational(b)) => Self::Rational(a + b),
            _ => Self::Float(self.to_f64() + other.to_f64()),
        }
    }

    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Self::Rational(a), Self::Rational(b)) => Self::Rational(a * b),
            _ => Self::Float(self.to_f64() * other.to_f64()),
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Self::Rational(r) => Self::Rational(-r.clone()),
            Self::Float(v) => Self::Float(-v),
        }
    }

    /// Exact or float power; `None` when the result must stay symbolic
    fn pow(&self, exp: &Number) -> Option<Number> {
        match (self, exp) {
            (Self::Rational(b), Self::Rational(e)) => rational_pow(b, e),
            _ => {
                let (b, e) = (self.to_f64(), exp.to_f64());
                if b < 0.0 && e.fract() != 0.0 {
                    return None;
                }
                let v = b.powf(e);
                v.is_finite().then_some(Self::Float(v))
            },
        }
    }
}

fn integer_pow(base: &BigRational, n: i64) -> Option<BigRational> {
    if n.abs() > MAX_EXACT_EXPONENT {
        return None;
    }
    if base.is_zero() && n < 0 {
        return None;
    }
    let widest = base.numer().bits().max(base.denom().bits());
    if widest.saturating_mul(n.unsigned_abs()) > MAX_EXACT_BITS {
        return None;
    }
    let magnitude = num_traits::pow(base.clone(), n.unsigned_abs() as usize);
    Some(if n < 0 { magnitude.recip() } else { magnitude })
}

/// Exact q-th root of a non-negative integer, if it exists
fn exact_root(n: &BigInt, q: u32) -> Option<BigInt> {
    let root = n.nth_root(q);
    (num_traits::pow(root.clone(), q as usize) == *n).then_some(root)
}

fn rational_pow(base: &BigRational, exp: &BigRational) -> Option<Number> {
    if exp.is_integer() {
        let n = exp.numer().to_i64()?;
        return integer_pow(base, n).map(Number::Rational);
    }
    if base.is_negative() {
        return None;
    }
    let q = exp.denom().to_u32()?;
    let p = exp.numer().to_i64()?;
    let root = BigRational::new(exact_root(base.numer(), q)?, exact_root(base.denom(), q)?);
    integer_pow(&root, p).map(Number::Rational)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
    /// Result of dividing by zero
    ComplexInfinity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
}

impl Func {
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
            Self::Exp => "exp",
            Self::Log => "log",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "exp" => Self::Exp,
            "log" | "ln" => Self::Log,
            _ => return None,
        })
    }

    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::Sin => v.sin(),
            Self::Cos => v.cos(),
            Self::Tan => v.tan(),
            Self::Asin => v.asin(),
            Self::Acos => v.acos(),
            Self::Atan => v.atan(),
            Self::Sinh => v.sinh(),
            Self::Cosh => v.cosh(),
            Self::Tanh => v.tanh(),
            Self::Exp => v.exp(),
            Self::Log => v.ln(),
        }
    }

    /// f(-u) == -f(u)
    fn is_odd(self) -> bool {
        matches!(
            self,
            Self::Sin | Self::Tan | Self::Asin | Self::Atan | Self::Sinh | Self::Tanh
        )
    }

    /// f(-u) == f(u)
    fn is_even(self) -> bool {
        matches!(self, Self::Cos | Self::Cosh)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(Number),
    /// The variable `x`
    Var,
    Const(Constant),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Func(Func, Box<Expr>),
    /// Unevaluated antiderivative of the inner expression
    Integral(Box<Expr>),
}

impl Expr {
    pub fn int(n: i64) -> Expr {
        Expr::Num(Number::int(n))
    }

    pub fn ratio(numer: i64, denom: i64) -> Expr {
        Expr::Num(Number::ratio(numer, denom))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_zero())
    }

    pub fn is_free_of_x(&self) -> bool {
        match self {
            Expr::Num(_) | Expr::Const(_) => true,
            Expr::Var | Expr::Integral(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().all(Expr::is_free_of_x),
            Expr::Pow(b, e) => b.is_free_of_x() && e.is_free_of_x(),
            Expr::Func(_, arg) => arg.is_free_of_x(),
        }
    }

    pub fn contains_integral(&self) -> bool {
        match self {
            Expr::Integral(_) => true,
            Expr::Num(_) | Expr::Var | Expr::Const(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(Expr::contains_integral),
            Expr::Pow(b, e) => b.contains_integral() || e.contains_integral(),
            Expr::Func(_, arg) => arg.contains_integral(),
        }
    }

    /// Leading numeric coefficient and the remaining factor
    pub fn split_coeff(&self) -> (Number, Expr) {
        if let Expr::Mul(factors) = self {
            if let Some(Expr::Num(c)) = factors.first() {
                let rest = &factors[1..];
                let rest = if rest.len() == 1 {
                    rest[0].clone()
                } else {
                    Expr::Mul(rest.to_vec())
                };
                return (c.clone(), rest);
            }
        }
        (Number::int(1), self.clone())
    }

    /// Base and exponent of a factor (`x**2` -> (x, 2), `sin(x)` -> (sin(x), 1))
    pub fn as_base_exp(&self) -> (Expr, Expr) {
        match self {
            Expr::Pow(b, e) => ((**b).clone(), (**e).clone()),
            other => (other.clone(), Expr::int(1)),
        }
    }

    /// Whether the printed form starts with a minus sign
    pub fn could_extract_minus_sign(&self) -> bool {
        match self {
            Expr::Num(n) => n.is_negative(),
            Expr::Mul(factors) => matches!(factors.first(), Some(Expr::Num(n)) if n.is_negative()),
            _ => false,
        }
    }

    /// Numeric value at `x`
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Num(n) => n.to_f64(),
            Expr::Var => x,
            Expr::Const(Constant::Pi) => std::f64::consts::PI,
            Expr::Const(Constant::E) => std::f64::consts::E,
            Expr::Const(Constant::ComplexInfinity) | Expr::Integral(_) => f64::NAN,
            Expr::Add(items) => items.iter().map(|t| t.eval(x)).sum(),
            Expr::Mul(items) => items.iter().map(|t| t.eval(x)).product(),
            Expr::Pow(b, e) => b.eval(x).powf(e.eval(x)),
            Expr::Func(f, arg) => f.apply(arg.eval(x)),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&printer::print(self))
    }
}

fn key(e: &Expr) -> String {
    printer::print_nested(e)
}

fn zoo() -> Expr {
    Expr::Const(Constant::ComplexInfinity)
}

/// Coefficient times an already-canonical non-numeric term
fn with_coeff(coeff: Number, term: Expr) -> Expr {
    if coeff.is_one() {
        return term;
    }
    match term {
        Expr::Mul(mut factors) => {
            factors.insert(0, Expr::Num(coeff));
            Expr::Mul(factors)
        },
        other => Expr::Mul(vec![Expr::Num(coeff), other]),
    }
}

pub fn add(terms: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(terms.len());
    for term in terms {
        match term {
            Expr::Add(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }

    let mut constant = Number::int(0);
    let mut groups: Vec<(String, Number, Expr)> = Vec::new();
    for term in flat {
        match term {
            Expr::Num(n) => constant = constant.add(&n),
            Expr::Const(Constant::ComplexInfinity) => return zoo(),
            other => {
                let (coeff, rest) = other.split_coeff();
                let k = key(&rest);
                match groups.iter_mut().find(|g| g.0 == k) {
                    Some(group) => group.1 = group.1.add(&coeff),
                    None => groups.push((k, coeff, rest)),
                }
            },
        }
    }

    let mut out: Vec<Expr> = Vec::new();
    if !constant.is_zero() {
        out.push(Expr::Num(constant.clone()));
    }
    for (_, coeff, rest) in groups {
        if !coeff.is_zero() {
            out.push(with_coeff(coeff, rest));
        }
    }

    match out.len() {
        0 => Expr::Num(if constant.is_zero() { Number::int(0) } else { constant }),
        1 => out.remove(0),
        _ => Expr::Add(out),
    }
}

pub fn mul(factors: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(factors.len());
    for factor in factors {
        match factor {
            Expr::Mul(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }

    let mut coeff = Number::int(1);
    let mut exp_args: Vec<Expr> = Vec::new();
    let mut groups: Vec<(String, Expr, Vec<Expr>)> = Vec::new();
    for factor in flat {
        match factor {
            Expr::Num(n) => coeff = coeff.mul(&n),
            Expr::Const(Constant::ComplexInfinity) => return zoo(),
            // exp(a)*exp(b) -> exp(a + b)
            Expr::Func(Func::Exp, arg) => exp_args.push(*arg),
            other => {
                let (base, exp) = other.as_base_exp();
                let k = key(&base);
                match groups.iter_mut().find(|g| g.0 == k) {
                    Some(group) => group.2.push(exp),
                    None => groups.push((k, base, vec![exp])),
                }
            },
        }
    }

    let mut rest: Vec<Expr> = Vec::new();
    let mut absorb = |e: Expr, coeff: &mut Number, rest: &mut Vec<Expr>| match e {
        Expr::Num(n) => *coeff = coeff.mul(&n),
        Expr::Mul(inner) => {
            for f in inner {
                match f {
                    Expr::Num(n) => *coeff = coeff.mul(&n),
                    other => rest.push(other),
                }
            }
        },
        other => rest.push(other),
    };
    for (_, base, exps) in groups {
        absorb(pow(base, add(exps)), &mut coeff, &mut rest);
    }
    if !exp_args.is_empty() {
        absorb(func(Func::Exp, add(exp_args)), &mut coeff, &mut rest);
    }

    if coeff.is_zero() {
        return Expr::int(0);
    }
    if rest.is_empty() {
        return Expr::Num(coeff);
    }
    // A number times a lone sum is distributed
    if rest.len() == 1 && !coeff.is_one() {
        if let Expr::Add(terms) = &rest[0] {
            return add(
                terms
                    .iter()
                    .map(|t| mul(vec![Expr::Num(coeff.clone()), t.clone()]))
                    .collect(),
            );
        }
    }
    if coeff.is_one() && rest.len() == 1 {
        return rest.remove(0);
    }
    if !coeff.is_one() {
        rest.insert(0, Expr::Num(coeff));
    }
    Expr::Mul(rest)
}

pub fn pow(base: Expr, exp: Expr) -> Expr {
    if let Expr::Num(e) = &exp {
        if e.is_zero() {
            return Expr::int(1);
        }
        if e.is_one() {
            return base;
        }
    }

    match (&base, &exp) {
        (Expr::Num(b), Expr::Num(e)) => {
            if b.is_zero() && e.is_negative() {
                return zoo();
            }
            if let Some(v) = b.pow(e) {
                return Expr::Num(v);
            }
        },
        (Expr::Num(b), _) if b.is_one() => return Expr::int(1),
        (Expr::Const(Constant::E), _) => return func(Func::Exp, exp),
        (Expr::Pow(b, e1), Expr::Num(n)) if n.is_integer() => {
            return pow((**b).clone(), mul(vec![(**e1).clone(), exp.clone()]));
        },
        (Expr::Mul(factors), Expr::Num(n)) if n.is_integer() => {
            return mul(factors.iter().map(|f| pow(f.clone(), exp.clone())).collect());
        },
        (Expr::Func(Func::Exp, arg), Expr::Num(n)) if n.is_integer() => {
            return func(Func::Exp, mul(vec![(**arg).clone(), exp.clone()]));
        },
        _ => {},
    }
    Expr::Pow(Box::new(base), Box::new(exp))
}

pub fn func(f: Func, arg: Expr) -> Expr {
    match &arg {
        Expr::Num(Number::Float(v)) => {
            let r = f.apply(*v);
            if r.is_finite() {
                return Expr::Num(Number::Float(r));
            }
        },
        Expr::Num(n) if n.is_zero() => {
            return match f {
                Func::Sin | Func::Tan | Func::Asin | Func::Atan | Func::Sinh | Func::Tanh => {
                    Expr::int(0)
                },
                Func::Cos | Func::Cosh | Func::Exp => Expr::int(1),
                Func::Acos => mul(vec![Expr::ratio(1, 2), Expr::Const(Constant::Pi)]),
                Func::Log => zoo(),
            };
        },
        Expr::Num(n) if n.is_one() => match f {
            Func::Log => return Expr::int(0),
            Func::Exp => return Expr::Const(Constant::E),
            _ => {},
        },
        Expr::Const(Constant::E) if f == Func::Log => return Expr::int(1),
        Expr::Const(Constant::Pi) => match f {
            Func::Sin | Func::Tan => return Expr::int(0),
            Func::Cos => return Expr::int(-1),
            _ => {},
        },
        Expr::Func(Func::Log, inner) if f == Func::Exp => return (**inner).clone(),
        _ => {},
    }

    if (f.is_odd() || f.is_even()) && arg.could_extract_minus_sign() {
        let positive = neg(arg);
        let value = func(f, positive);
        return if f.is_odd() { neg(value) } else { value };
    }
    Expr::Func(f, Box::new(arg))
}

pub fn neg(e: Expr) -> Expr {
    mul(vec![Expr::int(-1), e])
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    add(vec![a, neg(b)])
}

pub fn div(a: Expr, b: Expr) -> Expr {
    mul(vec![a, pow(b, Expr::int(-1))])
}
