//! Differentiation with respect to `x`

use super::expr::{add, div, func, mul, neg, pow, Expr, Func};

/// d/dx of `f(u)` as a function of `u`
fn outer_derivative(f: Func, u: &Expr) -> Expr {
    let u = u.clone();
    let u_squared = || pow(u.clone(), Expr::int(2));
    match f {
        Func::Sin => func(Func::Cos, u),
        Func::Cos => neg(func(Func::Sin, u)),
        Func::Tan => add(vec![pow(func(Func::Tan, u), Expr::int(2)), Expr::int(1)]),
        Func::Asin => pow(
            add(vec![Expr::int(1), neg(u_squared())]),
            Expr::ratio(-1, 2),
        ),
        Func::Acos => neg(pow(
            add(vec![Expr::int(1), neg(u_squared())]),
            Expr::ratio(-1, 2),
        )),
        Func::Atan => pow(add(vec![u_squared(), Expr::int(1)]), Expr::int(-1)),
        Func::Sinh => func(Func::Cosh, u),
        Func::Cosh => func(Func::Sinh, u),
        Func::Tanh => add(vec![
            Expr::int(1),
            neg(pow(func(Func::Tanh, u), Expr::int(2))),
        ]),
        Func::Exp => func(Func::Exp, u),
        Func::Log => pow(u, Expr::int(-1)),
    }
}

pub fn differentiate(e: &Expr) -> Expr {
    match e {
        Expr::Num(_) | Expr::Const(_) => Expr::int(0),
        Expr::Var => Expr::int(1),
        Expr::Add(terms) => add(terms.iter().map(differentiate).collect()),
        Expr::Mul(factors) => {
            let mut terms = Vec::with_capacity(factors.len());
            for (i, factor) in factors.iter().enumerate() {
                let d = differentiate(factor);
                if d.is_zero() {
                    continue;
                }
                let mut product = factors.clone();
                product[i] = d;
                terms.push(mul(product));
            }
            add(terms)
        },
        Expr::Pow(base, exp) => {
            let (b, n) = (&**base, &**exp);
            match (b.is_free_of_x(), n.is_free_of_x()) {
                (true, true) => Expr::int(0),
                // n*b**(n-1)*b'
                (false, true) => mul(vec![
                    n.clone(),
                    pow(b.clone(), add(vec![n.clone(), Expr::int(-1)])),
                    differentiate(b),
                ]),
                // b**n*log(b)*n'
                (true, false) => mul(vec![
                    e.clone(),
                    func(Func::Log, b.clone()),
                    differentiate(n),
                ]),
                (false, false) => mul(vec![
                    e.clone(),
                    add(vec![
                        mul(vec![differentiate(n), func(Func::Log, b.clone())]),
                        div(mul(vec![n.clone(), differentiate(b)]), b.clone()),
                    ]),
                ]),
            }
        },
        Expr::Func(f, arg) => mul(vec![outer_derivative(*f, arg), differentiate(arg)]),
        Expr::Integral(inner) => (**inner).clone(),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::super::parser::parse;
    use super::*;

    fn derivative(source: &str) -> String {
        differentiate(&parse(source).unwrap()).to_string()
    }

    #[test]
    fn test_power_rule() {
        assert_eq!(derivative("x**3"), "3*x**2");
        assert_eq!(derivative("x**2 + 2*x"), "2*x + 2");
        assert_eq!(derivative("5"), "0");
        assert_eq!(derivative("1/x"), "-1/x**2");
        assert_eq!(derivative("sqrt(x)"), "1/(2*sqrt(x))");
    }

    #[test]
    fn test_elementary_functions() {
        assert_eq!(derivative("sin(x)"), "cos(x)");
        assert_eq!(derivative("cos(x)"), "-sin(x)");
        assert_eq!(derivative("log(x)"), "1/x");
        assert_eq!(derivative("exp(x)"), "exp(x)");
        assert_eq!(derivative("tan(x)"), "tan(x)**2 + 1");
        assert_eq!(derivative("tanh(x)"), "1 - tanh(x)**2");
    }

    #[test]
    fn test_sum_and_product_rules() {
        assert_eq!(derivative("x**3 + sin(x)"), "3*x**2 + cos(x)");
        assert_eq!(derivative("x*sin(x)"), "x*cos(x) + sin(x)");
    }

    #[test]
    fn test_chain_rule() {
        assert_eq!(derivative("sin(2*x)"), "2*cos(2*x)");
        assert_eq!(derivative("exp(x**2)"), "2*x*exp(x**2)");
    }

    #[test]
    fn test_exponential_base() {
        assert_eq!(derivative("2**x"), "2**x*log(2)");
    }
}
