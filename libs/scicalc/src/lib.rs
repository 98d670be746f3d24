//! scicalc - Scientific calculator core
//!
//! Stateless evaluators behind the calculator service. Each module owns its
//! request and response models, a `validate` step for request shape, and an
//! `evaluate` entry point returning [`errors::CalcResult`].
//!
//! # Modules
//!
//! | Module | Operation | Result |
//! |--------|-----------|--------|
//! | [`arithmetic`] | `evaluate_arithmetic(expression)` | float |
//! | [`trigonometry`] | `evaluate_trig(function, value, unit)` | float |
//! | [`logarithms`] | `evaluate_log(function, value, base)` | float |
//! | [`algebra`] | `solve_polynomial(coefficients)` | root strings, polynomial string |
//! | [`complex_numbers`] | `complex_arithmetic(num1, num2, operation)` | complex string |
//! | [`calculus`] | `calculus_operation(expression, operation, bounds)` | expression or number string |
//! | [`matrices`] | `matrix_operation(operation, matrix1, matrix2)` | matrix or scalar |
//! | [`statistics`] | `statistics_operation(operation, data)` | float |
//! | [`number_systems`] | `convert_base(value, from_base, to_base)` | numeral string |
//!
//! # Example
//!
//! ```rust
//! use scicalc::arithmetic::evaluate_arithmetic;
//! use scicalc::number_systems::{convert_base, NumberBase};
//!
//! assert_eq!(evaluate_arithmetic("2 ** 10 % 7").unwrap(), 2.0);
//! assert_eq!(
//!     convert_base("255", NumberBase::Decimal, NumberBase::Hexadecimal).unwrap(),
//!     "FF"
//! );
//! ```

pub mod algebra;
pub mod arithmetic;
pub mod calculus;
pub mod complex_numbers;
pub mod format;
pub mod logarithms;
pub mod matrices;
pub mod number_systems;
pub mod statistics;
pub mod symbolic;
pub mod trigonometry;

mod lexer;

pub use errors::{CalcError, CalcResult};
