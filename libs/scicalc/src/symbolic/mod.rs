//! Symbolic algebra over the single variable `x`
//!
//! Expressions are parsed from text, kept in canonical form by construction
//! and printed back as text. Only the operations the calculus endpoint needs
//! are provided: differentiation and closed-form antiderivatives.

mod diff;
mod expr;
mod integrate;
mod parser;
mod printer;

pub use diff::differentiate;
pub use expr::{Constant, Expr, Func, Number};
pub use integrate::integrate;
pub use parser::{parse, ALLOWED_FUNCTIONS};
pub use printer::print;
