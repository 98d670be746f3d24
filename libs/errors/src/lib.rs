//! Unified error handling for the calculator service
//!
//! Every operation in the workspace reports failures through [`CalcError`]. Each
//! variant belongs to exactly one [`ErrorTier`]:
//!
//! | Tier | Detected | HTTP status |
//! |------|----------|-------------|
//! | `Shape` | before any mathematics runs (missing/forbidden field, empty collection) | 422 |
//! | `Domain` | by the computation or its input parser | 400 |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// ErrorInfo - API error response type
// ============================================================================

/// Standard error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorInfo {
    /// HTTP status code
    pub code: u16,
    /// Stable machine-readable error code, e.g. `SINGULAR_MATRIX`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Error message
    pub message: String,
    /// Detailed error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Field-specific errors for validation
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, Vec<String>>,
}

impl ErrorInfo {
    /// Create a new ErrorInfo with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            error_code: None,
            message: message.into(),
            details: None,
            field_errors: HashMap::new(),
        }
    }

    /// Set the status code
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Set the machine-readable error code
    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// Add details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Add a field error
    pub fn add_field_error(mut self, field: impl Into<String>, error: impl Into<String>) -> Self {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(error.into());
        self
    }
}

// ============================================================================
// CalcError - Main error type
// ============================================================================

/// Main error type for every calculator operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    // ======================================
    // Request shape errors
    // ======================================
    #[error("Expression cannot be empty")]
    EmptyExpression,

    #[error("Dataset cannot be empty.")]
    EmptyDataset,

    #[error("`{field}` must contain at least one element.")]
    EmptyCollection { field: String },

    #[error("`{field}` is required for {context}.")]
    MissingField { field: String, context: String },

    #[error("`{field}` must not be provided for {context}.")]
    ForbiddenField { field: String, context: String },

    #[error("All rows in `{field}` must have the same length.")]
    RaggedMatrix { field: String },

    // ======================================
    // Configuration errors
    // ======================================
    #[error("Logarithm base must be positive and not equal to 1 (got {base}).")]
    InvalidLogBase { base: f64 },

    #[error("Unsupported number base {base}; expected one of 2, 8, 10, 16")]
    UnsupportedBase { base: u32 },

    // ======================================
    // Parse errors
    // ======================================
    #[error("Invalid expression: '{expression}'. Error: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Invalid complex number format: '{input}'. Expected a literal such as '3+4j', '-2j' or '5'.")]
    InvalidComplex { input: String },

    #[error("Invalid number '{value}' for base {base}.")]
    InvalidNumeral { value: String, base: u32 },

    // ======================================
    // Domain errors
    // ======================================
    #[error("Division by zero in '{context}'")]
    DivisionByZero { context: String },

    #[error("Complex division by zero is not allowed: divisor '{divisor}' is zero.")]
    ComplexDivisionByZero { divisor: String },

    #[error("Domain error: The input '{value}' is outside the valid domain for the function '{function}'.")]
    OutsideDomain { function: String, value: f64 },

    #[error("Math domain error: the logarithm of {value} with base {base} is undefined.")]
    LogDomain { value: f64, base: f64 },

    #[error("Result is not a valid number: {context}")]
    NonFiniteResult { context: String },

    #[error("At least two coefficients are required for a polynomial of degree >= 1 (got {count}).")]
    InsufficientCoefficients { count: usize },

    // ======================================
    // Linear algebra errors
    // ======================================
    #[error("Matrix must be square to {requirement} (got shape {shape}).")]
    NotSquare { requirement: String, shape: String },

    #[error("Incompatible shapes for multiplication: `matrix1` has shape {left} and `matrix2` has shape {right}. The number of columns in matrix1 must equal the number of rows in matrix2.")]
    ShapeMismatch { left: String, right: String },

    #[error("Matrix is singular and cannot be inverted.")]
    SingularMatrix,

    #[error("Computation failed: {0}")]
    Computation(String),
}

/// Result type alias using CalcError
pub type CalcResult<T> = Result<T, CalcError>;

/// Error category enum - used for classification and log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    /// Structurally invalid request
    Validation,
    /// Parameter outside the set of legal configurations
    Configuration,
    /// Input text that does not match its grammar
    Parse,
    /// Mathematically undefined input
    Domain,
    /// Failure inside a numeric routine
    Calculation,
}

/// The two strictly separated error tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorTier {
    /// Rejected before the operation runs
    Shape,
    /// Rejected by the operation itself
    Domain,
}

impl CalcError {
    pub fn empty_collection(field: impl Into<String>) -> Self {
        Self::EmptyCollection {
            field: field.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn forbidden_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::ForbiddenField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn ragged_matrix(field: impl Into<String>) -> Self {
        Self::RaggedMatrix {
            field: field.into(),
        }
    }

    pub fn invalid_expression(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    pub fn division_by_zero(context: impl Into<String>) -> Self {
        Self::DivisionByZero {
            context: context.into(),
        }
    }

    pub fn outside_domain(function: impl Into<String>, value: f64) -> Self {
        Self::OutsideDomain {
            function: function.into(),
            value,
        }
    }

    pub fn non_finite(context: impl Into<String>) -> Self {
        Self::NonFiniteResult {
            context: context.into(),
        }
    }

    pub fn not_square(requirement: impl Into<String>, shape: impl Into<String>) -> Self {
        Self::NotSquare {
            requirement: requirement.into(),
            shape: shape.into(),
        }
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Get error code (for API, logs, monitoring)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyExpression => "EMPTY_EXPRESSION",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::EmptyCollection { .. } => "EMPTY_COLLECTION",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::ForbiddenField { .. } => "FORBIDDEN_FIELD",
            Self::RaggedMatrix { .. } => "RAGGED_MATRIX",
            Self::InvalidLogBase { .. } => "INVALID_LOG_BASE",
            Self::UnsupportedBase { .. } => "UNSUPPORTED_BASE",
            Self::InvalidExpression { .. } => "INVALID_EXPRESSION",
            Self::InvalidComplex { .. } => "INVALID_COMPLEX",
            Self::InvalidNumeral { .. } => "INVALID_NUMERAL",
            Self::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            Self::ComplexDivisionByZero { .. } => "COMPLEX_DIVISION_BY_ZERO",
            Self::OutsideDomain { .. } => "DOMAIN_ERROR",
            Self::LogDomain { .. } => "LOG_DOMAIN_ERROR",
            Self::NonFiniteResult { .. } => "NON_FINITE_RESULT",
            Self::InsufficientCoefficients { .. } => "INSUFFICIENT_COEFFICIENTS",
            Self::NotSquare { .. } => "NOT_SQUARE",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::SingularMatrix => "SINGULAR_MATRIX",
            Self::Computation(_) => "COMPUTATION_ERROR",
        }
    }

    /// Get error category (for classification)
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyExpression
            | Self::EmptyDataset
            | Self::EmptyCollection { .. }
            | Self::MissingField { .. }
            | Self::ForbiddenField { .. }
            | Self::RaggedMatrix { .. } => ErrorCategory::Validation,

            Self::InvalidLogBase { .. }
            | Self::UnsupportedBase { .. } => ErrorCategory::Configuration,

            Self::InvalidExpression { .. }
            | Self::InvalidComplex { .. }
            | Self::InvalidNumeral { .. } => ErrorCategory::Parse,

            Self::DivisionByZero { .. }
            | Self::ComplexDivisionByZero { .. }
            | Self::OutsideDomain { .. }
            | Self::LogDomain { .. }
            | Self::NonFiniteResult { .. }
            | Self::InsufficientCoefficients { .. } => ErrorCategory::Domain,

            Self::NotSquare { .. }
            | Self::ShapeMismatch { .. }
            | Self::SingularMatrix
            | Self::Computation(_) => ErrorCategory::Calculation,
        }
    }

    /// Which of the two tiers this error belongs to
    pub fn tier(&self) -> ErrorTier {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Configuration => ErrorTier::Shape,
            ErrorCategory::Parse | ErrorCategory::Domain | ErrorCategory::Calculation => {
                ErrorTier::Domain
            },
        }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self.tier() {
            ErrorTier::Shape => 422,
            ErrorTier::Domain => 400,
        }
    }

    /// Get log level
    pub fn log_level(&self) -> tracing::Level {
        match self.tier() {
            ErrorTier::Shape => tracing::Level::DEBUG,
            ErrorTier::Domain => tracing::Level::INFO,
        }
    }

    /// Name of the request field this error is about, if any
    fn field(&self) -> Option<&str> {
        match self {
            Self::EmptyCollection { field }
            | Self::MissingField { field, .. }
            | Self::ForbiddenField { field, .. }
            | Self::RaggedMatrix { field } => Some(field),
            Self::EmptyExpression | Self::InvalidExpression { .. } => Some("expression"),
            Self::EmptyDataset => Some("data"),
            Self::InvalidLogBase { .. } => Some("base"),
            Self::InvalidNumeral { .. } => Some("value"),
            _ => None,
        }
    }

    /// Convert to API ErrorInfo for HTTP responses
    pub fn to_error_info(&self) -> ErrorInfo {
        let message = self.to_string();
        let mut error_info = ErrorInfo::new(message.clone())
            .with_code(self.status_code())
            .with_error_code(self.error_code());

        if let Some(field) = self.field() {
            error_info = error_info.add_field_error(field, message);
        }
        if let Self::Computation(detail) = self {
            error_info = error_info.with_details(detail.clone());
        }

        error_info
    }
}
