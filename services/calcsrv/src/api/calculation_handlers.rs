//! Calculation API handlers
//!
//! One POST endpoint per calculator module. Bodies are deserialized with
//! [`ApiJson`], shape-checked and evaluated by `scicalc`; a `CalcError`
//! becomes a 422 (shape) or 400 (domain) error envelope.

use axum::response::Json;
use common::{ApiJson, AppError, SuccessResponse};
use errors::CalcResult;
use scicalc::{
    algebra::{self, PolynomialRequest, PolynomialResponse},
    arithmetic::{self, ArithmeticRequest, ArithmeticResponse},
    calculus::{self, CalculusRequest, CalculusResponse},
    complex_numbers::{self, ComplexRequest, ComplexResponse},
    logarithms::{self, LogRequest, LogResponse},
    matrices::{self, MatrixRequest, MatrixResponse},
    number_systems::{self, ConversionRequest, ConversionResponse},
    statistics::{self, StatisticsRequest, StatisticsResponse},
    trigonometry::{self, TrigRequest, TrigResponse},
};

#[cfg(feature = "openapi")]
use common::ErrorResponse;

type ApiResult<T> = Result<Json<SuccessResponse<T>>, AppError>;

fn respond<T>(outcome: CalcResult<T>) -> ApiResult<T> {
    Ok(Json(SuccessResponse::new(outcome?)))
}

/// Evaluate an arithmetic expression
///
/// @route POST /arithmetic/evaluate
/// @input ApiJson(request): ArithmeticRequest - {expression}
/// @output Json<SuccessResponse<ArithmeticResponse>> - {result, expression}
/// @status 422 - Empty expression
/// @status 400 - Malformed expression, division or modulo by zero, non-finite result
/// @example
/// ```json
/// {"expression": "2 * (3 + 5)"}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/arithmetic/evaluate",
    tag = "calculator",
    request_body = ArithmeticRequest,
    responses(
        (status = 200, body = SuccessResponse<ArithmeticResponse>,
            example = json!({"success": true, "data": {"result": 16.0, "expression": "2 * (3 + 5)"}})),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn evaluate_arithmetic(
    ApiJson(request): ApiJson<ArithmeticRequest>,
) -> ApiResult<ArithmeticResponse> {
    respond(arithmetic::evaluate(&request))
}

/// Evaluate a trigonometric or hyperbolic function
///
/// @route POST /trigonometry/evaluate
/// @input ApiJson(request): TrigRequest - {function, value, unit?}
/// @output Json<SuccessResponse<TrigResponse>> - {result, function, input_value, unit}
/// @status 400 - Value outside the function's domain
/// @example
/// ```json
/// {"function": "sin", "value": 90, "unit": "degrees"}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/trigonometry/evaluate",
    tag = "calculator",
    request_body = TrigRequest,
    responses(
        (status = 200, body = SuccessResponse<TrigResponse>),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn evaluate_trigonometry(ApiJson(request): ApiJson<TrigRequest>) -> ApiResult<TrigResponse> {
    respond(trigonometry::evaluate(&request))
}

/// Evaluate ln, log10 or a logarithm with a custom base
///
/// @route POST /logarithms/evaluate
/// @input ApiJson(request): LogRequest - {function, value, base?}
/// @output Json<SuccessResponse<LogResponse>> - {result, function, input_value, base}
/// @status 422 - `base` missing for log, given for ln/log10, or not a valid base
/// @status 400 - Non-positive value
/// @example
/// ```json
/// {"function": "log", "value": 1024, "base": 2}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/logarithms/evaluate",
    tag = "calculator",
    request_body = LogRequest,
    responses(
        (status = 200, body = SuccessResponse<LogResponse>),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn evaluate_logarithm(ApiJson(request): ApiJson<LogRequest>) -> ApiResult<LogResponse> {
    respond(logarithms::evaluate(&request))
}

/// Find all roots of a polynomial given highest-degree coefficient first
///
/// @route POST /algebra/poly-solve
/// @input ApiJson(request): PolynomialRequest - {coefficients}
/// @output Json<SuccessResponse<PolynomialResponse>> - {roots, polynomial}
/// @status 422 - Empty coefficient list
/// @status 400 - Fewer than two coefficients
/// @example
/// ```json
/// {"coefficients": [1, -3, 2]}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/algebra/poly-solve",
    tag = "calculator",
    request_body = PolynomialRequest,
    responses(
        (status = 200, body = SuccessResponse<PolynomialResponse>,
            example = json!({"success": true, "data": {"roots": ["1.0000", "2.0000"], "polynomial": "x**2 - 3*x + 2"}})),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn solve_polynomial(
    ApiJson(request): ApiJson<PolynomialRequest>,
) -> ApiResult<PolynomialResponse> {
    respond(algebra::evaluate(&request))
}

/// Add, subtract, multiply or divide two complex literals
///
/// @route POST /complex/evaluate
/// @input ApiJson(request): ComplexRequest - {num1, num2, operation}
/// @output Json<SuccessResponse<ComplexResponse>> - {result, calculation}
/// @status 400 - Unparsable literal or division by zero
/// @example
/// ```json
/// {"num1": "3+4j", "num2": "1-2j", "operation": "multiply"}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/complex/evaluate",
    tag = "calculator",
    request_body = ComplexRequest,
    responses(
        (status = 200, body = SuccessResponse<ComplexResponse>),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn evaluate_complex(
    ApiJson(request): ApiJson<ComplexRequest>,
) -> ApiResult<ComplexResponse> {
    respond(complex_numbers::evaluate(&request))
}

/// Differentiate or integrate an expression in `x`
///
/// @route POST /calculus/evaluate
/// @input ApiJson(request): CalculusRequest - {expression, operation, integration_bounds?}
/// @output Json<SuccessResponse<CalculusResponse>> - {result, input_expression, operation, is_definite_integral}
/// @status 422 - Bounds given for differentiation, empty expression
/// @status 400 - Unparsable expression, divergent definite integral
/// @example
/// ```json
/// {"expression": "x**2", "operation": "integrate", "integration_bounds": [0, 3]}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/calculus/evaluate",
    tag = "calculator",
    request_body = CalculusRequest,
    responses(
        (status = 200, body = SuccessResponse<CalculusResponse>),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn evaluate_calculus(
    ApiJson(request): ApiJson<CalculusRequest>,
) -> ApiResult<CalculusResponse> {
    respond(calculus::evaluate(&request))
}

/// Multiply two matrices, or take the determinant or inverse of one
///
/// @route POST /matrices/evaluate
/// @input ApiJson(request): MatrixRequest - {operation, matrix1, matrix2?}
/// @output Json<SuccessResponse<MatrixResponse>> - {result, operation, input_shape1, input_shape2}
/// @status 422 - matrix2 missing/forbidden, empty or ragged matrix
/// @status 400 - Shape mismatch, non-square or singular matrix
/// @example
/// ```json
/// {"operation": "multiply", "matrix1": [[1, 2], [3, 4]], "matrix2": [[5, 6], [7, 8]]}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/matrices/evaluate",
    tag = "calculator",
    request_body = MatrixRequest,
    responses(
        (status = 200, body = SuccessResponse<MatrixResponse>),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn evaluate_matrix(ApiJson(request): ApiJson<MatrixRequest>) -> ApiResult<MatrixResponse> {
    respond(matrices::evaluate(&request))
}

/// Mean, median, population variance or standard deviation of a dataset
///
/// @route POST /statistics/evaluate
/// @input ApiJson(request): StatisticsRequest - {operation, data}
/// @output Json<SuccessResponse<StatisticsResponse>> - {result, operation, dataset_size}
/// @status 422 - Empty dataset
/// @example
/// ```json
/// {"operation": "std_dev", "data": [1, 2, 3, 4, 5]}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/statistics/evaluate",
    tag = "calculator",
    request_body = StatisticsRequest,
    responses(
        (status = 200, body = SuccessResponse<StatisticsResponse>),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn evaluate_statistics(
    ApiJson(request): ApiJson<StatisticsRequest>,
) -> ApiResult<StatisticsResponse> {
    respond(statistics::evaluate(&request))
}

/// Convert an integer numeral between bases 2, 8, 10 and 16
///
/// @route POST /numbers/convert
/// @input ApiJson(request): ConversionRequest - {value, from_base, to_base}
/// @output Json<SuccessResponse<ConversionResponse>> - {result, from_base, to_base, original_value}
/// @status 422 - Base outside 2, 8, 10, 16
/// @status 400 - Digit not valid for from_base
/// @example
/// ```json
/// {"value": "255", "from_base": 10, "to_base": 16}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/numbers/convert",
    tag = "calculator",
    request_body = ConversionRequest,
    responses(
        (status = 200, body = SuccessResponse<ConversionResponse>,
            example = json!({"success": true, "data": {"result": "FF", "from_base": 10, "to_base": 16, "original_value": "255"}})),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
))]
pub async fn convert_number(
    ApiJson(request): ApiJson<ConversionRequest>,
) -> ApiResult<ConversionResponse> {
    respond(number_systems::evaluate(&request))
}
