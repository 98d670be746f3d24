//! Matrix multiply, determinant and inverse
//!
//! Matrices arrive as row-major nested vectors and are converted to
//! `nalgebra::DMatrix<f64>` for the computation.

use errors::{CalcError, CalcResult};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub type Rows = Vec<Vec<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MatrixOperation {
    Multiply,
    Determinant,
    Inverse,
}

impl MatrixOperation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Multiply => "multiply",
            Self::Determinant => "determinant",
            Self::Inverse => "inverse",
        }
    }
}

/// Result of a matrix operation: a matrix or a scalar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum MatrixResult {
    Matrix(Vec<Vec<f64>>),
    Scalar(f64),
}

/// Check a matrix is non-empty and rectangular; returns (rows, cols)
fn check_rectangular(rows: &[Vec<f64>], field: &str) -> CalcResult<(usize, usize)> {
    let first = rows
        .first()
        .ok_or_else(|| CalcError::empty_collection(field))?;
    if first.is_empty() {
        return Err(CalcError::empty_collection(field));
    }
    if rows.iter().any(|row| row.len() != first.len()) {
        return Err(CalcError::ragged_matrix(field));
    }
    Ok((rows.len(), first.len()))
}

fn shape_string((r, c): (usize, usize)) -> String {
    format!("{}x{}", r, c)
}

fn to_dmatrix(rows: &[Vec<f64>], (r, c): (usize, usize)) -> DMatrix<f64> {
    DMatrix::from_fn(r, c, |i, j| rows[i][j])
}

fn to_rows(m: &DMatrix<f64>) -> Rows {
    m.row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

/// Run the operation; returns the result plus the shape string(s) of the inputs
pub fn matrix_operation(
    operation: MatrixOperation,
    matrix1: &[Vec<f64>],
    matrix2: Option<&[Vec<f64>]>,
) -> CalcResult<(MatrixResult, String, Option<String>)> {
    let shape1 = check_rectangular(matrix1, "matrix1")?;
    let shape1_str = shape_string(shape1);
    let m1 = to_dmatrix(matrix1, shape1);

    let outcome = match operation {
        MatrixOperation::Determinant => {
            if shape1.0 != shape1.1 {
                return Err(CalcError::not_square("calculate its determinant", shape1_str));
            }
            (MatrixResult::Scalar(m1.determinant()), shape1_str, None)
        },
        MatrixOperation::Inverse => {
            if shape1.0 != shape1.1 {
                return Err(CalcError::not_square("be inverted", shape1_str));
            }
            let inverse = m1.try_inverse().ok_or(CalcError::SingularMatrix)?;
            if inverse.iter().any(|v| !v.is_finite()) {
                return Err(CalcError::SingularMatrix);
            }
            (MatrixResult::Matrix(to_rows(&inverse)), shape1_str, None)
        },
        MatrixOperation::Multiply => {
            let matrix2 = matrix2
                .ok_or_else(|| CalcError::missing_field("matrix2", "multiplication"))?;
            let shape2 = check_rectangular(matrix2, "matrix2")?;
            let shape2_str = shape_string(shape2);
            if shape1.1 != shape2.0 {
                return Err(CalcError::ShapeMismatch {
                    left: shape1_str,
                    right: shape2_str,
                });
            }
            let product = &m1 * to_dmatrix(matrix2, shape2);
            (
                MatrixResult::Matrix(to_rows(&product)),
                shape1_str,
                Some(shape2_str),
            )
        },
    };

    debug!(operation = operation.name(), shape = %outcome.1, "matrix evaluated");
    Ok(outcome)
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MatrixRequest {
    pub operation: MatrixOperation,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Vec<f64>>))]
    pub matrix1: Rows,
    /// Required for `multiply`, forbidden otherwise
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<Vec<f64>>>))]
    pub matrix2: Option<Rows>,
}

impl MatrixRequest {
    pub fn validate(&self) -> CalcResult<()> {
        match (self.operation, &self.matrix2) {
            (MatrixOperation::Multiply, None) => {
                return Err(CalcError::missing_field("matrix2", "multiplication"))
            },
            (MatrixOperation::Determinant | MatrixOperation::Inverse, Some(_)) => {
                return Err(CalcError::forbidden_field("matrix2", self.operation.name()))
            },
            _ => {},
        }
        check_rectangular(&self.matrix1, "matrix1")?;
        if let Some(matrix2) = &self.matrix2 {
            check_rectangular(matrix2, "matrix2")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MatrixResponse {
    pub result: MatrixResult,
    pub operation: MatrixOperation,
    pub input_shape1: String,
    pub input_shape2: Option<String>,
}

pub fn evaluate(request: &MatrixRequest) -> CalcResult<MatrixResponse> {
    request.validate()?;
    let (result, input_shape1, input_shape2) =
        matrix_operation(request.operation, &request.matrix1, request.matrix2.as_deref())?;
    Ok(MatrixResponse {
        result,
        operation: request.operation,
        input_shape1,
        input_shape2,
    })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn rows(data: &[&[f64]]) -> Rows {
        data.iter().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn test_multiply() {
        let a = rows(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = rows(&[&[5.0, 6.0], &[7.0, 8.0]]);
        let (result, s1, s2) = matrix_operation(MatrixOperation::Multiply, &a, Some(&b[..])).unwrap();
        assert_eq!(
            result,
            MatrixResult::Matrix(rows(&[&[19.0, 22.0], &[43.0, 50.0]]))
        );
        assert_eq!(s1, "2x2");
        assert_eq!(s2.as_deref(), Some("2x2"));
    }

    #[test]
    fn test_multiply_shape_mismatch_names_both_shapes() {
        let a = rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = rows(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let err = matrix_operation(MatrixOperation::Multiply, &a, Some(&b[..])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2x3") && msg.contains("2x2"), "{}", msg);
    }

    #[test]
    fn test_determinant() {
        let a = rows(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let (result, _, s2) = matrix_operation(MatrixOperation::Determinant, &a, None).unwrap();
        match result {
            MatrixResult::Scalar(det) => assert!((det + 2.0).abs() < 1e-12),
            other => panic!("expected scalar, got {:?}", other),
        }
        assert!(s2.is_none());

        let rect = rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let err = matrix_operation(MatrixOperation::Determinant, &rect, None).unwrap_err();
        assert!(matches!(err, CalcError::NotSquare { .. }));
        assert!(err.to_string().contains("square"));
    }

    #[test]
    fn test_inverse() {
        let a = rows(&[&[4.0, 7.0], &[2.0, 6.0]]);
        let (result, _, _) = matrix_operation(MatrixOperation::Inverse, &a, None).unwrap();
        let MatrixResult::Matrix(inv) = result else {
            panic!("expected matrix");
        };
        let expected = [[0.6, -0.7], [-0.2, 0.4]];
        for (row, exp) in inv.iter().zip(expected.iter()) {
            for (v, e) in row.iter().zip(exp.iter()) {
                assert!((v - e).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_singular_is_distinct_from_not_square() {
        let singular = rows(&[&[1.0, 1.0], &[1.0, 1.0]]);
        assert_eq!(
            matrix_operation(MatrixOperation::Inverse, &singular, None).unwrap_err(),
            CalcError::SingularMatrix
        );
        let rect = rows(&[&[1.0, 2.0]]);
        assert!(matches!(
            matrix_operation(MatrixOperation::Inverse, &rect, None).unwrap_err(),
            CalcError::NotSquare { .. }
        ));
    }

    #[test]
    fn test_request_shape_rules() {
        let ragged = MatrixRequest {
            operation: MatrixOperation::Determinant,
            matrix1: rows(&[&[1.0, 2.0], &[3.0]]),
            matrix2: None,
        };
        assert_eq!(ragged.validate(), Err(CalcError::ragged_matrix("matrix1")));

        let missing = MatrixRequest {
            operation: MatrixOperation::Multiply,
            matrix1: rows(&[&[1.0]]),
            matrix2: None,
        };
        assert!(matches!(missing.validate(), Err(CalcError::MissingField { .. })));

        let forbidden = MatrixRequest {
            operation: MatrixOperation::Inverse,
            matrix1: rows(&[&[1.0]]),
            matrix2: Some(rows(&[&[1.0]])),
        };
        assert!(matches!(forbidden.validate(), Err(CalcError::ForbiddenField { .. })));

        let empty = MatrixRequest {
            operation: MatrixOperation::Determinant,
            matrix1: vec![],
            matrix2: None,
        };
        assert!(matches!(empty.validate(), Err(CalcError::EmptyCollection { .. })));
    }

    #[test]
    fn test_result_serializes_untagged() {
        let scalar = serde_json::to_value(MatrixResult::Scalar(-2.0)).unwrap();
        assert_eq!(scalar, serde_json::json!(-2.0));
        let matrix = serde_json::to_value(MatrixResult::Matrix(rows(&[&[1.0]]))).unwrap();
        assert_eq!(matrix, serde_json::json!([[1.0]]));
    }
}
