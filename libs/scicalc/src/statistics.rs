//! Descriptive statistics over a numeric dataset
//!
//! Variance and standard deviation are population statistics (divisor N).

use errors::{CalcError, CalcResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum StatisticsOperation {
    Mean,
    Median,
    StdDev,
    Variance,
}

impl StatisticsOperation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::StdDev => "std_dev",
            Self::Variance => "variance",
        }
    }
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn variance(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64
}

pub fn statistics_operation(operation: StatisticsOperation, data: &[f64]) -> CalcResult<f64> {
    if data.is_empty() {
        return Err(CalcError::EmptyDataset);
    }

    let result = match operation {
        StatisticsOperation::Mean => mean(data),
        StatisticsOperation::Median => median(data),
        StatisticsOperation::StdDev => variance(data).sqrt(),
        StatisticsOperation::Variance => variance(data),
    };

    if !result.is_finite() {
        return Err(CalcError::non_finite(format!(
            "{} of {} values overflowed",
            operation.name(),
            data.len()
        )));
    }

    debug!(operation = operation.name(), size = data.len(), result, "statistics evaluated");
    Ok(result)
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatisticsRequest {
    pub operation: StatisticsOperation,
    pub data: Vec<f64>,
}

impl StatisticsRequest {
    pub fn validate(&self) -> CalcResult<()> {
        if self.data.is_empty() {
            return Err(CalcError::EmptyDataset);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatisticsResponse {
    pub result: f64,
    pub operation: StatisticsOperation,
    pub dataset_size: usize,
}

pub fn evaluate(request: &StatisticsRequest) -> CalcResult<StatisticsResponse> {
    request.validate()?;
    let result = statistics_operation(request.operation, &request.data)?;
    Ok(StatisticsResponse {
        result,
        operation: request.operation,
        dataset_size: request.data.len(),
    })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    const DATA: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];

    #[test]
    fn test_basic_statistics() {
        use StatisticsOperation::*;
        assert_eq!(statistics_operation(Mean, &DATA).unwrap(), 3.0);
        assert_eq!(statistics_operation(Median, &DATA).unwrap(), 3.0);
        assert_eq!(statistics_operation(Variance, &DATA).unwrap(), 2.0);
        let std = statistics_operation(StdDev, &DATA).unwrap();
        assert!((std - 1.41421356).abs() < 1e-8);
    }

    #[test]
    fn test_median_even_and_unsorted() {
        let data = [7.0, 1.0, 3.0, 5.0];
        assert_eq!(
            statistics_operation(StatisticsOperation::Median, &data).unwrap(),
            4.0
        );
    }

    #[test]
    fn test_single_value() {
        assert_eq!(
            statistics_operation(StatisticsOperation::StdDev, &[42.0]).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_empty_dataset_rejected_at_both_layers() {
        assert_eq!(
            statistics_operation(StatisticsOperation::Mean, &[]),
            Err(CalcError::EmptyDataset)
        );
        let request = StatisticsRequest {
            operation: StatisticsOperation::Mean,
            data: vec![],
        };
        assert_eq!(request.validate(), Err(CalcError::EmptyDataset));
    }

    #[test]
    fn test_operation_wire_names() {
        let request: StatisticsRequest =
            serde_json::from_str(r#"{"operation": "std_dev", "data": [1, 2]}"#).unwrap();
        assert_eq!(request.operation, StatisticsOperation::StdDev);
        assert!(serde_json::from_str::<StatisticsRequest>(r#"{"operation": "mode", "data": [1]}"#).is_err());
    }
}
