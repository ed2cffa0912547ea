//! Errors reported by the filtering algorithms.

use ndarray_linalg::error::LinalgError;
use std::fmt;

/// Result type returned by every fallible filter operation.
pub type FilterResult<T> = Result<T, FilterError>;

/// Failure of a single filter call.
///
/// A call which returns an error leaves the stored state and covariance exactly as they were
/// before the call, so the caller may skip the measurement, reset the filter or abort.
#[derive(Debug)]
pub enum FilterError {
    /// An operand does not have the shape implied by the rest of the filter.
    DimensionMismatch {
        operand: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// The innovation covariance `S = H·P·Hᵀ + R` is singular or otherwise not positive definite,
    /// so its Cholesky-based inverse could not be computed.
    SingularInnovationCovariance(LinalgError),
    /// A measurement contained a NaN or infinite component.
    NonFiniteMeasurement,
}

impl FilterError {
    pub(crate) fn dimension_mismatch(
        operand: &'static str,
        expected: &[usize],
        found: &[usize],
    ) -> Self {
        FilterError::DimensionMismatch {
            operand,
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::DimensionMismatch {
                operand,
                expected,
                found,
            } => write!(
                f,
                "{} has shape {:?}, expected {:?}",
                operand, found, expected
            ),
            FilterError::SingularInnovationCovariance(err) => {
                write!(f, "innovation covariance is not positive definite: {}", err)
            }
            FilterError::NonFiniteMeasurement => write!(f, "measurement is not finite"),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::SingularInnovationCovariance(err) => Some(err),
            _ => None,
        }
    }
}
