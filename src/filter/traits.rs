//! Traits representing the filtering algorithms

use cauchy::Scalar;
use ndarray::{ArrayBase, Data, Ix1};
use ndarray_linalg::Lapack;

use crate::error::FilterResult;

/// Recursive filtering algorithm trait
///
/// This trait indicates that implementor is a recursive filtering algorithm holding a single
/// running estimate, which is advanced by a prediction step and corrected by an update step for
/// each arriving measurement. Both steps work on inputs of type `T: Scalar + Lapack`.
///
/// The steps mutate the stored estimate in place. If a step fails, the stored estimate is the
/// same as before the call.
pub trait Filter<T: Scalar + Lapack> {
    /// Prediction operation executed by filtering algorithm.
    ///
    /// Advances the stored estimate by one step of the transition model. Calling this method
    /// twice in a row advances the estimate twice.
    fn predict(&mut self) -> FilterResult<()>;

    /// Update operation executed by filtering algorithm.
    ///
    /// Corrects the stored estimate with a single measurement, whose length has to match the
    /// currently installed measurement model.
    fn update<A: Data<Elem = T>>(&mut self, measurement: &ArrayBase<A, Ix1>) -> FilterResult<()>;
}
