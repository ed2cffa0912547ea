use std::ops::Neg;

use cauchy::Scalar;
use ndarray::linalg::general_mat_mul;
use ndarray::{Array1, Array2, ArrayBase, Data, Dimension, Ix1, Ix2};
use ndarray_linalg::{InverseC, Lapack};

use crate::error::{FilterError, FilterResult};

/// Computes `outer · inner · outerᵀ + add`.
pub(in crate) fn quadratic_form_add<A, S1, S2, S3>(
    outer: &ArrayBase<S1, Ix2>,
    inner: &ArrayBase<S2, Ix2>,
    add: &ArrayBase<S3, Ix2>,
) -> Array2<A>
where
    A: Scalar + Lapack,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    S3: Data<Elem = A>,
{
    let mut output = add.to_owned();
    let left_intermediate = outer.dot(inner);
    general_mat_mul(A::one(), &left_intermediate, &outer.t(), A::one(), &mut output);
    output
}

/// Returns the cross covariance `L = P·Hᵀ` together with the innovation covariance
/// `S = H·P·Hᵀ + R`.
pub(in crate) fn innovation_covariance<A, S1, S2, S3>(
    covariance: &ArrayBase<S1, Ix2>,
    observation_matrix: &ArrayBase<S2, Ix2>,
    observation_covariance: &ArrayBase<S3, Ix2>,
) -> (Array2<A>, Array2<A>)
where
    A: Scalar + Lapack,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    S3: Data<Elem = A>,
{
    let l_matrix = covariance.dot(&observation_matrix.t());
    let mut s_matrix = observation_covariance.to_owned();
    general_mat_mul(A::one(), observation_matrix, &l_matrix, A::one(), &mut s_matrix);
    (l_matrix, s_matrix)
}

/// Computes the Kalman gain `K = L·S⁻¹`.
///
/// `S` is inverted through its Cholesky factorization, hence any innovation covariance which is
/// not positive definite is reported as singular.
pub(in crate) fn kalman_gain<A: Scalar + Lapack>(
    l_matrix: &Array2<A>,
    s_matrix: &Array2<A>,
) -> FilterResult<Array2<A>> {
    let s_inv = s_matrix
        .invc()
        .map_err(FilterError::SingularInnovationCovariance)?;
    Ok(l_matrix.dot(&s_inv))
}

/// Posterior state `x + K·y`.
pub(in crate) fn update_state<A, S1, S2>(
    state: &ArrayBase<S1, Ix1>,
    kalman_gain: &Array2<A>,
    innovation: &ArrayBase<S2, Ix1>,
) -> Array1<A>
where
    A: Scalar + Lapack,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
{
    let mut updated_state = state.to_owned();
    updated_state += &kalman_gain.dot(innovation);
    updated_state
}

/// Posterior covariance `(I − K·H)·P`, evaluated as `P − K·(H·P)`.
pub(in crate) fn update_covariance<A, S1, S2>(
    covariance: &ArrayBase<S1, Ix2>,
    kalman_gain: &Array2<A>,
    observation_matrix: &ArrayBase<S2, Ix2>,
) -> Array2<A>
where
    A: Scalar + Lapack,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
{
    let mut updated_covariance = covariance.to_owned();
    let hp = observation_matrix.dot(covariance);
    general_mat_mul(
        A::one().neg(),
        kalman_gain,
        &hp,
        A::one(),
        &mut updated_covariance,
    );
    updated_covariance
}

/// True when no element is NaN or infinite.
pub(in crate) fn all_finite<A, S, D>(arr: &ArrayBase<S, D>) -> bool
where
    A: Scalar,
    S: Data<Elem = A>,
    D: Dimension,
{
    // x - x is zero for every finite x and NaN otherwise
    arr.iter().all(|&value| value - value == A::zero())
}

pub(in crate) fn check_square<A, S>(
    operand: &'static str,
    arr: &ArrayBase<S, Ix2>,
    size: usize,
) -> FilterResult<()>
where
    S: Data<Elem = A>,
{
    check_shape(operand, arr.shape(), &[size, size])
}

pub(in crate) fn check_shape(
    operand: &'static str,
    found: &[usize],
    expected: &[usize],
) -> FilterResult<()> {
    if found != expected {
        return Err(FilterError::dimension_mismatch(operand, expected, found));
    }
    Ok(())
}
