//! This module contains the Kalman filter holding a single running estimate, together with its
//! extended variant for the polar (range, bearing, range-rate) measurement model.
use super::kalman_common;
use super::measurement::{normalize_angle, polar_measurement, PolarGuard, POLAR_MEASUREMENT_DIM};
use super::traits::Filter;
use crate::error::{FilterError, FilterResult};
use cauchy::Scalar;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};
use ndarray_linalg::Lapack;
use tracing::{trace, warn};

/// Linear Kalman filter with an extended update step
///
/// This type owns the running estimate (state vector `x` and covariance `P`), the transition
/// model (`F` and process noise `Q`) and the measurement model (`H` and measurement noise `R`).
/// Estimates are advanced with [`Filter::predict`] and corrected either with [`Filter::update`]
/// for linear sensors or with [`KalmanFilter::update_extended`] for polar sensors.
///
/// The models are expected to be refreshed by the caller between steps: `F` and `Q` depend on
/// the time elapsed since the previous measurement, while `H` and `R` depend on the sensor which
/// produced the next one. All of them are replaced wholesale and validated against the state
/// dimension, which only changes when the filter is re-initialized.
///
/// Type parameter `T: Scalar + Lapack` is used to indicate that the linear filter can contain any
/// matrices, which are considered to contain numbers ( i.e real or complex numbers ).
#[derive(Debug, Clone)]
pub struct KalmanFilter<T: Scalar + Lapack> {
    state: Array1<T>,
    covariance: Array2<T>,
    transition_matrix: Array2<T>,
    observation_matrix: Array2<T>,
    observation_covariance: Array2<T>,
    transition_covariance: Array2<T>,
    polar_guard: PolarGuard,
}

impl<T: Scalar + Lapack> Filter<T> for KalmanFilter<T> {
    /// Computes `x ← F·x` and `P ← F·P·Fᵀ + Q`.
    fn predict(&mut self) -> FilterResult<()> {
        trace!(state_dim = self.state.len(), "predict");
        let predicted_state = self.transition_matrix.dot(&self.state);
        let predicted_covariance = kalman_common::quadratic_form_add(
            &self.transition_matrix,
            &self.covariance,
            &self.transition_covariance,
        );
        self.state = predicted_state;
        self.covariance = predicted_covariance;
        Ok(())
    }

    /// Corrects the estimate with a measurement of a linear sensor, with innovation `z − H·x`.
    fn update<A: Data<Elem = T>>(&mut self, measurement: &ArrayBase<A, Ix1>) -> FilterResult<()> {
        trace!(measurement_dim = measurement.len(), "linear update");
        let innovation = self.linear_innovation(measurement)?;
        self.correct(&innovation)
    }
}

impl<T: Scalar + Lapack> KalmanFilter<T> {
    /// Creates new Kalman filter from the initial estimate and models
    ///
    /// The arguments are the initial state `x0` (length n), its covariance `P0` (n×n), the
    /// transition matrix `F0` (n×n), the measurement matrix `H0` (m×n), the measurement noise `R0`
    /// (m×m) and the process noise `Q0` (n×n). All of them are copied into the filter.
    ///
    /// If any of the shapes is inconsistent with the length of `x0`, or with the number of rows of
    /// `H0`, the return value is the error variant naming the offending operand.
    pub fn new(
        state: &ArrayBase<impl Data<Elem = T>, Ix1>,
        covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
        transition_matrix: &ArrayBase<impl Data<Elem = T>, Ix2>,
        observation_matrix: &ArrayBase<impl Data<Elem = T>, Ix2>,
        observation_covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
        transition_covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
    ) -> FilterResult<KalmanFilter<T>> {
        let state_dim = state.len();
        kalman_common::check_square("covariance", covariance, state_dim)?;
        Self::check_transition_model(state_dim, transition_matrix, transition_covariance)?;
        Self::check_measurement_model(state_dim, observation_matrix, observation_covariance)?;

        Ok(KalmanFilter {
            state: state.to_owned(),
            covariance: covariance.to_owned(),
            transition_matrix: transition_matrix.to_owned(),
            observation_matrix: observation_matrix.to_owned(),
            observation_covariance: observation_covariance.to_owned(),
            transition_covariance: transition_covariance.to_owned(),
            polar_guard: PolarGuard::default(),
        })
    }

    /// Replaces the estimate and all models, as if the filter was constructed anew.
    ///
    /// The state dimension may change here. The polar guard is kept. On error the filter is left
    /// untouched.
    pub fn initialize(
        &mut self,
        state: &ArrayBase<impl Data<Elem = T>, Ix1>,
        covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
        transition_matrix: &ArrayBase<impl Data<Elem = T>, Ix2>,
        observation_matrix: &ArrayBase<impl Data<Elem = T>, Ix2>,
        observation_covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
        transition_covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
    ) -> FilterResult<()> {
        let polar_guard = self.polar_guard;
        *self = KalmanFilter::new(
            state,
            covariance,
            transition_matrix,
            observation_matrix,
            observation_covariance,
            transition_covariance,
        )?
        .with_polar_guard(polar_guard);
        Ok(())
    }

    /// Replaces the guard used by [`KalmanFilter::update_extended`] near the origin.
    pub fn with_polar_guard(mut self, polar_guard: PolarGuard) -> Self {
        self.polar_guard = polar_guard;
        self
    }

    /// Installs a new transition matrix `F` and process noise `Q`, both n×n.
    pub fn set_transition(
        &mut self,
        transition_matrix: &ArrayBase<impl Data<Elem = T>, Ix2>,
        transition_covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
    ) -> FilterResult<()> {
        Self::check_transition_model(self.state.len(), transition_matrix, transition_covariance)?;
        self.transition_matrix = transition_matrix.to_owned();
        self.transition_covariance = transition_covariance.to_owned();
        Ok(())
    }

    /// Installs a new measurement matrix `H` (m×n) and measurement noise `R` (m×m).
    ///
    /// For the extended update `H` is the Jacobian of the measurement function evaluated at the
    /// current state, so it has to be installed after the preceding prediction.
    pub fn set_measurement_model(
        &mut self,
        observation_matrix: &ArrayBase<impl Data<Elem = T>, Ix2>,
        observation_covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
    ) -> FilterResult<()> {
        Self::check_measurement_model(
            self.state.len(),
            observation_matrix,
            observation_covariance,
        )?;
        self.observation_matrix = observation_matrix.to_owned();
        self.observation_covariance = observation_covariance.to_owned();
        Ok(())
    }

    pub fn state(&self) -> &Array1<T> {
        &self.state
    }

    pub fn covariance(&self) -> &Array2<T> {
        &self.covariance
    }

    pub fn transition_matrix(&self) -> &Array2<T> {
        &self.transition_matrix
    }

    pub fn process_noise(&self) -> &Array2<T> {
        &self.transition_covariance
    }

    pub fn measurement_matrix(&self) -> &Array2<T> {
        &self.observation_matrix
    }

    pub fn measurement_noise(&self) -> &Array2<T> {
        &self.observation_covariance
    }

    pub fn polar_guard(&self) -> &PolarGuard {
        &self.polar_guard
    }

    pub fn state_dim(&self) -> usize {
        self.state.len()
    }

    pub fn measurement_dim(&self) -> usize {
        self.observation_matrix.nrows()
    }

    /// Innovation `z − H·x` of a linear measurement, without touching the estimate.
    pub fn linear_innovation<A: Data<Elem = T>>(
        &self,
        measurement: &ArrayBase<A, Ix1>,
    ) -> FilterResult<Array1<T>> {
        self.check_measurement(measurement)?;
        Ok(measurement.to_owned() - self.observation_matrix.dot(&self.state))
    }

    /// Kalman gain `K = P·Hᵀ·(H·P·Hᵀ + R)⁻¹` for the current estimate and measurement model.
    pub fn kalman_gain(&self) -> FilterResult<Array2<T>> {
        let (l_matrix, s_matrix) = kalman_common::innovation_covariance(
            &self.covariance,
            &self.observation_matrix,
            &self.observation_covariance,
        );
        kalman_common::kalman_gain(&l_matrix, &s_matrix)
    }

    /// Posterior step shared by the linear and the extended update.
    fn correct(&mut self, innovation: &Array1<T>) -> FilterResult<()> {
        let gain = match self.kalman_gain() {
            Ok(gain) => gain,
            Err(err) => {
                warn!(error = %err, "rejecting measurement");
                return Err(err);
            }
        };
        let updated_state = kalman_common::update_state(&self.state, &gain, innovation);
        let updated_covariance =
            kalman_common::update_covariance(&self.covariance, &gain, &self.observation_matrix);
        self.state = updated_state;
        self.covariance = updated_covariance;
        Ok(())
    }

    fn check_measurement<A: Data<Elem = T>>(
        &self,
        measurement: &ArrayBase<A, Ix1>,
    ) -> FilterResult<()> {
        kalman_common::check_shape(
            "measurement",
            measurement.shape(),
            &[self.observation_matrix.nrows()],
        )?;
        if !kalman_common::all_finite(measurement) {
            return Err(FilterError::NonFiniteMeasurement);
        }
        Ok(())
    }

    fn check_transition_model(
        state_dim: usize,
        transition_matrix: &ArrayBase<impl Data<Elem = T>, Ix2>,
        transition_covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
    ) -> FilterResult<()> {
        kalman_common::check_square("transition matrix", transition_matrix, state_dim)?;
        kalman_common::check_square("process noise", transition_covariance, state_dim)
    }

    fn check_measurement_model(
        state_dim: usize,
        observation_matrix: &ArrayBase<impl Data<Elem = T>, Ix2>,
        observation_covariance: &ArrayBase<impl Data<Elem = T>, Ix2>,
    ) -> FilterResult<()> {
        let measurement_dim = observation_matrix.nrows();
        kalman_common::check_shape(
            "measurement matrix",
            observation_matrix.shape(),
            &[measurement_dim, state_dim],
        )?;
        kalman_common::check_square("measurement noise", observation_covariance, measurement_dim)
    }
}

impl KalmanFilter<f64> {
    /// Innovation of a polar measurement `[range, bearing, range-rate]`, without touching the
    /// estimate.
    ///
    /// The predicted measurement is `h(x)` evaluated directly on the state (see
    /// [`polar_measurement`]), and the bearing residual is wrapped into `[-π, π]`.
    pub fn polar_innovation<A: Data<Elem = f64>>(
        &self,
        measurement: &ArrayBase<A, Ix1>,
    ) -> FilterResult<Array1<f64>> {
        kalman_common::check_shape(
            "measurement matrix",
            &[self.observation_matrix.nrows()],
            &[POLAR_MEASUREMENT_DIM],
        )?;
        self.check_measurement(measurement)?;
        let predicted_measurement = polar_measurement(&self.state, &self.polar_guard)?;
        let mut innovation = measurement.to_owned() - predicted_measurement;
        innovation[1] = normalize_angle(innovation[1]);
        Ok(innovation)
    }

    /// Extended Kalman filter update with a polar measurement `[range, bearing, range-rate]`.
    ///
    /// The installed measurement matrix has to be the 3×n Jacobian of the polar measurement
    /// function evaluated at the current state, and the installed measurement noise the
    /// corresponding 3×3 matrix. Apart from the innovation the algebra is the one of
    /// [`Filter::update`].
    ///
    /// ```
    /// use ndarray::{arr1, arr2, Array2};
    /// use kalman_fusion::filter::KalmanFilter;
    ///
    /// // object at (3, 4) moving along x with unit speed
    /// let jacobian = arr2(&[[0.6, 0.8, 0.0, 0.0],
    ///                       [-0.16, 0.12, 0.0, 0.0],
    ///                       [0.128, -0.096, 0.6, 0.8]]);
    /// let mut ekf = KalmanFilter::<f64>::new(
    ///     &arr1(&[3.0, 4.0, 1.0, 0.0]),
    ///     &Array2::<f64>::eye(4),
    ///     &Array2::<f64>::eye(4),
    ///     &jacobian,
    ///     &Array2::from_diag(&arr1(&[0.09, 0.0009, 0.09])),
    ///     &Array2::<f64>::zeros([4, 4]),
    /// ).unwrap();
    ///
    /// ekf.update_extended(&arr1(&[5.0, 4.0f64.atan2(3.0), 0.6])).unwrap();
    /// assert!((ekf.state()[0] - 3.0).abs() < 1e-9);
    /// assert!((ekf.state()[1] - 4.0).abs() < 1e-9);
    /// ```
    pub fn update_extended<A: Data<Elem = f64>>(
        &mut self,
        measurement: &ArrayBase<A, Ix1>,
    ) -> FilterResult<()> {
        trace!(measurement_dim = measurement.len(), "extended update");
        let innovation = self.polar_innovation(measurement)?;
        self.correct(&innovation)
    }
}
