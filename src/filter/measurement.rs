//! Nonlinear measurement model used by the extended update.
//!
//! A Cartesian state `[px, py, vx, vy, ..]` is observed in polar coordinates as range, bearing
//! and range-rate:
//!
//! ```text
//! rho     = sqrt(px² + py²)
//! phi     = atan2(py, px)
//! rho_dot = (px·vx + py·vy) / rho
//! ```
use std::f64::consts::PI;

use ndarray::{arr1, Array1, ArrayBase, Data, Ix1};
use tracing::debug;

use crate::error::{FilterError, FilterResult};

/// Number of components produced by [`polar_measurement`].
pub const POLAR_MEASUREMENT_DIM: usize = 3;

/// Number of leading state components read by [`polar_measurement`].
pub const POLAR_STATE_DIM: usize = 4;

/// Guard against evaluating the polar model at (or next to) the origin.
///
/// Whenever the magnitude of `px` or `py` is below `threshold`, that component is increased by
/// `offset` before the measurement function is evaluated. The evaluated measurement is thus
/// slightly biased away from the singular point instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarGuard {
    pub threshold: f64,
    pub offset: f64,
}

impl Default for PolarGuard {
    fn default() -> Self {
        PolarGuard {
            threshold: 1e-5,
            offset: 1e-3,
        }
    }
}

impl PolarGuard {
    fn apply(&self, component: f64, name: &'static str) -> f64 {
        if component.abs() < self.threshold {
            debug!(
                component = name,
                value = component,
                offset = self.offset,
                "bumping near-zero denominator"
            );
            component + self.offset
        } else {
            component
        }
    }
}

/// Evaluates the polar measurement function `h(x)` for the given state.
///
/// Only the first four state components are read, any further components are ignored. The
/// position components are passed through `guard` first.
///
/// ```
/// use ndarray::arr1;
/// use kalman_fusion::filter::measurement::{polar_measurement, PolarGuard};
///
/// let z = polar_measurement(&arr1(&[3.0, 4.0, 1.0, 0.0]), &PolarGuard::default()).unwrap();
/// assert!((z[0] - 5.0).abs() < 1e-12);
/// assert!((z[2] - 0.6).abs() < 1e-12);
/// ```
pub fn polar_measurement<S>(
    state: &ArrayBase<S, Ix1>,
    guard: &PolarGuard,
) -> FilterResult<Array1<f64>>
where
    S: Data<Elem = f64>,
{
    if state.len() < POLAR_STATE_DIM {
        return Err(FilterError::dimension_mismatch(
            "state vector",
            &[POLAR_STATE_DIM],
            state.shape(),
        ));
    }
    let px = guard.apply(state[0], "px");
    let py = guard.apply(state[1], "py");
    let vx = state[2];
    let vy = state[3];

    let range = (px * px + py * py).sqrt();
    let bearing = py.atan2(px);
    let range_rate = (px * vx + py * vy) / range;
    Ok(arr1(&[range, bearing, range_rate]))
}

/// Wraps an angle into `[-π, π]` by adding or subtracting whole turns.
///
/// Angles beyond one turn are reduced with a Euclidean remainder first, so the number of loop
/// iterations stays bounded for any finite input. Non-finite input is returned unchanged.
pub fn normalize_angle(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    if angle.abs() > 2.0 * PI {
        angle = (angle + PI).rem_euclid(2.0 * PI) - PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    while angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}
