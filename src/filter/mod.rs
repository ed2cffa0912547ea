//! Contains the Kalman filter fusing measurements of linear and polar sensors into a single
//! running estimate, the trait describing recursive filters and the polar measurement model.
pub mod kalman;
mod kalman_common;
pub mod measurement;
pub mod traits;

pub use kalman::KalmanFilter;
pub use measurement::{normalize_angle, polar_measurement, PolarGuard};
pub use traits::Filter;
