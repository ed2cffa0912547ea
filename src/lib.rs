#![crate_name = "kalman_fusion"]
//! The `kalman-fusion` crate contains a linear and an extended Kalman filter used to fuse noisy,
//! asynchronous sensor measurements into a single running estimate of an object's state. A
//! typical state is position and velocity in the plane, fused from a sensor measuring position
//! directly and a sensor measuring range, bearing and range-rate.
//!
//! ## Usage
//! The filter is driven by an enclosing fusion loop. For every arriving measurement the caller
//! refreshes the transition model for the elapsed time, predicts, installs the measurement model
//! of the sensor that produced the reading and then updates:
//!
//! ```
//! use ndarray::{arr1, arr2, Array2};
//! use kalman_fusion::filter::{Filter, KalmanFilter};
//!
//! let transition = arr2(&[[1.0, 0.0, 1.0, 0.0],
//!                         [0.0, 1.0, 0.0, 1.0],
//!                         [0.0, 0.0, 1.0, 0.0],
//!                         [0.0, 0.0, 0.0, 1.0]]);
//! let observation = arr2(&[[1.0, 0.0, 0.0, 0.0],
//!                          [0.0, 1.0, 0.0, 0.0]]);
//! let mut kf = KalmanFilter::<f64>::new(
//!     &arr1(&[0.0, 0.0, 5.0, 0.0]),
//!     &Array2::<f64>::eye(4),
//!     &transition,
//!     &observation,
//!     &(Array2::<f64>::eye(2) * 0.01),
//!     &Array2::<f64>::zeros([4, 4]),
//! ).unwrap();
//!
//! kf.predict().unwrap();
//! kf.update(&arr1(&[5.0, 0.0])).unwrap();
//! assert!((kf.state()[0] - 5.0).abs() < 1e-9);
//! ```
//!
//! Nonlinear sensors are handled by [`filter::KalmanFilter::update_extended`], which evaluates
//! the polar measurement function directly and expects the caller to have installed the Jacobian
//! as measurement matrix.
extern crate blas_src;

pub mod error;
pub mod filter;

pub use error::{FilterError, FilterResult};
