//! FanWatch: fan condition monitoring from vibration.
//!
//! Samples an MPU6050 accelerometer at the rate an Edge Impulse model was
//! trained with, runs the impulse over each window and prints the
//! per-label confidences (Damage / Normal / Silent / Warning) to the serial
//! console.
//!
//! The sensor, clock, classifier and output sink are all traits so that the
//! sampling loop can be driven by synthetic data on the host.

pub mod classifier;
pub mod clock;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod monitor;
pub mod report;
pub mod sampler;

#[cfg(test)]
mod tests;

pub use error::Error;
