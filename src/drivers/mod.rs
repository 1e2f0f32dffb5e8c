pub mod imu;
pub mod synthetic;

use crate::events::Sample;

/// A 3-axis accelerometer the sampler can pull readings from.
pub trait Accelerometer {
    /// Part name used in status lines ("MPU6050 found").
    fn name(&self) -> &'static str;

    /// Probe and configure the device.
    fn init(&mut self) -> anyhow::Result<()>;

    /// One reading in m/s².
    fn read(&mut self) -> anyhow::Result<Sample>;
}
