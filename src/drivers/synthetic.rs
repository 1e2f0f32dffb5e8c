// FanWatch: Synthetic Accelerometer
//
// Deterministic stand-in for the MPU6050 on the host build: gravity on Z
// plus a sinusoidal vibration on X/Y, advanced by one sample period per read.

use std::f32::consts::TAU;

use crate::config::STANDARD_GRAVITY;
use crate::drivers::Accelerometer;
use crate::events::Sample;

pub struct SyntheticAccelerometer {
    /// Vibration amplitude in m/s².
    amplitude: f32,
    frequency_hz: f32,
    sample_period_s: f32,
    index: u64,
}

impl SyntheticAccelerometer {
    pub fn new(amplitude: f32, frequency_hz: f32, sample_rate_hz: f32) -> Self {
        Self {
            amplitude,
            frequency_hz,
            sample_period_s: 1.0 / sample_rate_hz,
            index: 0,
        }
    }

    fn sample_at(&self, index: u64) -> Sample {
        let phase = TAU * self.frequency_hz * (index as f32 * self.sample_period_s);
        Sample {
            x: self.amplitude * phase.sin(),
            y: self.amplitude * 0.5 * phase.cos(),
            z: STANDARD_GRAVITY,
        }
    }
}

impl Accelerometer for SyntheticAccelerometer {
    fn name(&self) -> &'static str {
        "synthetic accelerometer"
    }

    fn init(&mut self) -> anyhow::Result<()> {
        self.index = 0;
        Ok(())
    }

    fn read(&mut self) -> anyhow::Result<Sample> {
        let sample = self.sample_at(self.index);
        self.index += 1;
        Ok(sample)
    }
}
