// FanWatch: Fixed-Rate Sampler
//
// Fills a flat x,y,z,x,y,z,... buffer at the sampling interval the model
// was trained with. Each slot's deadline is taken *before* the read, so the
// spacing stays constant however long the I2C transfer takes. When a read
// overruns its slot the remaining sleep is floored at zero and the
// effective rate drops; the buffer shape never changes.

use std::time::Duration;

use crate::clock::Clock;
use crate::config::EI_RAW_SAMPLES_PER_FRAME;
use crate::drivers::Accelerometer;
use crate::error::Error;

/// Pre-allocated sample arena of `N` values (`N / 3` samples).
pub struct SampleBuffer<const N: usize> {
    values: [f32; N],
}

impl<const N: usize> SampleBuffer<N> {
    const SHAPE_OK: () = assert!(
        N > 0 && N % EI_RAW_SAMPLES_PER_FRAME == 0,
        "sample buffer length must be a non-zero multiple of 3"
    );

    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SHAPE_OK;
        Self { values: [0.0; N] }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn reset(&mut self) {
        self.values = [0.0; N];
    }

    fn frames_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.values.chunks_exact_mut(EI_RAW_SAMPLES_PER_FRAME)
    }
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one successful fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    pub samples: usize,
    /// Slots whose read did not finish before the next deadline.
    pub overruns: usize,
}

pub struct FixedRateSampler {
    interval: Duration,
    clamp: Option<f32>,
}

impl FixedRateSampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            clamp: None,
        }
    }

    /// Clamp every axis to `±limit` (same unit as the readings).
    pub fn with_clamp(mut self, limit: f32) -> Self {
        self.clamp = Some(limit.abs());
        self
    }

    /// Reset `buffer` and refill it completely from `sensor`.
    ///
    /// A failed read aborts the fill; the caller must not submit the buffer.
    pub fn fill<A, C, const N: usize>(
        &self,
        sensor: &mut A,
        clock: &mut C,
        buffer: &mut SampleBuffer<N>,
    ) -> Result<FillStats, Error>
    where
        A: Accelerometer,
        C: Clock,
    {
        buffer.reset();
        let mut stats = FillStats::default();

        for frame in buffer.frames_mut() {
            let next_tick = clock.now() + self.interval;

            let sample = sensor.read().map_err(|source| Error::SensorRead {
                sensor: sensor.name(),
                source,
            })?;

            for (slot, value) in frame.iter_mut().zip(sample.axes()) {
                *slot = match self.clamp {
                    Some(limit) => clamp_axis(value, limit),
                    None => value,
                };
            }
            stats.samples += 1;

            let remaining = next_tick.saturating_sub(clock.now());
            if remaining.is_zero() {
                stats.overruns += 1;
            } else {
                clock.sleep(remaining);
            }
        }

        if stats.overruns > 0 {
            log::debug!(
                "{} of {} samples overran the {:?} interval",
                stats.overruns,
                stats.samples,
                self.interval
            );
        }
        Ok(stats)
    }
}

/// 1.0 for positive numbers and zero, -1.0 for negative.
fn sign(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

fn clamp_axis(value: f32, limit: f32) -> f32 {
    if value.abs() > limit {
        sign(value) * limit
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::harness::{ManualClock, ScriptedSensor};

    const PERIOD: Duration = Duration::from_millis(10);

    fn assert_frames(values: &[f32], first_index: usize) {
        for (i, frame) in values.chunks(3).enumerate() {
            let n = (first_index + i) as f32;
            assert!((frame[0] - n).abs() < 1e-4, "x of frame {}", i);
            assert!((frame[1] - (n + 0.1)).abs() < 1e-4, "y of frame {}", i);
            assert!((frame[2] - (n + 0.2)).abs() < 1e-4, "z of frame {}", i);
        }
    }

    #[test]
    fn buffer_is_filled_in_xyz_order() {
        let clock = ManualClock::new();
        let mut sensor = ScriptedSensor::counting();
        let mut buffer = SampleBuffer::<12>::new();

        let stats = FixedRateSampler::new(PERIOD)
            .fill(&mut sensor, &mut clock.clone(), &mut buffer)
            .unwrap();

        assert_eq!(stats, FillStats { samples: 4, overruns: 0 });
        assert_eq!(buffer.as_slice().len(), 12);
        assert_frames(buffer.as_slice(), 0);
    }

    #[test]
    fn shape_holds_for_every_cycle() {
        let mut clock = ManualClock::new();
        let mut sensor = ScriptedSensor::counting();
        let mut buffer = SampleBuffer::<30>::new();
        let sampler = FixedRateSampler::new(PERIOD);

        for cycle in 0..5 {
            sampler.fill(&mut sensor, &mut clock, &mut buffer).unwrap();
            assert_eq!(buffer.len(), 30);
            // Fully overwritten: every frame belongs to this cycle.
            assert_frames(buffer.as_slice(), cycle * 10);
        }
    }

    #[test]
    fn sleeps_only_the_remainder_of_each_slot() {
        let mut clock = ManualClock::new();
        let mut sensor =
            ScriptedSensor::counting().with_read_cost(clock.clone(), Duration::from_millis(3));
        let mut buffer = SampleBuffer::<9>::new();

        FixedRateSampler::new(PERIOD)
            .fill(&mut sensor, &mut clock, &mut buffer)
            .unwrap();

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(7); 3]);
        assert_eq!(clock.now(), PERIOD * 3);
    }

    #[test]
    fn slow_reads_never_sleep_and_still_fill() {
        let mut clock = ManualClock::new();
        let mut sensor =
            ScriptedSensor::counting().with_read_cost(clock.clone(), Duration::from_millis(15));
        let mut buffer = SampleBuffer::<9>::new();

        let stats = FixedRateSampler::new(PERIOD)
            .fill(&mut sensor, &mut clock, &mut buffer)
            .unwrap();

        assert!(clock.sleeps().is_empty());
        assert_eq!(stats, FillStats { samples: 3, overruns: 3 });
        assert_frames(buffer.as_slice(), 0);
        assert_eq!(clock.now(), Duration::from_millis(45));
    }

    #[test]
    fn read_of_exactly_one_period_does_not_sleep() {
        let mut clock = ManualClock::new();
        let mut sensor = ScriptedSensor::counting().with_read_cost(clock.clone(), PERIOD);
        let mut buffer = SampleBuffer::<3>::new();

        let stats = FixedRateSampler::new(PERIOD)
            .fill(&mut sensor, &mut clock, &mut buffer)
            .unwrap();

        assert_eq!(stats.overruns, 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn read_error_aborts_fill() {
        let mut clock = ManualClock::new();
        let mut sensor = ScriptedSensor::counting().fail_read_at(2);
        let mut buffer = SampleBuffer::<12>::new();

        let err = FixedRateSampler::new(PERIOD)
            .fill(&mut sensor, &mut clock, &mut buffer)
            .unwrap_err();

        assert!(matches!(err, Error::SensorRead { sensor: "scripted", .. }));
        assert_eq!(sensor.reads(), 3);
    }

    #[test]
    fn clamp_limits_each_axis() {
        let mut clock = ManualClock::new();
        let mut sensor = ScriptedSensor::fixed([25.0, -30.0, 0.0]);
        let mut buffer = SampleBuffer::<3>::new();

        FixedRateSampler::new(PERIOD)
            .with_clamp(19.6)
            .fill(&mut sensor, &mut clock, &mut buffer)
            .unwrap();

        assert_eq!(buffer.as_slice(), &[19.6, -19.6, 0.0]);
    }

    #[test]
    fn sign_of_zero_is_positive() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(-0.5), -1.0);
        assert_eq!(clamp_axis(-3.0, 2.0), -2.0);
        assert_eq!(clamp_axis(1.5, 2.0), 1.5);
    }
}
