// FanWatch: Monitor
//
// One thread, strictly sequential:
//   setup():      banner, sensor init, model/sensor dimension check.
//   run_cycle():  start delay -> fill buffer -> signal -> classify -> report.
//
// Errors are written to the sink where they happen and end only the current
// cycle. The buffer is allocated once and owned by the monitor.

use std::time::Duration;

use crate::classifier::{Classifier, Signal};
use crate::clock::Clock;
use crate::config::*;
use crate::drivers::Accelerometer;
use crate::error::Error;
use crate::events::ClassificationResult;
use crate::report::{ReportSink, Reporter};
use crate::sampler::{FixedRateSampler, SampleBuffer};

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Pause before each sampling window.
    pub start_delay: Duration,
    pub trigger_threshold: f32,
    /// Per-axis clamp in m/s², `None` to pass readings through.
    pub clamp: Option<f32>,
    pub debug_nn: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(CYCLE_START_DELAY_MS),
            trigger_threshold: TRIGGER_THRESHOLD,
            clamp: Some(MAX_ACCEPTED_RANGE_G * STANDARD_GRAVITY),
            debug_nn: EI_DEBUG_NN,
        }
    }
}

/// Outcome of `Monitor::setup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Sensor init failed; cycles still run on whatever it returns.
    Degraded,
    /// Model input does not match the sensor; no cycle will run.
    Misconfigured,
}

pub struct Monitor<A, C, M, S, const N: usize> {
    sensor: A,
    clock: C,
    classifier: M,
    sink: S,
    sampler: FixedRateSampler,
    reporter: Reporter,
    buffer: SampleBuffer<N>,
    config: MonitorConfig,
    readiness: Option<Readiness>,
}

impl<A, C, M, S, const N: usize> Monitor<A, C, M, S, N>
where
    A: Accelerometer,
    C: Clock,
    M: Classifier,
    S: ReportSink,
{
    pub fn new(sensor: A, clock: C, classifier: M, sink: S, config: MonitorConfig) -> Self {
        let mut sampler = FixedRateSampler::new(classifier.model().interval());
        if let Some(limit) = config.clamp {
            sampler = sampler.with_clamp(limit);
        }

        Self {
            sensor,
            clock,
            classifier,
            sink,
            sampler,
            reporter: Reporter::new(config.trigger_threshold),
            buffer: SampleBuffer::new(),
            config,
            readiness: None,
        }
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn classifier_mut(&mut self) -> &mut M {
        &mut self.classifier
    }

    pub fn sensor_mut(&mut self) -> &mut A {
        &mut self.sensor
    }

    /// Bring up the sensor and check the model shape. Runs once.
    pub fn setup(&mut self) -> Readiness {
        self.sink.line("Condition of fan through vibration");

        let mut readiness = Readiness::Ready;
        match self.sensor.init() {
            Ok(()) => self.sink.line(&format!("{} found", self.sensor.name())),
            Err(source) => {
                self.emit(&Error::SensorInit {
                    sensor: self.sensor.name(),
                    source,
                });
                readiness = Readiness::Degraded;
            }
        }

        let samples_per_frame = self.classifier.model().raw_samples_per_frame;
        if samples_per_frame != EI_RAW_SAMPLES_PER_FRAME {
            self.emit(&Error::ConfigMismatch { samples_per_frame });
            readiness = Readiness::Misconfigured;
        }

        let model = self.classifier.model();
        log::info!(
            "Model: {} samples x {} axes @ {:.1} Hz, {} labels",
            model.raw_sample_count,
            model.raw_samples_per_frame,
            model.frequency_hz(),
            model.labels.len()
        );

        self.readiness = Some(readiness);
        readiness
    }

    /// One sampling + inference cycle.
    pub fn run_cycle(&mut self) -> Result<(), Error> {
        if self.readiness == Some(Readiness::Misconfigured) {
            // Already reported by setup().
            return Err(Error::ConfigMismatch {
                samples_per_frame: self.classifier.model().raw_samples_per_frame,
            });
        }

        self.sink.line(&format!(
            "Starting inferencing in {} seconds...",
            self.config.start_delay.as_secs_f32()
        ));
        self.clock.sleep(self.config.start_delay);

        self.sink.line("Sampling...");
        let result = self.sample_and_classify();
        match result {
            Ok(result) => {
                self.reporter.report(&result, &mut self.sink);
                Ok(())
            }
            Err(e) => {
                self.emit(&e);
                Err(e)
            }
        }
    }

    fn sample_and_classify(&mut self) -> Result<ClassificationResult, Error> {
        self.sampler
            .fill(&mut self.sensor, &mut self.clock, &mut self.buffer)?;

        // A buffer of any other length than the model frame is rejected here,
        // before the classifier sees it.
        let frame_size = self.classifier.model().dsp_input_frame_size();
        let signal = Signal::from_buffer(self.buffer.as_slice(), frame_size)
            .map_err(Error::SignalConstruction)?;

        self.classifier
            .classify(&signal, self.config.debug_nn)
            .map_err(Error::Classification)
    }

    /// setup() if not done yet, then cycle forever.
    pub fn run_forever(&mut self) -> ! {
        let readiness = match self.readiness {
            Some(readiness) => readiness,
            None => self.setup(),
        };

        if readiness == Readiness::Misconfigured {
            log::error!("Model does not match the sensor; inference disabled");
            loop {
                self.clock.sleep(Duration::from_secs(60));
            }
        }

        loop {
            // Errors were already printed; the next cycle starts clean.
            let _ = self.run_cycle();
        }
    }

    fn emit(&mut self, error: &Error) {
        self.sink.line(&error.to_string());
    }
}
