// FanWatch: Classification Boundary
//
// The impulse (DSP + NN) is generated offline by Edge Impulse. This module
// only presents the sample buffer to it as a signal and brings the result
// back as plain Rust values.
//
// Back-ends:
//   1. STUB (default): a vibration-energy heuristic so the firmware and the
//      host build run end-to-end without the C++ SDK.
//   2. FFI (`edge-impulse` feature): links the exported C++ library through
//      the `ei_shim` wrapper compiled by build.rs.

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::*;
use crate::events::{ClassificationResult, Prediction, Timing};

// ---------------------------------------------------------------------------
// Error codes (EI_IMPULSE_ERROR values)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const SHAPES_DONT_MATCH: Self = Self(-1);
    pub const DSP_ERROR: Self = Self(-5);
    pub const INVALID_SIZE: Self = Self(-20);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Model metadata
// ---------------------------------------------------------------------------

/// Input shape and labels of a trained impulse (`model_metadata.h`).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub raw_samples_per_frame: usize,
    pub raw_sample_count: usize,
    pub interval_ms: f32,
    pub labels: &'static [&'static str],
    pub has_anomaly: bool,
}

impl ModelInfo {
    pub fn dsp_input_frame_size(&self) -> usize {
        self.raw_samples_per_frame * self.raw_sample_count
    }

    /// Sampling interval the model was trained with.
    pub fn interval(&self) -> Duration {
        Duration::from_micros((self.interval_ms * 1000.0).round() as u64)
    }

    pub fn frequency_hz(&self) -> f32 {
        1000.0 / self.interval_ms
    }
}

/// Labels in model output order.
pub const LABELS: [&str; EI_LABEL_COUNT] = ["damage", "normal", "silent", "warning"];

pub const FAN_MODEL: ModelInfo = ModelInfo {
    raw_samples_per_frame: EI_RAW_SAMPLES_PER_FRAME,
    raw_sample_count: EI_RAW_SAMPLE_COUNT,
    interval_ms: EI_INTERVAL_MS,
    labels: &LABELS,
    has_anomaly: EI_HAS_ANOMALY,
};

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// Read-only view over a sample buffer, as consumed by the impulse.
#[derive(Debug, Clone, Copy)]
pub struct Signal<'a> {
    data: &'a [f32],
}

impl<'a> Signal<'a> {
    /// Present all of `buffer` as a signal of `total_length` values. The
    /// buffer is never truncated: any other length is rejected.
    pub fn from_buffer(buffer: &'a [f32], total_length: usize) -> Result<Self, ErrorCode> {
        if total_length == 0 || total_length != buffer.len() {
            return Err(ErrorCode::INVALID_SIZE);
        }
        Ok(Self { data: buffer })
    }

    pub fn total_length(&self) -> usize {
        self.data.len()
    }

    /// Copy `out.len()` values starting at `offset`.
    pub fn get_data(&self, offset: usize, out: &mut [f32]) -> Result<(), ErrorCode> {
        let end = offset
            .checked_add(out.len())
            .filter(|&end| end <= self.data.len())
            .ok_or(ErrorCode::SHAPES_DONT_MATCH)?;
        out.copy_from_slice(&self.data[offset..end]);
        Ok(())
    }

    #[cfg_attr(not(feature = "edge-impulse"), allow(dead_code))]
    pub(crate) fn as_slice(&self) -> &'a [f32] {
        self.data
    }
}

// ---------------------------------------------------------------------------
// Classifier capability
// ---------------------------------------------------------------------------

pub trait Classifier {
    fn model(&self) -> &ModelInfo;

    /// Run the impulse over `signal`. A signal whose length differs from the
    /// model's DSP input frame size is rejected with `SHAPES_DONT_MATCH`.
    fn classify(
        &mut self,
        signal: &Signal<'_>,
        debug: bool,
    ) -> Result<ClassificationResult, ErrorCode>;
}

/// The back-end selected at build time.
#[cfg(not(feature = "edge-impulse"))]
pub fn default_classifier() -> StubClassifier {
    StubClassifier::new(FAN_MODEL)
}

/// The back-end selected at build time.
#[cfg(feature = "edge-impulse")]
pub fn default_classifier() -> EdgeImpulseClassifier {
    EdgeImpulseClassifier::new()
}

fn elapsed_ms(since: Instant) -> i32 {
    since.elapsed().as_millis().min(i32::MAX as u128) as i32
}

// ---------------------------------------------------------------------------
// Stub back-end: development / testing without the C++ SDK
// ---------------------------------------------------------------------------

/// Scores the RMS vibration (per-axis deviation from the window mean) and
/// maps quiet / steady / rough / violent to silent / normal / warning /
/// damage. Good enough to exercise the reporting path.
pub struct StubClassifier {
    model: ModelInfo,
}

impl StubClassifier {
    pub fn new(model: ModelInfo) -> Self {
        Self { model }
    }

    fn vibration_rms(&self, signal: &Signal<'_>) -> Result<f32, ErrorCode> {
        let axes = self.model.raw_samples_per_frame;
        let frames = self.model.raw_sample_count;
        let mut frame = vec![0.0f32; axes];

        let mut mean = vec![0.0f32; axes];
        for i in 0..frames {
            signal.get_data(i * axes, &mut frame)?;
            for (m, v) in mean.iter_mut().zip(&frame) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= frames as f32);

        let mut sum_sq = 0.0f32;
        for i in 0..frames {
            signal.get_data(i * axes, &mut frame)?;
            sum_sq += frame
                .iter()
                .zip(&mean)
                .map(|(v, m)| (v - m) * (v - m))
                .sum::<f32>();
        }
        Ok((sum_sq / frames as f32).sqrt())
    }
}

impl Classifier for StubClassifier {
    fn model(&self) -> &ModelInfo {
        &self.model
    }

    fn classify(
        &mut self,
        signal: &Signal<'_>,
        debug: bool,
    ) -> Result<ClassificationResult, ErrorCode> {
        if signal.total_length() != self.model.dsp_input_frame_size() {
            return Err(ErrorCode::SHAPES_DONT_MATCH);
        }

        let dsp_start = Instant::now();
        let rms = self.vibration_rms(signal)?;
        let dsp_ms = elapsed_ms(dsp_start);

        let nn_start = Instant::now();
        // [damage, normal, silent, warning]
        let preds = if rms < 0.05 {
            [0.02, 0.08, 0.88, 0.02]
        } else if rms < 0.5 {
            [0.03, 0.90, 0.04, 0.03]
        } else if rms < 1.5 {
            [0.10, 0.07, 0.02, 0.81]
        } else {
            [0.91, 0.02, 0.01, 0.06]
        };
        let classification_ms = elapsed_ms(nn_start);

        if debug {
            log::debug!("STUB inference: rms = {:.3} m/s², preds = {:?}", rms, preds);
        }

        Ok(ClassificationResult {
            classification: self
                .model
                .labels
                .iter()
                .zip(preds)
                .map(|(label, value)| Prediction::new(*label, value))
                .collect(),
            anomaly: self.model.has_anomaly.then_some(0.0),
            timing: Timing {
                dsp_ms,
                classification_ms,
                anomaly_ms: 0,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Real FFI back-end: calls the C++ Edge Impulse compiled library
// ---------------------------------------------------------------------------
#[cfg(feature = "edge-impulse")]
mod ffi {
    use std::ffi::c_char;

    // Mirrors `fw_prediction_t` / `fw_result_t` in ei_shim/ei_shim.cpp.
    #[repr(C)]
    pub struct FwPrediction {
        pub label: *const c_char,
        pub value: f32,
    }

    #[repr(C)]
    pub struct FwResult {
        pub classification: [FwPrediction; super::EI_LABEL_COUNT],
        pub anomaly: f32,
        pub dsp_ms: i32,
        pub classification_ms: i32,
        pub anomaly_ms: i32,
    }

    extern "C" {
        pub fn fw_label_count() -> usize;
        pub fn fw_run_classifier(
            data: *const f32,
            length: usize,
            result: *mut FwResult,
            debug: bool,
        ) -> i32;
    }
}

#[cfg(feature = "edge-impulse")]
pub struct EdgeImpulseClassifier {
    model: ModelInfo,
}

#[cfg(feature = "edge-impulse")]
impl EdgeImpulseClassifier {
    pub fn new() -> Self {
        // SAFETY: pure getter on a compile-time constant of the SDK.
        let linked = unsafe { ffi::fw_label_count() };
        if linked != EI_LABEL_COUNT {
            log::warn!(
                "Linked impulse has {} labels, firmware expects {}",
                linked,
                EI_LABEL_COUNT
            );
        }
        Self { model: FAN_MODEL }
    }
}

#[cfg(feature = "edge-impulse")]
impl Default for EdgeImpulseClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "edge-impulse")]
impl Classifier for EdgeImpulseClassifier {
    fn model(&self) -> &ModelInfo {
        &self.model
    }

    fn classify(
        &mut self,
        signal: &Signal<'_>,
        debug: bool,
    ) -> Result<ClassificationResult, ErrorCode> {
        use std::ffi::CStr;

        if signal.total_length() != self.model.dsp_input_frame_size() {
            return Err(ErrorCode::SHAPES_DONT_MATCH);
        }

        let data = signal.as_slice();
        // SAFETY: `data` outlives the call and the shim only reads
        // `length` floats from it; `result` is plain-old-data.
        let result = unsafe {
            let mut result: ffi::FwResult = core::mem::zeroed();
            let err = ffi::fw_run_classifier(data.as_ptr(), data.len(), &mut result, debug);
            if err != 0 {
                return Err(ErrorCode(err));
            }
            result
        };

        let classification = result
            .classification
            .iter()
            .map(|p| {
                // SAFETY: labels point at static strings inside the SDK.
                let label = if p.label.is_null() {
                    "?".into()
                } else {
                    unsafe { CStr::from_ptr(p.label) }.to_string_lossy().into_owned()
                };
                Prediction::new(label, p.value)
            })
            .collect();

        Ok(ClassificationResult {
            classification,
            anomaly: self.model.has_anomaly.then_some(result.anomaly),
            timing: Timing {
                dsp_ms: result.dsp_ms,
                classification_ms: result.classification_ms,
                anomaly_ms: result.anomaly_ms,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady_buffer(amplitude: f32) -> Vec<f32> {
        (0..EI_RAW_SAMPLE_COUNT)
            .flat_map(|i| {
                let swing = if i % 2 == 0 { amplitude } else { -amplitude };
                [swing, 0.0, STANDARD_GRAVITY]
            })
            .collect()
    }

    fn top_label(result: &ClassificationResult) -> &str {
        result
            .classification
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
            .map(|p| p.label.as_str())
            .unwrap()
    }

    #[test]
    fn model_frame_size_matches_constants() {
        assert_eq!(FAN_MODEL.dsp_input_frame_size(), EI_DSP_INPUT_FRAME_SIZE);
        assert_eq!(FAN_MODEL.interval(), Duration::from_millis(10));
        assert!((FAN_MODEL.frequency_hz() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn signal_rejects_bad_lengths() {
        let buffer = [0.0f32; 6];
        assert_eq!(Signal::from_buffer(&buffer, 0).unwrap_err(), ErrorCode::INVALID_SIZE);
        assert_eq!(Signal::from_buffer(&buffer, 7).unwrap_err(), ErrorCode::INVALID_SIZE);
        assert_eq!(Signal::from_buffer(&buffer, 3).unwrap_err(), ErrorCode::INVALID_SIZE);
        assert_eq!(Signal::from_buffer(&[], 0).unwrap_err(), ErrorCode::INVALID_SIZE);
        assert_eq!(Signal::from_buffer(&buffer, 6).unwrap().total_length(), 6);
    }

    #[test]
    fn get_data_copies_windows_and_rejects_overruns() {
        let buffer = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let signal = Signal::from_buffer(&buffer, 6).unwrap();

        let mut out = [0.0; 3];
        signal.get_data(3, &mut out).unwrap();
        assert_eq!(out, [4.0, 5.0, 6.0]);

        assert_eq!(signal.get_data(4, &mut out), Err(ErrorCode::SHAPES_DONT_MATCH));
        assert_eq!(signal.get_data(usize::MAX, &mut out), Err(ErrorCode::SHAPES_DONT_MATCH));
    }

    #[test]
    fn stub_rejects_mismatched_signal() {
        let buffer = vec![0.0f32; EI_DSP_INPUT_FRAME_SIZE - 3];
        let signal = Signal::from_buffer(&buffer, buffer.len()).unwrap();
        let mut classifier = StubClassifier::new(FAN_MODEL);

        assert_eq!(
            classifier.classify(&signal, false).unwrap_err(),
            ErrorCode::SHAPES_DONT_MATCH
        );
    }

    #[test]
    fn stub_scores_vibration_energy() {
        let mut classifier = StubClassifier::new(FAN_MODEL);

        for (amplitude, expected) in [
            (0.0, "silent"),
            (0.2, "normal"),
            (1.0, "warning"),
            (4.0, "damage"),
        ] {
            let buffer = steady_buffer(amplitude);
            let signal = Signal::from_buffer(&buffer, buffer.len()).unwrap();
            let result = classifier.classify(&signal, true).unwrap();

            assert_eq!(result.classification.len(), EI_LABEL_COUNT);
            assert_eq!(top_label(&result), expected, "amplitude {}", amplitude);
            assert_eq!(result.anomaly, None);
        }
    }
}
