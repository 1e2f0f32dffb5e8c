// FanWatch: Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V) + MPU6050 breakout

use crate::drivers::imu::{AccelRange, FilterBandwidth};

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_I2C_SDA: i32 = 6; // D4 - I2C data line
pub const PIN_I2C_SCL: i32 = 7; // D5 - I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_BAUDRATE_KHZ: u32 = 400;

// ---------------------------------------------------------------------------
// MPU6050 Configuration
// ---------------------------------------------------------------------------
pub const SENSOR_RANGE: AccelRange = AccelRange::G2;
pub const SENSOR_BANDWIDTH: FilterBandwidth = FilterBandwidth::Hz94;

/// Standard gravity (m/s²), used to convert g to m/s².
pub const STANDARD_GRAVITY: f32 = 9.806_65;

/// Models are trained with the accelerometer range set to ±2 g; readings
/// outside that are clamped before inference.
pub const MAX_ACCEPTED_RANGE_G: f32 = 2.0;

// ---------------------------------------------------------------------------
// AI / Edge Impulse Model
// Must match `model_metadata.h` of the exported impulse.
// ---------------------------------------------------------------------------
pub const EI_RAW_SAMPLES_PER_FRAME: usize = 3; // accX, accY, accZ
pub const EI_RAW_SAMPLE_COUNT: usize = 200; // 2-second window @ 100 Hz
pub const EI_DSP_INPUT_FRAME_SIZE: usize = EI_RAW_SAMPLE_COUNT * EI_RAW_SAMPLES_PER_FRAME; // 600
pub const EI_INTERVAL_MS: f32 = 10.0;
pub const EI_LABEL_COUNT: usize = 4;
pub const EI_HAS_ANOMALY: bool = false;

/// Print DSP features / NN internals from inside the classifier.
pub const EI_DEBUG_NN: bool = false;

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------
pub const TRIGGER_THRESHOLD: f32 = 0.6;
pub const CYCLE_START_DELAY_MS: u64 = 5000;
