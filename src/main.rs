// FanWatch: Firmware Entry Point
//
// Boot sequence:
//   1. Initialise logging (serial console).
//   2. Bring up the I2C bus and the MPU6050 (±2 g, 94 Hz DLPF).
//   3. Check the linked impulse takes 3 axes per frame.
//   4. Every cycle: wait 5 s, sample one window, classify, print.
//
// On a host build the same monitor runs against a synthetic accelerometer
// and the stub classifier.

use fanwatch::classifier;
use fanwatch::clock::StdClock;
use fanwatch::config::*;
use fanwatch::monitor::{Monitor, MonitorConfig};
use fanwatch::report::LogSink;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use fanwatch::drivers::imu::Mpu6050;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("FanWatch firmware starting (SDA GPIO{}, SCL GPIO{})", PIN_I2C_SDA, PIN_I2C_SCL);

    let peripherals = Peripherals::take()?;

    let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;

    let imu = Mpu6050::new(i2c, SENSOR_RANGE, SENSOR_BANDWIDTH);

    let mut monitor: Monitor<_, _, _, _, EI_DSP_INPUT_FRAME_SIZE> = Monitor::new(
        imu,
        StdClock::new(),
        classifier::default_classifier(),
        LogSink,
        MonitorConfig::default(),
    );
    monitor.run_forever()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use fanwatch::drivers::synthetic::SyntheticAccelerometer;
    use log::LevelFilter;

    let _ = env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init();
    log::info!("FanWatch host simulation starting");

    let model = classifier::FAN_MODEL;
    // A healthy fan: light 25 Hz hum.
    let accel = SyntheticAccelerometer::new(0.3, 25.0, model.frequency_hz());

    let mut monitor: Monitor<_, _, _, _, EI_DSP_INPUT_FRAME_SIZE> = Monitor::new(
        accel,
        StdClock::new(),
        classifier::default_classifier(),
        LogSink,
        MonitorConfig::default(),
    );
    monitor.run_forever()
}
