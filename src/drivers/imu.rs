// FanWatch: MPU6050 Accelerometer Driver
//
// Register-level driver over any `embedded_hal` I2C bus. On target this is
// esp-idf-hal's `I2cDriver`; tests drive it with a register-file mock.

use embedded_hal::i2c::I2c;

use crate::config::{I2C_ADDR_MPU6050, STANDARD_GRAVITY};
use crate::drivers::Accelerometer;
use crate::events::Sample;

// MPU6050 register addresses
const REG_SMPLRT_DIV: u8 = 0x19;
const REG_CONFIG: u8 = 0x1A;
const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 6-byte accel burst
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

const PWR_CLKSEL_PLL_XGYRO: u8 = 0x01;
const GYRO_FS_500: u8 = 0x08;

/// Accelerometer full-scale range (ACCEL_CONFIG.AFS_SEL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelRange {
    G2,
    G4,
    G8,
    G16,
}

impl AccelRange {
    fn afs_sel(self) -> u8 {
        match self {
            Self::G2 => 0,
            Self::G4 => 1,
            Self::G8 => 2,
            Self::G16 => 3,
        }
    }

    /// LSB per g.
    pub fn scale(self) -> f32 {
        match self {
            Self::G2 => 16384.0,
            Self::G4 => 8192.0,
            Self::G8 => 4096.0,
            Self::G16 => 2048.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::G2 => "+-2G",
            Self::G4 => "+-4G",
            Self::G8 => "+-8G",
            Self::G16 => "+-16G",
        }
    }
}

/// Digital low-pass filter bandwidth (CONFIG.DLPF_CFG).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterBandwidth {
    Hz260,
    Hz184,
    Hz94,
    Hz44,
    Hz21,
    Hz10,
    Hz5,
}

impl FilterBandwidth {
    fn dlpf_cfg(self) -> u8 {
        match self {
            Self::Hz260 => 0,
            Self::Hz184 => 1,
            Self::Hz94 => 2,
            Self::Hz44 => 3,
            Self::Hz21 => 4,
            Self::Hz10 => 5,
            Self::Hz5 => 6,
        }
    }

    pub fn hz(self) -> u32 {
        match self {
            Self::Hz260 => 260,
            Self::Hz184 => 184,
            Self::Hz94 => 94,
            Self::Hz44 => 44,
            Self::Hz21 => 21,
            Self::Hz10 => 10,
            Self::Hz5 => 5,
        }
    }
}

pub struct Mpu6050<I2C> {
    bus: I2C,
    range: AccelRange,
    bandwidth: FilterBandwidth,
}

impl<I2C: I2c> Mpu6050<I2C> {
    pub fn new(bus: I2C, range: AccelRange, bandwidth: FilterBandwidth) -> Self {
        Self {
            bus,
            range,
            bandwidth,
        }
    }

    pub fn release(self) -> I2C {
        self.bus
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&mut self) -> bool {
        matches!(self.read_register(REG_WHO_AM_I), Ok(WHO_AM_I_EXPECTED))
    }

    fn read_register(&mut self, reg: u8) -> anyhow::Result<u8> {
        let mut buf = [0u8; 1];
        self.bus
            .write_read(I2C_ADDR_MPU6050, &[reg], &mut buf)
            .map_err(|e| anyhow::anyhow!("I2C read of 0x{:02X} failed: {:?}", reg, e))?;
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> anyhow::Result<()> {
        self.bus
            .write(I2C_ADDR_MPU6050, &[reg, value])
            .map_err(|e| anyhow::anyhow!("I2C write of 0x{:02X} failed: {:?}", reg, e))
    }
}

impl<I2C: I2c> Accelerometer for Mpu6050<I2C> {
    fn name(&self) -> &'static str {
        "MPU6050"
    }

    /// Wake the sensor and apply the configured range and DLPF bandwidth.
    fn init(&mut self) -> anyhow::Result<()> {
        let who_am_i = self.read_register(REG_WHO_AM_I)?;
        if who_am_i != WHO_AM_I_EXPECTED {
            anyhow::bail!("unexpected WHO_AM_I 0x{:02X}", who_am_i);
        }

        // Wake up (clear SLEEP bit), clock from the X gyro PLL
        self.write_register(REG_PWR_MGMT_1, PWR_CLKSEL_PLL_XGYRO)?;
        self.write_register(REG_SMPLRT_DIV, 0x00)?;
        self.write_register(REG_CONFIG, self.bandwidth.dlpf_cfg())?;
        self.write_register(REG_GYRO_CONFIG, GYRO_FS_500)?;
        self.write_register(REG_ACCEL_CONFIG, self.range.afs_sel() << 3)?;

        log::info!(
            "MPU6050 initialised ({}, DLPF {} Hz)",
            self.range.label(),
            self.bandwidth.hz()
        );
        Ok(())
    }

    /// Burst-read the three accel axes and convert to m/s².
    fn read(&mut self) -> anyhow::Result<Sample> {
        let mut raw = [0u8; 6];
        self.bus
            .write_read(I2C_ADDR_MPU6050, &[REG_ACCEL_XOUT_H], &mut raw)
            .map_err(|e| anyhow::anyhow!("I2C accel burst failed: {:?}", e))?;

        let to_ms2 = STANDARD_GRAVITY / self.range.scale();
        Ok(Sample {
            x: i16::from_be_bytes([raw[0], raw[1]]) as f32 * to_ms2,
            y: i16::from_be_bytes([raw[2], raw[3]]) as f32 * to_ms2,
            z: i16::from_be_bytes([raw[4], raw[5]]) as f32 * to_ms2,
        })
    }
}
