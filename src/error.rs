// FanWatch: Error Taxonomy
//
// Every error is reported as one line on the report sink where it is
// detected, and ends only the current cycle.

use std::fmt;

use crate::classifier::ErrorCode;

#[derive(Debug)]
pub enum Error {
    /// Sensor did not respond at startup. Readings are meaningless from here
    /// on, but the monitor keeps cycling.
    SensorInit {
        sensor: &'static str,
        source: anyhow::Error,
    },
    /// The model does not take one value per sensor axis per frame.
    ConfigMismatch { samples_per_frame: usize },
    /// A read failed part way through filling the buffer.
    SensorRead {
        sensor: &'static str,
        source: anyhow::Error,
    },
    SignalConstruction(ErrorCode),
    Classification(ErrorCode),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorInit { sensor, source } => write!(f, "Error {}! ({:#})", sensor, source),
            Self::ConfigMismatch { samples_per_frame } => write!(
                f,
                "ERR: model expects {} raw samples per frame, should be equal to 3 (the 3 sensor axes)",
                samples_per_frame
            ),
            Self::SensorRead { sensor, source } => {
                write!(f, "ERR: Failed to read {} ({})", sensor, source)
            }
            Self::SignalConstruction(code) => {
                write!(f, "Failed to create signal from buffer ({})", code)
            }
            Self::Classification(code) => write!(f, "ERR: Failed to run classifier ({})", code),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SensorInit { source, .. } | Self::SensorRead { source, .. } => {
                Some(&**source)
            }
            _ => None,
        }
    }
}
