// FanWatch: Sensor Samples & Classification Results

// ---------------------------------------------------------------------------
// Sample (3-axis accelerometer reading, m/s²)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Components in buffer order.
    pub fn axes(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

// ---------------------------------------------------------------------------
// Fan Condition
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCondition {
    Damage,
    Normal,
    Silent,
    Warning,
}

impl FanCondition {
    /// Name printed when the condition is triggered.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Damage => "Damage",
            Self::Normal => "Normal",
            Self::Silent => "Silent",
            Self::Warning => "Warning",
        }
    }

    /// Map an Edge Impulse label string to a `FanCondition`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "damage" => Some(Self::Damage),
            "normal" => Some(Self::Normal),
            "silent" => Some(Self::Silent),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification Result (produced by the classifier boundary)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub value: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, value: f32) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Stage durations reported by the classifier, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    pub dsp_ms: i32,
    pub classification_ms: i32,
    pub anomaly_ms: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationResult {
    /// One entry per model label, in model output order.
    pub classification: Vec<Prediction>,
    /// Present only when the impulse has an anomaly block.
    pub anomaly: Option<f32>,
    pub timing: Timing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_case_insensitively() {
        assert_eq!(FanCondition::from_label("damage"), Some(FanCondition::Damage));
        assert_eq!(FanCondition::from_label("Warning"), Some(FanCondition::Warning));
        assert_eq!(FanCondition::from_label("SILENT"), Some(FanCondition::Silent));
        assert_eq!(FanCondition::from_label("idle"), None);
    }

    #[test]
    fn sample_axes_are_in_xyz_order() {
        assert_eq!(Sample::new(1.0, 2.0, 3.0).axes(), [1.0, 2.0, 3.0]);
    }
}
