// FanWatch: Result Reporting
//
// Everything the monitor prints is one human-readable line on a sink. On
// target the sink is the `log` facade, which EspLogger writes to the serial
// console.

use crate::events::{ClassificationResult, FanCondition, Prediction};

pub trait ReportSink {
    fn line(&mut self, line: &str);
}

/// Forwards each line to `log::info!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn line(&mut self, line: &str) {
        log::info!("{}", line);
    }
}

impl ReportSink for Vec<String> {
    fn line(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn line(&mut self, line: &str) {
        (**self).line(line);
    }
}

pub struct Reporter {
    threshold: f32,
}

impl Reporter {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Predictions at or above the trigger threshold, in model order.
    pub fn triggered<'r>(
        &self,
        result: &'r ClassificationResult,
    ) -> impl Iterator<Item = &'r Prediction> + 'r {
        let threshold = self.threshold;
        result
            .classification
            .iter()
            .filter(move |p| p.value >= threshold)
    }

    pub fn report(&self, result: &ClassificationResult, sink: &mut impl ReportSink) {
        let timing = &result.timing;
        sink.line(&format!(
            "Predictions (DSP: {} ms., Classification: {} ms., Anomaly: {} ms.): ",
            timing.dsp_ms, timing.classification_ms, timing.anomaly_ms
        ));

        for p in &result.classification {
            sink.line(&format!("    {}: {:.5}", p.label, p.value));
        }

        for p in self.triggered(result) {
            match FanCondition::from_label(&p.label) {
                Some(condition) => sink.line(condition.display_name()),
                None => sink.line(&p.label),
            }
        }

        if let Some(score) = result.anomaly {
            sink.line(&format!("    anomaly score: {:.3}", score));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Timing;

    fn result(values: [f32; 4]) -> ClassificationResult {
        ClassificationResult {
            classification: ["damage", "normal", "silent", "warning"]
                .iter()
                .zip(values)
                .map(|(label, value)| Prediction::new(*label, value))
                .collect(),
            anomaly: None,
            timing: Timing {
                dsp_ms: 4,
                classification_ms: 1,
                anomaly_ms: 0,
            },
        }
    }

    #[test]
    fn only_damage_triggers_at_065() {
        let mut lines = Vec::new();
        Reporter::new(0.6).report(&result([0.65, 0.2, 0.1, 0.05]), &mut lines);

        assert_eq!(
            lines,
            vec![
                "Predictions (DSP: 4 ms., Classification: 1 ms., Anomaly: 0 ms.): ",
                "    damage: 0.65000",
                "    normal: 0.20000",
                "    silent: 0.10000",
                "    warning: 0.05000",
                "Damage",
            ]
        );
    }

    #[test]
    fn nothing_triggers_below_threshold() {
        let mut lines = Vec::new();
        let reporter = Reporter::new(0.6);
        let res = result([0.3, 0.59, 0.1, 0.01]);
        reporter.report(&res, &mut lines);

        assert_eq!(reporter.triggered(&res).count(), 0);
        assert_eq!(lines.len(), 5);
        assert!(!lines.iter().any(|l| !l.starts_with(' ') && !l.starts_with("Predictions")));
    }

    #[test]
    fn threshold_is_inclusive() {
        let reporter = Reporter::new(0.6);
        let res = result([0.0, 0.6, 0.0, 0.7]);
        let names: Vec<&str> = reporter.triggered(&res).map(|p| p.label.as_str()).collect();
        assert_eq!(names, ["normal", "warning"]);
    }

    #[test]
    fn unknown_labels_and_anomaly_are_printed() {
        let mut res = ClassificationResult {
            classification: vec![Prediction::new("rattle", 0.9)],
            anomaly: Some(-0.25),
            timing: Timing::default(),
        };
        let mut lines = Vec::new();
        Reporter::new(0.6).report(&res, &mut lines);
        assert_eq!(lines[2], "rattle");
        assert_eq!(lines[3], "    anomaly score: -0.250");

        res.anomaly = None;
        lines.clear();
        Reporter::new(0.6).report(&res, &mut lines);
        assert_eq!(lines.len(), 3);
    }
}
