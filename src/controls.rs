use crate::foundation::error::{AcuityError, AcuityResult};

/// Range and step of a bounded scalar input.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlSpec {
    /// Lowest accepted value.
    pub min: f64,
    /// Highest accepted value.
    pub max: f64,
    /// Snapping increment, counted from `min`.
    pub step: f64,
    /// Starting value, snapped like any other.
    pub initial: f64,
}

impl Default for ControlSpec {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 10.0,
            step: 0.01,
            initial: 0.0,
        }
    }
}

impl ControlSpec {
    /// Require finite values, `min < max`, `step > 0` and `initial` within range.
    pub fn validate(&self) -> AcuityResult<()> {
        let all_finite = [self.min, self.max, self.step, self.initial]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(AcuityError::validation("control values must be finite"));
        }
        if self.min >= self.max {
            return Err(AcuityError::validation(format!(
                "control min ({}) must be < max ({})",
                self.min, self.max
            )));
        }
        if self.step <= 0.0 {
            return Err(AcuityError::validation("control step must be > 0"));
        }
        if self.initial < self.min || self.initial > self.max {
            return Err(AcuityError::validation(format!(
                "control initial value {} is outside [{}, {}]",
                self.initial, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// A bounded, stepped real-valued input (a slider without the widget).
///
/// Values are clamped to `[min, max]` and snapped to the nearest step counted from `min`.
#[derive(Clone, Debug, PartialEq)]
pub struct Control {
    spec: ControlSpec,
    decimals: i32,
    value: f64,
}

impl Control {
    /// Create a control at the (snapped) initial value of `spec`.
    pub fn new(spec: ControlSpec) -> AcuityResult<Self> {
        spec.validate()?;
        let mut c = Self {
            spec,
            decimals: step_decimals(spec.step),
            value: spec.min,
        };
        c.value = c.snap(spec.initial);
        Ok(c)
    }

    /// Range and step of this control.
    pub fn spec(&self) -> &ControlSpec {
        &self.spec
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set a new value; returns `true` when the stored value changed.
    pub fn set(&mut self, value: f64) -> AcuityResult<bool> {
        if !value.is_finite() {
            return Err(AcuityError::validation(format!(
                "control value must be finite, got {value}"
            )));
        }
        let snapped = self.snap(value);
        let changed = snapped != self.value;
        self.value = snapped;
        Ok(changed)
    }

    fn snap(&self, value: f64) -> f64 {
        let ControlSpec { min, max, step, .. } = self.spec;
        let clamped = value.clamp(min, max);
        let steps = ((clamped - min) / step).round();
        let snapped = (min + steps * step).clamp(min, max);
        // Strip float noise such as 3.0000000000000004 left by the step arithmetic.
        let scale = 10f64.powi(self.decimals);
        let cleaned = (snapped * scale).round() / scale;
        if cleaned == 0.0 { 0.0 } else { cleaned }
    }
}

/// Number of decimal places needed to represent `step` (capped at 9).
fn step_decimals(step: f64) -> i32 {
    for d in 0..9 {
        let scaled = step * 10f64.powi(d);
        if (scaled - scaled.round()).abs() < 1e-9 {
            return d;
        }
    }
    9
}
