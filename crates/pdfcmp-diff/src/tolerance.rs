use serde::{Deserialize, Serialize};

/// How a [`FloatTolerance`] measures the gap between two numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceMode {
    #[default]
    Absolute,
    /// Gap divided by the magnitude of the reference value. A zero reference
    /// falls back to the absolute gap.
    Relative,
}

/// Numeric comparison tolerance. The default (zero) means exact equality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatTolerance {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub mode: ToleranceMode,
}

impl FloatTolerance {
    pub const fn exact() -> Self {
        Self {
            value: 0.0,
            mode: ToleranceMode::Absolute,
        }
    }

    pub const fn absolute(value: f64) -> Self {
        Self {
            value,
            mode: ToleranceMode::Absolute,
        }
    }

    pub const fn relative(value: f64) -> Self {
        Self {
            value,
            mode: ToleranceMode::Relative,
        }
    }

    /// A zero tolerance. Instruction-level comparison of content streams is
    /// only enabled when this is `false`.
    pub fn is_exact(&self) -> bool {
        self.value == 0.0
    }

    /// Whether `candidate` is close enough to `reference`.
    pub fn accepts(&self, candidate: f64, reference: f64) -> bool {
        let mut gap = (candidate - reference).abs();
        if self.mode == ToleranceMode::Relative && reference != 0.0 {
            gap /= reference.abs();
        }
        gap <= self.value
    }
}
