use std::fs;
use std::path::Path;

use pdfcmp_diff::FloatTolerance;
use pdfcmp_visual::VisualConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CompareError, CompareResult};

/// Environment variable naming the Ghostscript executable.
pub const GS_EXEC_VAR: &str = "gsExec";
/// Environment variable naming the ImageMagick `compare` executable.
pub const COMPARE_EXEC_VAR: &str = "compareExec";

/// Settings for a [`CompareTool`](crate::CompareTool).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Maximum number of differences recorded per comparison.
    pub error_limit: usize,
    /// Numeric tolerance. Zero means exact comparison.
    pub tolerance: FloatTolerance,
    /// Write `<out_dir>/<report_name>.xml` after a content comparison.
    pub xml_report: bool,
    pub report_name: String,
    pub visual: VisualConfig,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            error_limit: 1,
            tolerance: FloatTolerance::exact(),
            xml_report: false,
            report_name: "report".to_string(),
            visual: VisualConfig::default(),
        }
    }
}

impl CompareConfig {
    /// Read a TOML configuration file.
    pub fn load(path: &Path) -> CompareResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> CompareResult<Self> {
        toml::from_str(text).map_err(|e| CompareError::Config(e.to_string()))
    }

    /// Fill unset tool paths from the `gsExec` and `compareExec` environment
    /// variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Fill unset tool paths from `lookup`, keyed by environment variable name.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.visual.gs_exec.is_none() {
            self.visual.gs_exec = lookup(GS_EXEC_VAR).filter(|v| !v.is_empty()).map(Into::into);
        }
        if self.visual.compare_exec.is_none() {
            self.visual.compare_exec = lookup(COMPARE_EXEC_VAR).filter(|v| !v.is_empty()).map(Into::into);
        }
        self
    }

    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }

    pub fn with_absolute_error(mut self, error: f64) -> Self {
        self.tolerance = FloatTolerance::absolute(error);
        self
    }

    pub fn with_relative_error(mut self, error: f64) -> Self {
        self.tolerance = FloatTolerance::relative(error);
        self
    }

    pub fn with_xml_report(mut self, enabled: bool) -> Self {
        self.xml_report = enabled;
        self
    }

    pub fn with_report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = name.into();
        self
    }

    pub fn with_visual(mut self, visual: VisualConfig) -> Self {
        self.visual = visual;
        self
    }
}
