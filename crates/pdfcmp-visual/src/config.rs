use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Rendering resolution used when none is configured.
pub const DEFAULT_RESOLUTION: u32 = 150;

/// External tools for the visual pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Ghostscript executable.
    pub gs_exec: Option<PathBuf>,
    /// ImageMagick `compare` executable.
    pub compare_exec: Option<PathBuf>,
    /// Rendering resolution in dots per inch.
    pub resolution: u32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            gs_exec: None,
            compare_exec: None,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl VisualConfig {
    pub fn with_gs_exec(mut self, path: impl Into<PathBuf>) -> Self {
        self.gs_exec = Some(path.into());
        self
    }

    pub fn with_compare_exec(mut self, path: impl Into<PathBuf>) -> Self {
        self.compare_exec = Some(path.into());
        self
    }

    pub fn with_resolution(mut self, dpi: u32) -> Self {
        self.resolution = dpi;
        self
    }
}
