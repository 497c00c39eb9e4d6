use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::config::VisualConfig;
use crate::images::ImageNames;
use crate::outcome::VisualOutcome;

const UNDEFINED_GS_PATH: &str = "Path to Ghostscript is not specified. Please set gsExec to the Ghostscript executable \
     (e.g. gsExec=/usr/bin/gs).";
const NO_IMAGES: &str = "No files for comparing!!!\nThe result or sample pdf file is not processed by Ghostscript.";
const COMPARE_TOOL_HINT: &str = "\nYou can optionally specify the path to the ImageMagick compare tool \
     (e.g. compareExec=/usr/bin/compare) to visualize differences.";

/// Rasterizes a document pair and compares the page images.
#[derive(Debug, Clone, Default)]
pub struct VisualComparer {
    config: VisualConfig,
}

impl VisualComparer {
    pub fn new(config: VisualConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    /// Render `out_pdf` and `cmp_pdf` into `out_dir` and compare them page
    /// by page. Zero-based page indices in `skip_pages` are not compared.
    ///
    /// Difference images are written as `<out_dir>/<diff_prefix><page>.png`
    /// with one-based page numbers.
    pub fn compare(
        &self,
        out_pdf: &Path,
        cmp_pdf: &Path,
        out_dir: &Path,
        diff_prefix: &str,
        skip_pages: &[usize],
    ) -> VisualOutcome {
        let Some(gs) = self.config.gs_exec.as_deref() else {
            return VisualOutcome::ToolFailure(UNDEFINED_GS_PATH.to_string());
        };
        if !gs.exists() {
            return VisualOutcome::ToolFailure(format!("{} does not exist", gs.display()));
        }

        match self.render_and_compare(gs, out_pdf, cmp_pdf, out_dir, diff_prefix, skip_pages) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(dir = %out_dir.display(), error = %err, "visual comparison aborted");
                VisualOutcome::ToolFailure(format!("Cannot open target directory for {}.", out_pdf.display()))
            }
        }
    }

    fn render_and_compare(
        &self,
        gs: &Path,
        out_pdf: &Path,
        cmp_pdf: &Path,
        out_dir: &Path,
        diff_prefix: &str,
        skip_pages: &[usize],
    ) -> io::Result<VisualOutcome> {
        let names = ImageNames::new(out_pdf, cmp_pdf);
        if out_dir.is_dir() {
            let removed = names.remove_stale(out_dir)?;
            debug!(removed, "stale page images removed");
        } else {
            fs::create_dir_all(out_dir)?;
        }

        if !self.rasterize(gs, cmp_pdf, &out_dir.join(names.cmp_pattern()))? {
            return Ok(VisualOutcome::ToolFailure(format!("Ghostscript failed for {}.", cmp_pdf.display())));
        }
        if !self.rasterize(gs, out_pdf, &out_dir.join(names.out_pattern()))? {
            return Ok(VisualOutcome::ToolFailure(format!("Ghostscript failed for {}.", out_pdf.display())));
        }

        let (out_images, cmp_images) = names.list(out_dir);
        let page_count_differs = out_images.len() != cmp_images.len();
        if out_images.is_empty() || cmp_images.is_empty() {
            return Ok(VisualOutcome::ToolFailure(NO_IMAGES.to_string()));
        }

        let mut message: Option<String> = None;
        let mut diff_images = Vec::new();
        for (index, (out_image, cmp_image)) in out_images.iter().zip(&cmp_images).enumerate() {
            if skip_pages.contains(&index) {
                continue;
            }
            let page = index + 1;
            debug!(page, image = %out_image.display(), "comparing page image");
            if fs::read(out_image)? == fs::read(cmp_image)? {
                continue;
            }
            info!(page, "page images differ");

            let Some(compare) = self.config.compare_exec.as_deref().filter(|p| p.exists()) else {
                message = Some(format!(
                    "File {} differs on page {page}.{COMPARE_TOOL_HINT}",
                    out_pdf.display()
                ));
                break;
            };

            let diff_image = out_dir.join(format!("{diff_prefix}{page}.png"));
            if self.diff_image(compare, out_image, cmp_image, &diff_image)? {
                message = Some(match message {
                    None => format!(
                        "File {} differs on page {page}.\nPlease, examine {} for more details.",
                        out_pdf.display(),
                        diff_image.display()
                    ),
                    Some(_) => format!(
                        "File {} differs.\nPlease, examine difference images for more details.",
                        out_pdf.display()
                    ),
                });
                diff_images.push(diff_image);
            } else {
                warn!(tool = %compare.display(), "compare tool failed");
                message = Some(format!("File {} differs on page {page}.", out_pdf.display()));
            }
        }

        Ok(match message {
            Some(message) => VisualOutcome::Different { message, diff_images },
            None if page_count_differs => VisualOutcome::Different {
                message: format!("Unexpected number of pages for {}.", out_pdf.display()),
                diff_images,
            },
            None => VisualOutcome::Identical,
        })
    }

    /// Render every page of `pdf` to `pattern`. Returns whether Ghostscript
    /// exited successfully.
    fn rasterize(&self, gs: &Path, pdf: &Path, pattern: &Path) -> io::Result<bool> {
        let mut output_arg = std::ffi::OsString::from("-sOutputFile=");
        output_arg.push(pattern);
        let output = Command::new(gs)
            .arg("-dNOPAUSE")
            .arg("-dBATCH")
            .arg("-sDEVICE=png16m")
            .arg(format!("-r{}", self.config.resolution))
            .arg(output_arg)
            .arg(pdf)
            .output()?;
        log_tool_output("ghostscript", &output.stdout, &output.stderr);
        if !output.status.success() {
            warn!(pdf = %pdf.display(), status = %output.status, "ghostscript failed");
        }
        Ok(output.status.success())
    }

    /// Write a difference image. `compare` exits with 1 when the images
    /// differ, which still counts as success.
    fn diff_image(&self, compare: &Path, left: &Path, right: &Path, target: &Path) -> io::Result<bool> {
        let output = Command::new(compare).arg(left).arg(right).arg(target).output()?;
        log_tool_output("compare", &output.stdout, &output.stderr);
        Ok(matches!(output.status.code(), Some(0 | 1)))
    }
}

fn log_tool_output(tool: &str, stdout: &[u8], stderr: &[u8]) {
    for line in String::from_utf8_lossy(stdout).lines().chain(String::from_utf8_lossy(stderr).lines()) {
        debug!(tool, "{line}");
    }
}
