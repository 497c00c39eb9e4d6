use std::path::Path;

use pdfcmp_diff::{Comparator, DifferenceSet, ObjectPath};
use pdfcmp_doc::{load_document, Document};
use pdfcmp_types::PdfObject;
use pdfcmp_visual::{VisualComparer, VisualOutcome};
use tracing::{info, warn};

use crate::config::CompareConfig;
use crate::error::CompareResult;
use crate::info::compare_document_info;
use crate::links::compare_links;
use crate::observer::{CompareObserver, TracingObserver};
use crate::verdict::{FailureKind, Verdict};

/// Catalog entries compared in addition to the pages.
const CATALOG_STRUCTURES: [&str; 2] = ["StructTreeRoot", "OCProperties"];

/// File locations for one comparison.
#[derive(Debug, Clone, Copy)]
pub struct ComparePaths<'p> {
    /// The candidate document.
    pub out_pdf: &'p Path,
    /// The reference document.
    pub cmp_pdf: &'p Path,
    /// Where page images, difference images and the report are written.
    pub out_dir: &'p Path,
    /// File name prefix of difference images.
    pub diff_prefix: &'p str,
}

/// Result of a content comparison with the details behind the verdict.
#[derive(Debug)]
pub struct ContentComparison {
    pub verdict: Verdict,
    pub differences: DifferenceSet,
    /// Zero-based indices of the pages that compared equal.
    pub equal_pages: Vec<usize>,
}

/// Compares a candidate document against a reference document.
pub struct CompareTool {
    config: CompareConfig,
    observer: Box<dyn CompareObserver>,
}

impl CompareTool {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn CompareObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Load both files and compare them by content, falling back to a
    /// visual comparison when they differ.
    pub fn compare_by_content(
        &self,
        out_pdf: &Path,
        cmp_pdf: &Path,
        out_dir: &Path,
        diff_prefix: &str,
    ) -> CompareResult<Verdict> {
        let out_doc = load_document(out_pdf)?;
        let cmp_doc = load_document(cmp_pdf)?;
        let paths = ComparePaths {
            out_pdf,
            cmp_pdf,
            out_dir,
            diff_prefix,
        };
        Ok(self.compare_documents(&out_doc, &cmp_doc, &paths)?.verdict)
    }

    /// Compare two loaded documents. `paths` names the files they came from,
    /// which the visual fallback renders.
    pub fn compare_documents(
        &self,
        out_doc: &dyn Document,
        cmp_doc: &dyn Document,
        paths: &ComparePaths<'_>,
    ) -> CompareResult<ContentComparison> {
        info!(out = %paths.out_pdf.display(), cmp = %paths.cmp_pdf.display(), "comparing by content");
        let comparator = Comparator::new(out_doc, cmp_doc, self.config.tolerance);
        let mut differences = DifferenceSet::new(self.config.error_limit);
        let out_pages = comparator.candidate_pages();
        let cmp_pages = comparator.reference_pages();

        if out_pages.len() != cmp_pages.len() {
            info!(
                out_pages = out_pages.len(),
                cmp_pages = cmp_pages.len(),
                "page counts differ, comparing visually"
            );
            let verdict = self.page_count_verdict(paths);
            self.observer.finished(&verdict);
            return Ok(ContentComparison {
                verdict,
                differences,
                equal_pages: Vec::new(),
            });
        }

        let mut equal_pages = Vec::with_capacity(cmp_pages.len());
        for (index, ((out_page, out_ref), (cmp_page, cmp_ref))) in out_pages.iter().zip(cmp_pages.iter()).enumerate() {
            self.observer.page_started(index);
            let mut path = ObjectPath::new(Some(cmp_ref), Some(out_ref));
            let equal = comparator.compare_dictionaries(out_page, cmp_page, &mut path, &mut differences)?;
            if equal {
                equal_pages.push(index);
            }
            self.observer.page_finished(index, equal);
        }

        for key in CATALOG_STRUCTURES {
            let out_entry = out_doc.catalog_entry(key);
            let cmp_entry = cmp_doc.catalog_entry(key);
            let mut path = ObjectPath::new(
                cmp_entry.and_then(PdfObject::as_reference),
                out_entry.and_then(PdfObject::as_reference),
            );
            comparator.compare_objects(out_entry, cmp_entry, &mut path, &mut differences)?;
        }

        if self.config.xml_report {
            match differences.write_xml_report(paths.out_dir, &self.config.report_name) {
                Ok(target) => info!(report = %target.display(), "xml report written"),
                Err(err) => warn!(error = %err, "xml report could not be written"),
            }
        }

        let verdict = if equal_pages.len() == cmp_pages.len() && differences.is_satisfied() {
            Verdict::Equal
        } else {
            let report = format!("Compare by content report:\n{}", differences.report());
            info!("{report}");
            self.structural_failure_verdict(paths, &equal_pages, &report)
        };
        self.observer.finished(&verdict);
        Ok(ContentComparison {
            verdict,
            differences,
            equal_pages,
        })
    }

    /// Render both files and compare the page images only.
    pub fn compare_visually(&self, out_pdf: &Path, cmp_pdf: &Path, out_dir: &Path, diff_prefix: &str) -> Verdict {
        let outcome = self.visual().compare(out_pdf, cmp_pdf, out_dir, diff_prefix, &[]);
        let verdict = match outcome {
            VisualOutcome::Identical => Verdict::Equal,
            VisualOutcome::Different { message, .. } => Verdict::failure(FailureKind::VisualDifference, message),
            VisualOutcome::ToolFailure(message) => Verdict::failure(FailureKind::ToolFailure, message),
        };
        self.observer.finished(&verdict);
        verdict
    }

    /// Load both files and compare their link annotations.
    pub fn compare_links(&self, out_pdf: &Path, cmp_pdf: &Path) -> CompareResult<Option<String>> {
        let out_doc = load_document(out_pdf)?;
        let cmp_doc = load_document(cmp_pdf)?;
        let message = compare_links(&out_doc, &cmp_doc);
        match &message {
            None => info!("link annotations OK"),
            Some(message) => warn!(%message, "link annotations differ"),
        }
        Ok(message)
    }

    /// Load both files and compare their document information entries.
    pub fn compare_document_info(&self, out_pdf: &Path, cmp_pdf: &Path) -> CompareResult<Option<String>> {
        let out_doc = load_document(out_pdf)?;
        let cmp_doc = load_document(cmp_pdf)?;
        let message = compare_document_info(&out_doc, &cmp_doc);
        match &message {
            None => info!("document info OK"),
            Some(message) => warn!(%message, "document info differs"),
        }
        Ok(message)
    }

    fn visual(&self) -> VisualComparer {
        VisualComparer::new(self.config.visual.clone())
    }

    fn page_count_verdict(&self, paths: &ComparePaths<'_>) -> Verdict {
        let outcome = self
            .visual()
            .compare(paths.out_pdf, paths.cmp_pdf, paths.out_dir, paths.diff_prefix, &[]);
        let message = match outcome {
            VisualOutcome::Identical => format!("Unexpected number of pages for {}.", paths.out_pdf.display()),
            VisualOutcome::Different { message, .. } | VisualOutcome::ToolFailure(message) => message,
        };
        Verdict::failure(FailureKind::PageCountMismatch, message)
    }

    fn structural_failure_verdict(&self, paths: &ComparePaths<'_>, equal_pages: &[usize], report: &str) -> Verdict {
        let outcome = self
            .visual()
            .compare(paths.out_pdf, paths.cmp_pdf, paths.out_dir, paths.diff_prefix, equal_pages);
        match outcome {
            VisualOutcome::Identical => Verdict::failure(
                FailureKind::NoVisualDifference,
                format!("Compare by content fails. No visual differences\n{report}"),
            ),
            VisualOutcome::Different { message, .. } => Verdict::failure(FailureKind::VisualDifference, message),
            VisualOutcome::ToolFailure(message) => Verdict::failure(FailureKind::ToolFailure, message),
        }
    }
}
