//! Names and discovery of rendered page images.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const REFERENCE_MARKER: &str = "cmp_";
const IMAGE_EXTENSION: &str = ".png";

/// File names of the two documents and the Ghostscript output patterns
/// derived from them.
#[derive(Debug, Clone)]
pub(crate) struct ImageNames {
    out_name: String,
    cmp_name: String,
}

impl ImageNames {
    pub(crate) fn new(out_pdf: &Path, cmp_pdf: &Path) -> Self {
        Self {
            out_name: file_name(out_pdf),
            cmp_name: file_name(cmp_pdf),
        }
    }

    /// `-sOutputFile` pattern for the candidate document.
    pub(crate) fn out_pattern(&self) -> String {
        format!("{}-%03d{IMAGE_EXTENSION}", self.out_name)
    }

    /// `-sOutputFile` pattern for the reference document. Reference images
    /// carry a `cmp_` prefix unless the file name already starts with one.
    pub(crate) fn cmp_pattern(&self) -> String {
        if self.cmp_name.starts_with(REFERENCE_MARKER) {
            format!("{}-%03d{IMAGE_EXTENSION}", self.cmp_name)
        } else {
            format!("{REFERENCE_MARKER}{}-%03d{IMAGE_EXTENSION}", self.cmp_name)
        }
    }

    fn is_out_image(&self, name: &str) -> bool {
        name.ends_with(IMAGE_EXTENSION) && !name.contains(REFERENCE_MARKER) && name.contains(&self.out_name)
    }

    fn is_cmp_image(&self, name: &str) -> bool {
        name.ends_with(IMAGE_EXTENSION) && name.contains(REFERENCE_MARKER) && name.contains(&self.cmp_name)
    }

    /// Candidate and reference page images in `dir`, each sorted by path.
    pub(crate) fn list(&self, dir: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut out = Vec::new();
        let mut cmp = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if self.is_out_image(&name) {
                out.push(entry.path().to_path_buf());
            } else if self.is_cmp_image(&name) {
                cmp.push(entry.path().to_path_buf());
            }
        }
        out.sort();
        cmp.sort();
        (out, cmp)
    }

    /// Delete images left in `dir` by an earlier run.
    pub(crate) fn remove_stale(&self, dir: &Path) -> io::Result<usize> {
        let (out, cmp) = self.list(dir);
        let count = out.len() + cmp.len();
        for path in out.into_iter().chain(cmp) {
            fs::remove_file(path)?;
        }
        Ok(count)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns() {
        let names = ImageNames::new(Path::new("/tmp/out/doc.pdf"), Path::new("/tmp/cmp/doc.pdf"));
        assert_eq!(names.out_pattern(), "doc.pdf-%03d.png");
        assert_eq!(names.cmp_pattern(), "cmp_doc.pdf-%03d.png");

        let prefixed = ImageNames::new(Path::new("doc.pdf"), Path::new("cmp_doc.pdf"));
        assert_eq!(prefixed.cmp_pattern(), "cmp_doc.pdf-%03d.png");
    }

    #[test]
    fn listing_splits_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "doc.pdf-002.png",
            "doc.pdf-001.png",
            "cmp_doc.pdf-001.png",
            "other.pdf-001.png",
            "doc.pdf-001.txt",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let names = ImageNames::new(Path::new("doc.pdf"), Path::new("doc.pdf"));
        let (out, cmp) = names.list(dir.path());
        let out: Vec<String> = out
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(out, ["doc.pdf-001.png", "doc.pdf-002.png"]);
        assert_eq!(cmp.len(), 1);

        assert_eq!(names.remove_stale(dir.path()).unwrap(), 3);
        assert!(dir.path().join("other.pdf-001.png").exists());
    }
}
