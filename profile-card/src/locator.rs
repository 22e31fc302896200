// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Template resolution for card documents.
//!
//! A fresh checkout only carries the templates under `reference/`. The first
//! run copies the template next to the target so later runs patch the file in
//! place.

use std::{
    fs,
    path::{Path, PathBuf}
};

use tracing::{debug, info, warn};

use crate::{document::Document, error::Error};

/// Default directory holding reference templates.
pub const DEFAULT_REFERENCE_DIR: &str = "reference";

/// Where a located document was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// The target file already existed.
    Existing,
    /// The reference template was copied to the target path.
    CopiedFromReference,
    /// The copy failed and the reference template was read directly.
    ReadFromReference
}

/// Parsed document together with its source.
#[derive(Debug, Clone)]
pub struct LocatedDocument {
    /// Parsed markup.
    pub document: Document,
    /// File the markup was read from.
    pub source:   PathBuf,
    /// How the source was resolved.
    pub origin:   DocumentOrigin
}

/// Returns the reference template path for `target`.
pub fn reference_path(target: &Path, reference_dir: &Path) -> PathBuf {
    match target.file_name() {
        Some(name) => reference_dir.join(name),
        None => reference_dir.join(target)
    }
}

/// Opens the document at `target`, creating it from the reference template
/// when missing.
///
/// # Errors
///
/// Returns [`Error::TemplateNotFound`] when neither `target` nor the reference
/// template exists, and parse or I/O errors from [`Document::load`].
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use profile_card::{DocumentOrigin, ensure_document};
///
/// # fn main() -> Result<(), profile_card::Error> {
/// let located = ensure_document(Path::new("dark_mode.svg"), Path::new("reference"))?;
/// if located.origin == DocumentOrigin::CopiedFromReference {
///     println!("bootstrapped from {}", located.source.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn ensure_document(target: &Path, reference_dir: &Path) -> Result<LocatedDocument, Error> {
    if target.exists() {
        debug!(path = %target.display(), "using existing document");
        return locate(target, DocumentOrigin::Existing);
    }

    let reference = reference_path(target, reference_dir);
    if !reference.exists() {
        return Err(Error::TemplateNotFound {
            target: target.to_path_buf(),
            reference
        });
    }

    match copy_template(&reference, target) {
        Ok(()) => {
            info!(
                from = %reference.display(),
                to = %target.display(),
                "copied reference template"
            );
            locate(target, DocumentOrigin::CopiedFromReference)
        }
        Err(error) => {
            warn!(
                from = %reference.display(),
                to = %target.display(),
                %error,
                "failed to copy reference template, reading it directly"
            );
            locate(&reference, DocumentOrigin::ReadFromReference)
        }
    }
}

fn copy_template(reference: &Path, target: &Path) -> std::io::Result<()> {
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    fs::copy(reference, target).map(|_| ())
}

fn locate(path: &Path, origin: DocumentOrigin) -> Result<LocatedDocument, Error> {
    Ok(LocatedDocument {
        document: Document::load(path)?,
        source: path.to_path_buf(),
        origin
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    const SVG: &str = "<svg><text id=\"age_data\">x</text></svg>";

    #[test]
    fn existing_target_is_used_as_is() {
        let directory = tempdir().expect("failed to create temp dir");
        let target = directory.path().join("dark_mode.svg");
        fs::write(&target, SVG).expect("failed to write target");

        let located =
            ensure_document(&target, &directory.path().join("reference")).expect("located");
        assert_eq!(located.origin, DocumentOrigin::Existing);
        assert_eq!(located.source, target);
        assert!(located.document.root.find_by_id("age_data").is_some());
    }

    #[test]
    fn missing_target_is_copied_from_reference() {
        let directory = tempdir().expect("failed to create temp dir");
        let reference_dir = directory.path().join("reference");
        fs::create_dir_all(&reference_dir).expect("failed to create reference dir");
        fs::write(reference_dir.join("light_mode.svg"), SVG).expect("failed to write template");
        let target = directory.path().join("out").join("light_mode.svg");

        let located = ensure_document(&target, &reference_dir).expect("located");

        assert_eq!(located.origin, DocumentOrigin::CopiedFromReference);
        assert_eq!(located.source, target);
        assert_eq!(fs::read_to_string(&target).expect("copied"), SVG);
    }

    #[test]
    fn failed_copy_falls_back_to_reference() {
        let directory = tempdir().expect("failed to create temp dir");
        let reference_dir = directory.path().join("reference");
        fs::create_dir_all(&reference_dir).expect("failed to create reference dir");
        fs::write(reference_dir.join("dark_mode.svg"), SVG).expect("failed to write template");
        let blocker = directory.path().join("blocked");
        fs::write(&blocker, "file, not a directory").expect("failed to write blocker");
        let target = blocker.join("dark_mode.svg");

        let located = ensure_document(&target, &reference_dir).expect("located");

        assert_eq!(located.origin, DocumentOrigin::ReadFromReference);
        assert_eq!(located.source, reference_dir.join("dark_mode.svg"));
    }

    #[test]
    fn missing_template_names_both_paths() {
        let directory = tempdir().expect("failed to create temp dir");
        let target = directory.path().join("dark_mode.svg");
        let reference_dir = directory.path().join("reference");

        let error = ensure_document(&target, &reference_dir).expect_err("template missing");
        match error {
            Error::TemplateNotFound {
                target: ref missing_target,
                ref reference
            } => {
                assert_eq!(missing_target, &target);
                assert_eq!(reference, &reference_dir.join("dark_mode.svg"));
            }
            other => panic!("unexpected error variant: {other:?}")
        }
    }

    #[test]
    fn reference_path_uses_file_name_only() {
        assert_eq!(
            reference_path(Path::new("cards/dark_mode.svg"), Path::new("reference")),
            PathBuf::from("reference/dark_mode.svg")
        );
    }
}
