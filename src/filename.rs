//! Language tags embedded in file names.
//!
//! A translated template sits next to its source with the tag inserted before the
//! extension: `access.md` becomes `access.pt-BR.md`. Detection is a heuristic on the
//! second-to-last dot component, which must either contain a hyphen or be exactly two
//! characters long.
//!
//! Known false positive: an untranslated file whose name happens to carry a two
//! character component (`report.v2.md`) is treated as tagged with `v2`.

use std::path::{Path, PathBuf};

use crate::render::OutputFormat;

/// Insert `language` as the final-but-one dot component of `filename`.
///
/// A name without an extension gets the tag appended: `NOTES` becomes `NOTES.es`.
pub fn tag_filename(filename: &str, language: &str) -> String {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => format!("{}.{}{}", &filename[..idx], language, &filename[idx..]),
        _ => format!("{}.{}", filename, language),
    }
}

/// Same as [`tag_filename`] for a full path, keeping the parent directory
pub fn tag_path(path: &Path, language: &str) -> PathBuf {
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tagged = tag_filename(&filename, language);
    match path.parent() {
        Some(parent) => parent.join(tagged),
        None => PathBuf::from(tagged),
    }
}

/// Extract the language tag carried by `filename`, if any
pub fn detect_language_tag(filename: &str) -> Option<&str> {
    let parts: Vec<&str> = filename.split('.').collect();
    if parts.len() < 3 {
        return None;
    }
    let candidate = parts[parts.len() - 2];
    let len = candidate.chars().count();
    if len >= 2 && (candidate.contains('-') || len == 2) {
        Some(candidate)
    } else {
        None
    }
}

/// True when the file name carries a language tag
pub fn is_tagged(filename: &str) -> bool {
    detect_language_tag(filename).is_some()
}

/// Recover the source file name from a tagged one: `policy.pt-BR.md` -> `policy.md`
pub fn base_filename(filename: &str) -> String {
    match detect_language_tag(filename) {
        Some(tag) => {
            let idx = filename.rfind('.').unwrap_or(filename.len());
            let tag_start = idx - tag.len() - 1;
            format!("{}{}", &filename[..tag_start], &filename[idx..])
        }
        None => filename.to_string(),
    }
}

/// Name of a rendered translated artifact: `<stem>_<language>.<ext>`
pub fn rendered_artifact_name(stem: &str, language: &str, format: OutputFormat) -> String {
    format!("{}_{}.{}", stem, language, format.extension())
}

/// Intermediate markdown names for one rendering unit: `(preprocessed, translated)`.
///
/// Both carry the language and format so concurrent units never share a file.
pub fn intermediate_names(stem: &str, language: &str, format: OutputFormat) -> (String, String) {
    let unit = format!("{}_{}_{}", stem, language, format.extension());
    (format!("{}.source.md", unit), format!("{}.md", unit))
}
