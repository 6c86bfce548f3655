//! Language utilities for language tag handling
//!
//! Tags are ISO 639 codes, optionally region- or script-qualified (`pt-BR`, `zh-Hant`).
//! Only the shape is validated here; the primary subtag is resolved through ISO 639 when
//! a readable name is wanted for prompts.

use isolang::Language;

use crate::errors::ConfigError;
use crate::filename::{detect_language_tag, tag_filename};

/// Validate the shape of a language tag: 2-3 letter primary subtag, then `-` separated
/// alphanumeric subtags of 1 to 8 characters.
///
/// The tag must also be recognisable once written into a file name, so a bare
/// three-letter code (`fil`) is rejected; use a qualified form such as `fil-PH`.
pub fn validate_language_tag(tag: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidLanguage(tag.to_string());

    let mut subtags = tag.split('-');
    let primary = subtags.next().ok_or_else(invalid)?;
    if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    for subtag in subtags {
        if subtag.is_empty() || subtag.len() > 8 || !subtag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
    }

    if detect_language_tag(&tag_filename("template.md", tag)) != Some(tag) {
        return Err(invalid());
    }

    Ok(())
}

/// Primary subtag of a tag: `pt-BR` -> `pt`
pub fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

/// English name of the language behind a tag, if ISO 639 knows it
pub fn get_language_name(tag: &str) -> Option<String> {
    let primary = primary_subtag(tag.trim()).to_lowercase();
    let language = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }?;
    Some(language.to_name().to_string())
}

/// Name used inside prompts: `Portuguese (pt-BR)`, or the bare tag when unknown
pub fn prompt_language_name(tag: &str) -> String {
    match get_language_name(tag) {
        Some(name) => format!("{} ({})", name, tag),
        None => tag.to_string(),
    }
}
