/*!
 * Prompt construction and light response cleanup.
 *
 * Every provider wraps the text it receives in the same translator instruction. For
 * whole documents and templates, the text is itself a structured prompt that tells the
 * model which metadata fields to touch. Models still prepend chatter now and then, so
 * responses to structured prompts go through `clean_document_response`.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language_utils::prompt_language_name;

/// Instruction shared by all provider variants, with the text appended verbatim
pub fn translator_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional compliance document translator. Translate the following text from {} to {} \
         exactly as written, preserving all formatting, markdown syntax, YAML frontmatter, and technical terms. \
         Do not add any comments, explanations, or additional content. Return only the translated text.\n\n{}",
        prompt_language_name(source_language),
        prompt_language_name(target_language),
        text
    )
}

/// Structured prompt for a whole document or template with YAML frontmatter
pub fn structured_document_prompt(content: &str, target_language: &str) -> String {
    let target = prompt_language_name(target_language);
    format!(
        "You are a professional translator. Your task is to translate a markdown template document while \
         preserving its exact structure and format.\n\n\
         **Instructions:**\n\
         1. Translate the YAML metadata fields: `name` and `comment` values to {target}\n\
         2. Translate all content after the `---` separator to {target}\n\
         3. Keep all other YAML fields unchanged (acronym, satisfies, dates, etc.)\n\
         4. Preserve all markdown formatting, template variables (like {{{{.Name}}}}), and document structure\n\
         5. Return only the translated content with no additional comments or explanations\n\
         6. Maintain the exact same line breaks and spacing as the original\n\n\
         **Input document:**\n{content}\n\n\
         **Target language:** {target}",
        target = target,
        content = content
    )
}

static PREFIX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^\s*here\s+is\s+the\s+translated\s+document:?\s*\n?",
        r"(?i)^\s*translated\s+document:?\s*\n?",
        r"(?i)^\s*result:?\s*\n?",
        r"(?i)^\s*translation:?\s*\n?",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

static YAML_FIELD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*:\s*").ok());

/// Strip boilerplate a model put in front of the document.
///
/// Known prefixes are removed first. Then everything before the first line that looks
/// like a YAML field, a `---` delimiter or a markdown heading is dropped.
pub fn clean_document_response(response: &str) -> String {
    let mut result = response.to_string();
    for pattern in PREFIX_PATTERNS.iter() {
        result = pattern.replace(&result, "").into_owned();
    }

    let lines: Vec<&str> = result.split('\n').collect();
    let start = lines.iter().position(|line| looks_like_document_start(line.trim()));

    if let Some(start) = start.filter(|idx| *idx > 0) {
        result = lines[start..].join("\n");
    }

    result.trim().to_string()
}

fn looks_like_document_start(line: &str) -> bool {
    line == "---"
        || line.starts_with('#')
        || YAML_FIELD.as_ref().is_some_and(|re| re.is_match(line))
}
