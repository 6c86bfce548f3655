/*!
 * Compliance documents and where they come from.
 *
 * Documents are markdown files with YAML frontmatter living under `policies/`,
 * `procedures/` and `narratives/`. The filesystem source lists originals and, when
 * translation is enabled, the translated siblings of configured languages. The
 * preprocessor turns a document into the markdown handed to the renderer.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::errors::{TranslationError, TranslationResult};
use crate::file_utils::FileManager;
use crate::filename::{base_filename, detect_language_tag};

/// The three document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Policy,
    Procedure,
    Narrative,
}

impl DocumentKind {
    /// Every kind, in batch order
    pub const ALL: [DocumentKind; 3] = [DocumentKind::Policy, DocumentKind::Procedure, DocumentKind::Narrative];

    /// Top-level directory holding this kind
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Policy => "policies",
            Self::Procedure => "procedures",
            Self::Narrative => "narratives",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Policy => "policy",
            Self::Procedure => "procedure",
            Self::Narrative => "narrative",
        };
        f.write_str(name)
    }
}

/// One entry of the revision history
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Revision {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub comment: String,
}

/// A unit of translatable content
#[derive(Debug, Clone)]
pub struct Document {
    /// Collection the document belongs to
    pub kind: DocumentKind,
    /// Display name from the `name` metadata field
    pub name: String,
    /// Short identifier from the `acronym` field
    pub acronym: Option<String>,
    /// Raw markdown, frontmatter included
    pub body: String,
    /// Absolute source path
    pub full_path: PathBuf,
    /// Stem for every derived artifact
    pub output_filename: String,
    /// Source modification time
    pub modified_at: SystemTime,
    /// Standard name -> satisfied control keys
    pub satisfies: BTreeMap<String, Vec<String>>,
    /// Major revisions, oldest first as written
    pub revisions: Vec<Revision>,
    /// Language tag when this is a translated sibling
    pub language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    #[serde(default)]
    name: String,
    #[serde(default)]
    acronym: Option<String>,
    #[serde(default)]
    satisfies: BTreeMap<String, Vec<String>>,
    #[serde(default, rename = "majorRevisions")]
    major_revisions: Vec<Revision>,
}

/// Split `content` into its frontmatter YAML and the rest.
///
/// The first line must be `---`; the block ends at the next line that is exactly `---`.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

impl Document {
    /// Build a document from file content
    pub fn parse(
        kind: DocumentKind,
        path: &Path,
        content: String,
        modified_at: SystemTime,
        file_prefix: Option<&str>,
    ) -> TranslationResult<Self> {
        let (yaml, _) = split_frontmatter(&content).ok_or_else(|| TranslationError::Frontmatter {
            path: path.to_path_buf(),
            message: "missing `---` delimited block".to_string(),
        })?;

        let meta: Frontmatter = if yaml.trim().is_empty() {
            Frontmatter::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| TranslationError::Frontmatter {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let language = detect_language_tag(&filename).map(str::to_string);
        let base = base_filename(&filename);
        let stem = Path::new(&base)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(base.clone());

        let output_filename = match file_prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => format!("{}-{}", prefix, stem),
            None => stem.clone(),
        };

        let name = if meta.name.trim().is_empty() { stem } else { meta.name };

        Ok(Self {
            kind,
            name,
            acronym: meta.acronym,
            body: content,
            full_path: path.to_path_buf(),
            output_filename,
            modified_at,
            satisfies: meta.satisfies,
            revisions: meta.major_revisions,
            language,
        })
    }

    /// True for source documents, false for translated siblings
    pub fn is_original(&self) -> bool {
        self.language.is_none()
    }
}

/// Supplies the documents of one collection
pub trait DocumentSource: Send + Sync {
    /// Every listed document of `kind`, originals first
    fn documents(&self, kind: DocumentKind) -> TranslationResult<Vec<Document>>;

    /// Source documents only
    fn originals(&self, kind: DocumentKind) -> TranslationResult<Vec<Document>> {
        Ok(self.documents(kind)?.into_iter().filter(Document::is_original).collect())
    }
}

/// Reads documents from the project directory
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
    file_prefix: Option<String>,
    /// Languages whose translated siblings are listed; empty when translation is off
    translated_languages: Vec<String>,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>, file_prefix: Option<String>) -> Self {
        Self {
            root: root.into(),
            file_prefix,
            translated_languages: Vec::new(),
        }
    }

    /// List translated siblings for these languages
    pub fn with_translations(mut self, languages: Vec<String>) -> Self {
        self.translated_languages = languages;
        self
    }

    fn load(&self, kind: DocumentKind, path: &Path) -> TranslationResult<Document> {
        let absolute = std::path::absolute(path).map_err(|e| TranslationError::io("unable to resolve", path, e))?;
        let content =
            FileManager::read_to_string(&absolute).map_err(|e| TranslationError::io("unable to read", &absolute, e))?;
        let modified = FileManager::modified_time(&absolute)
            .map_err(|e| TranslationError::io("unable to stat", &absolute, e))?;
        Document::parse(kind, &absolute, content, modified, self.file_prefix.as_deref())
    }
}

impl DocumentSource for FsDocumentSource {
    fn documents(&self, kind: DocumentKind) -> TranslationResult<Vec<Document>> {
        let dir = self.root.join(kind.directory());
        if !FileManager::dir_exists(&dir) {
            debug!("No {} directory at {:?}", kind, dir);
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| TranslationError::io("unable to list", &dir, e.into()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type().is_file() || !name.ends_with(".md") || name.to_uppercase().starts_with("README") {
                continue;
            }
            paths.push((name, entry.into_path()));
        }

        let mut originals = Vec::new();
        let mut translations = Vec::new();
        for (name, path) in paths {
            match detect_language_tag(&name) {
                None => originals.push(self.load(kind, &path)?),
                Some(lang) if self.translated_languages.iter().any(|l| l == lang) => {
                    translations.push(self.load(kind, &path)?)
                }
                Some(lang) => debug!("Ignoring {} ({} is not a configured language)", name, lang),
            }
        }

        originals.extend(translations);
        Ok(originals)
    }
}

/// Produces the markdown handed to the renderer
pub trait Preprocessor: Send + Sync {
    /// Write the preprocessed form of `document` to `destination`
    fn preprocess(&self, document: &Document, destination: &Path) -> TranslationResult<()>;
}

/// Appends control-satisfaction and revision-history tables to the document
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownPreprocessor;

impl MarkdownPreprocessor {
    /// The preprocessed markdown for a document
    pub fn render(&self, document: &Document) -> String {
        let mut out = document.body.trim_end().to_string();

        if !document.satisfies.is_empty() {
            out.push_str("\n\n| Standard | Controls Satisfied |\n|----------|--------------------|\n");
            for (standard, controls) in &document.satisfies {
                out.push_str(&format!("| {} | {} |\n", standard, controls.join(", ")));
            }
            out.push_str("\nTable: Control satisfaction");
        }

        if !document.revisions.is_empty() {
            out.push_str("\n\n| Date | Comment |\n|------|---------|\n");
            for revision in &document.revisions {
                out.push_str(&format!("| {} | {} |\n", revision.date, revision.comment));
            }
            out.push_str("\nTable: Revision history");
        }

        out.push('\n');
        out
    }
}

impl Preprocessor for MarkdownPreprocessor {
    fn preprocess(&self, document: &Document, destination: &Path) -> TranslationResult<()> {
        FileManager::write_to_file(destination, &self.render(document))
            .map_err(|e| TranslationError::io("unable to write", destination, e))
    }
}
