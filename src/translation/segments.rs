/*!
 * Section classification for markdown documents with YAML frontmatter.
 *
 * A body is cut into segments: every blank line is its own segment, and runs of
 * non-blank lines are grouped until the next blank line. Joining the segments with
 * `\n` reproduces the body byte for byte.
 *
 * Each segment is then tagged `Translatable` or `Preserved` with a line-local
 * heuristic. It never parses YAML or markdown; frontmatter, renderer directives,
 * pipe tables, code fences and LaTeX header blocks are recognised by their markers.
 */

/// Whether a segment goes to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Free text to be translated
    Translatable,
    /// Structure that must survive byte for byte
    Preserved,
}

/// A contiguous chunk of a document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Raw text, without the separating newline
    pub text: String,
    /// Classification tag
    pub kind: SegmentKind,
}

impl Segment {
    /// True if the segment is to be sent to a provider
    pub fn is_translatable(&self) -> bool {
        self.kind == SegmentKind::Translatable
    }
}

/// Splits a body into classified segments.
///
/// The orchestrator only depends on this trait, so a structured parser can replace the
/// line heuristic without touching the pipeline.
pub trait SectionClassifier: Send + Sync {
    /// Classify `body`; joining the returned texts with `\n` must give back `body`
    fn classify(&self, body: &str) -> Vec<Segment>;

    /// True if at least one segment would be sent to a provider
    fn has_translatable(&self, body: &str) -> bool {
        self.classify(body).iter().any(Segment::is_translatable)
    }
}

/// The marker-based classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct LineClassifier;

impl SectionClassifier for LineClassifier {
    fn classify(&self, body: &str) -> Vec<Segment> {
        split_sections(body)
            .into_iter()
            .map(|text| {
                let kind = classify_section(&text);
                Segment { text, kind }
            })
            .collect()
    }
}

/// Split on blank lines, keeping each blank line as its own section
pub fn split_sections(body: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.split('\n') {
        if line.is_empty() {
            if !current.is_empty() {
                sections.push(current.join("\n"));
                current.clear();
            }
            sections.push(String::new());
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    sections
}

/// Decide the kind of one section. First matching rule wins.
pub fn classify_section(section: &str) -> SegmentKind {
    let section = section.trim();

    if section.is_empty() {
        return SegmentKind::Preserved;
    }

    // frontmatter boundary
    if section.starts_with("---") || section.ends_with("---") {
        return SegmentKind::Preserved;
    }

    // raw renderer directive
    if section.starts_with('%') {
        return SegmentKind::Preserved;
    }

    if section.contains('|') && (section.contains("---") || section.contains("Table:")) {
        return SegmentKind::Preserved;
    }

    if section.starts_with("```") || section.ends_with("```") {
        return SegmentKind::Preserved;
    }

    if section.contains("header-includes:") || section.contains("\\usepackage") {
        return SegmentKind::Preserved;
    }

    SegmentKind::Translatable
}

/// Reassemble segments into a body
pub fn join_segments<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    texts.into_iter().collect::<Vec<_>>().join("\n")
}
