/*!
 * Structure-preserving translation of compliance documents.
 *
 * - `segments`: splits a body into translatable and preserved segments
 * - `prompts`: provider prompts and response cleanup
 * - `staleness`: per-run record of processed source files
 * - `orchestrator`: translate-and-render for a single document
 * - `batch`: drives the orchestrator over every collection, format and language
 * - `templates`: translates raw templates into tagged siblings
 */

pub use self::batch::{BatchDriver, BatchSummary};
pub use self::orchestrator::{DocumentTranslator, RenderOutcome};
pub use self::segments::{LineClassifier, Segment, SegmentKind, SectionClassifier};
pub use self::staleness::StalenessTracker;
pub use self::templates::{TemplateReport, TemplateTranslator, translate_templates};

pub mod batch;
pub mod orchestrator;
pub mod prompts;
pub mod segments;
pub mod staleness;
pub mod templates;
