//! External provider interfaces
//!
//! The pipeline treats text extraction, embedding, linguistic tagging and
//! narrative summarization as injected collaborators. Provider clients are
//! expensive to construct and safe to share read-only, so they are held
//! behind `Arc` and owned by the caller; parallel runs may share one bundle.

pub mod embed;
pub mod extract;
pub mod linguistic;
pub mod summarize;

pub use embed::{Embedder, HashingTfEmbedder};
pub use extract::{NullTextExtractor, StaticTextExtractor, TextExtractor};
pub use linguistic::{LinguisticTagger, PosTag, TaggedText, TaggedToken};
pub use summarize::{Summarizer, SummaryContext};

use std::sync::Arc;

/// The provider bundle injected into a pipeline.
///
/// The extractor is always required; the other three are optional. Absent
/// providers degrade gracefully: insufficient-data similarity results,
/// fallback stylometry features, no narrative summary.
#[derive(Clone)]
pub struct Providers {
    pub extractor: Arc<dyn TextExtractor>,
    pub embedder: Option<Arc<dyn Embedder>>,
    pub tagger: Option<Arc<dyn LinguisticTagger>>,
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

impl Providers {
    /// Bundle with just an extractor; everything else runs in fallback mode
    pub fn with_extractor(extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            extractor,
            embedder: None,
            tagger: None,
            summarizer: None,
        }
    }
}
