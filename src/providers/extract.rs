//! Document text extraction
//!
//! The extractor returns the concatenation of page texts separated by blank
//! lines. Only `.pdf` handles are routed to the provider; any other
//! extension yields empty text with a warning, not an error.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ProviderError;

/// Text extraction provider for submitted documents
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, ProviderError>;
}

/// Extract text for every document handle in `paths`.
///
/// Handles with an unsupported extension map to the empty string. Provider
/// errors propagate and fail the extraction stage.
pub fn process_documents(
    extractor: &dyn TextExtractor,
    paths: &[String],
) -> Result<BTreeMap<String, String>, ProviderError> {
    let mut extracted = BTreeMap::new();

    for handle in paths {
        let path = Path::new(handle);
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        let text = if is_pdf {
            let text = extractor.extract_text(path)?;
            tracing::debug!(handle = %handle, chars = text.len(), "extracted document text");
            text
        } else {
            tracing::warn!(handle = %handle, "unsupported document format, skipping extraction");
            String::new()
        };

        extracted.insert(handle.clone(), text);
    }

    Ok(extracted)
}

/// In-memory extractor backed by a handle-to-text map.
///
/// Used by the bundled binary (inline document texts) and by tests. Handles
/// missing from the map extract to empty text.
#[derive(Debug, Default, Clone)]
pub struct StaticTextExtractor {
    texts: BTreeMap<String, String>,
}

impl StaticTextExtractor {
    pub fn new(texts: BTreeMap<String, String>) -> Self {
        Self { texts }
    }
}

impl TextExtractor for StaticTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ProviderError> {
        Ok(self
            .texts
            .get(&path.to_string_lossy().to_string())
            .cloned()
            .unwrap_or_default())
    }
}

/// Extractor that yields empty text for every document
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTextExtractor;

impl TextExtractor for NullTextExtractor {
    fn extract_text(&self, _path: &Path) -> Result<String, ProviderError> {
        Ok(String::new())
    }
}
