
use lopdf::Document;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a readable PDF: {0}")]
    Parse(String),

    #[error("text extraction failed on page {page}: {reason}")]
    Extract { page: u32, reason: String },
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Anything that can turn a document on disk into plain text.
pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Default extractor, pure Rust via lopdf.
#[derive(Clone, Copy, Debug, Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|source| PdfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = extract_text_from_bytes(&bytes)?;
        tracing::info!(path = %path.display(), chars = text.chars().count(), "extracted PDF text");
        Ok(text)
    }
}

/// Parse a PDF held in memory and concatenate the text of every page, in page order.
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

    // get_pages is a BTreeMap keyed by 1-based page number
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    tracing::debug!(pages = pages.len(), "loaded PDF");

    let mut out = String::new();
    for page in pages {
        let text = doc.extract_text(&[page]).map_err(|e| PdfError::Extract {
            page,
            reason: e.to_string(),
        })?;
        out.push_str(&text);
    }
    Ok(out)
}
