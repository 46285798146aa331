
use pdf_text::{PdfError, TextExtractor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use text_metrics::{analyze, AnalysisResult};

mod report;

pub use report::{Report, DEFAULT_REPORT_FILE, REPORT_HEADER};

/// Stand-in text for a PDF that parsed fine but had no extractable text.
pub const EMPTY_PDF_PLACEHOLDER: &str = "No text found in PDF.";

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Please enter or upload both texts (missing {0} text).")]
    MissingInput(&'static str),

    #[error("failed reading {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading PDF: {0}")]
    Extraction(#[from] PdfError),

    #[error("error saving results to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CheckError>;

/// Where one side of the comparison comes from.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum TextSource {
    Text { text: String },
    File { path: PathBuf },
    Pdf { path: PathBuf },
}

impl TextSource {
    /// `.pdf` (any case) goes through extraction, everything else is read as UTF-8.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            TextSource::Pdf { path }
        } else {
            TextSource::File { path }
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AnalyzeRequest {
    pub reference: TextSource,
    pub candidate: TextSource,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
    pub report: Report,
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CheckError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Turn a source into raw text. Nothing is trimmed or normalised here.
pub fn resolve(source: &TextSource, extractor: &dyn TextExtractor) -> Result<String> {
    match source {
        TextSource::Text { text } => Ok(text.clone()),
        TextSource::File { path } => read_file(path),
        TextSource::Pdf { path } => {
            let text = extractor.extract_text(path)?;
            if text.is_empty() {
                tracing::warn!(path = %path.display(), "PDF has no extractable text");
                Ok(EMPTY_PDF_PLACEHOLDER.to_string())
            } else {
                Ok(text)
            }
        }
    }
}

/// Score already-resolved texts. Both must be non-empty.
pub fn analyze_texts(reference: &str, candidate: &str) -> Result<AnalyzeResponse> {
    if reference.is_empty() {
        return Err(CheckError::MissingInput("reference"));
    }
    if candidate.is_empty() {
        return Err(CheckError::MissingInput("candidate"));
    }
    let result = analyze(reference, candidate);
    let report = Report::from_result(&result);
    tracing::info!(
        similarity = result.similarity,
        flagged = report.flagged,
        "analysis complete"
    );
    Ok(AnalyzeResponse { result, report })
}

/// Resolve both sides, then analyze. Fails before any scoring if either side cannot be read.
pub fn handle_analyze(
    req: &AnalyzeRequest,
    extractor: &dyn TextExtractor,
) -> Result<AnalyzeResponse> {
    let reference = resolve(&req.reference, extractor)?;
    let candidate = resolve(&req.candidate, extractor)?;
    analyze_texts(&reference, &candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Hands back canned text and remembers which paths it was asked for.
    struct FakeExtractor {
        text: Option<&'static str>,
        seen: RefCell<Vec<PathBuf>>,
    }

    impl FakeExtractor {
        fn returning(text: &'static str) -> Self {
            Self {
                text: Some(text),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                text: None,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextExtractor for FakeExtractor {
        fn extract_text(&self, path: &Path) -> pdf_text::Result<String> {
            self.seen.borrow_mut().push(path.to_path_buf());
            match self.text {
                Some(t) => Ok(t.to_string()),
                None => Err(PdfError::Parse("fake failure".into())),
            }
        }
    }

    fn text(s: &str) -> TextSource {
        TextSource::Text {
            text: s.to_string(),
        }
    }

    fn pdf(p: &str) -> TextSource {
        TextSource::Pdf {
            path: PathBuf::from(p),
        }
    }

    #[test]
    fn from_path_detects_pdf_case_insensitively() {
        assert_eq!(TextSource::from_path("a/b.pdf"), pdf("a/b.pdf"));
        assert_eq!(TextSource::from_path("B.PDF"), pdf("B.PDF"));
        assert!(matches!(
            TextSource::from_path("notes.txt"),
            TextSource::File { .. }
        ));
        assert!(matches!(
            TextSource::from_path("README"),
            TextSource::File { .. }
        ));
    }

    #[test]
    fn empty_pdf_resolves_to_placeholder() {
        let fake = FakeExtractor::returning("");
        let got = resolve(&pdf("x.pdf"), &fake).unwrap();
        assert_eq!(got, EMPTY_PDF_PLACEHOLDER);
        assert_eq!(fake.seen.borrow().as_slice(), &[PathBuf::from("x.pdf")]);
    }

    #[test]
    fn extraction_failure_is_reported() {
        let fake = FakeExtractor::failing();
        let req = AnalyzeRequest {
            reference: pdf("ref.pdf"),
            candidate: text("anything"),
        };
        let err = handle_analyze(&req, &fake).unwrap_err();
        assert!(matches!(err, CheckError::Extraction(_)), "got {err:?}");
    }

    #[test]
    fn missing_text_is_rejected_before_scoring() {
        let fake = FakeExtractor::returning("unused");
        let req = AnalyzeRequest {
            reference: text(""),
            candidate: text("hello"),
        };
        assert!(matches!(
            handle_analyze(&req, &fake).unwrap_err(),
            CheckError::MissingInput("reference")
        ));
        let req = AnalyzeRequest {
            reference: text("hello"),
            candidate: text(""),
        };
        assert!(matches!(
            handle_analyze(&req, &fake).unwrap_err(),
            CheckError::MissingInput("candidate")
        ));
    }

    #[test]
    fn whitespace_only_input_is_accepted_and_scored() {
        // only a truly empty field is "missing"
        let resp = analyze_texts("   ", "a b").unwrap();
        assert_eq!(resp.result.similarity, 0.0);
        assert_eq!(resp.result.word_count, 2);
    }

    #[test]
    fn pdf_text_flows_into_analysis() {
        let fake = FakeExtractor::returning("the quick brown fox");
        let req = AnalyzeRequest {
            reference: pdf("ref.pdf"),
            candidate: text("The Quick brown fox jumps"),
        };
        let resp = handle_analyze(&req, &fake).unwrap();
        assert_eq!(resp.result.similarity, 1.0);
        assert_eq!(resp.report.similarity, "Similarity: 100%");
        assert!(resp.report.flagged);
    }

    #[test]
    fn request_round_trips_through_json() {
        let req = AnalyzeRequest {
            reference: pdf("ref.pdf"),
            candidate: text("hi"),
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: AnalyzeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.reference, req.reference);
        assert_eq!(back.candidate, req.candidate);
    }
}
