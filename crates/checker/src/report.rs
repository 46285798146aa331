use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use text_metrics::AnalysisResult;

use crate::{CheckError, Result};

pub const DEFAULT_REPORT_FILE: &str = "plagiarism_results.txt";
pub const REPORT_HEADER: &str = "Plagiarism Report";

/// Above this similarity the candidate is flagged.
const FLAG_THRESHOLD: f64 = 0.5;

/// Two decimals, half away from zero, applied to the shortest decimal form of
/// `value` (192.625 prints as 192.63) rather than to the nearest binary value.
pub fn format_two_decimals(value: f64) -> String {
    match Decimal::from_str(&value.to_string()) {
        Ok(d) => {
            let rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{rounded:.2}")
        }
        // out of Decimal range
        Err(_) => format!("{value:.2}"),
    }
}

/// Display lines for one analysis, in report order.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Report {
    pub similarity: String,
    pub grammar: String,
    pub word_count: String,
    pub readability: String,
    pub flagged: bool,
}

impl Report {
    pub fn from_result(r: &AnalysisResult) -> Self {
        // truncate, not round: 0.999 shows as 99%
        let pct = (r.similarity * 100.0) as u32;
        Self {
            similarity: format!("Similarity: {pct}%"),
            grammar: format!("Grammar Accuracy: {}%", r.grammar_score),
            word_count: format!("Word Count: {}", r.word_count),
            readability: format!("Readability Score: {}", format_two_decimals(r.readability)),
            flagged: r.similarity > FLAG_THRESHOLD,
        }
    }

    pub fn lines(&self) -> [&str; 4] {
        [&self.similarity, &self.grammar, &self.word_count, &self.readability]
    }

    /// Header plus the four lines, each newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(128);
        out.push_str(REPORT_HEADER);
        out.push('\n');
        for line in self.lines() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Create or truncate `path` and write the rendered report.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render()).map_err(|source| CheckError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "saved report");
        Ok(())
    }
}
