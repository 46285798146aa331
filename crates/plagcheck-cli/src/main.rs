use anyhow::{bail, Context, Result};
use checker::{handle_analyze, AnalyzeRequest, AnalyzeResponse, TextSource, DEFAULT_REPORT_FILE};
use clap::{Parser, Subcommand};
use pdf_text::{LopdfExtractor, TextExtractor};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// plagcheck – word-overlap similarity plus a few crude text stats.
/// Commands:
///   - analyze --reference "..." --candidate "..."   (candidate on STDIN if omitted)
///   - extract --input file.pdf                      (debug: dump PDF text)
#[derive(Parser, Debug)]
#[command(name = "plagcheck", version, about = "Compare a text against a reference")]
struct Cli {
    /// Directory the report is saved into
    #[arg(long, global = true, default_value = ".")]
    out_dir: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a candidate text against a reference text
    Analyze {
        /// Reference text inline
        #[arg(long, conflicts_with = "reference_file")]
        reference: Option<String>,

        /// Reference text from a file (.pdf is extracted)
        #[arg(long)]
        reference_file: Option<PathBuf>,

        /// Candidate text inline; if neither this nor --candidate-file is given, read from STDIN
        #[arg(long, conflicts_with = "candidate_file")]
        candidate: Option<String>,

        /// Candidate text from a file (.pdf is extracted)
        #[arg(long)]
        candidate_file: Option<PathBuf>,

        /// Print the full response as JSON instead of report lines
        #[arg(long)]
        json: bool,

        /// Also write the report to <out-dir>/<report-name>
        #[arg(long)]
        save: bool,

        #[arg(long, default_value = DEFAULT_REPORT_FILE)]
        report_name: String,

        /// List the tokens that cost grammar points
        #[arg(long)]
        verbose: bool,
    },

    /// (Debug) Print the text extracted from a PDF
    Extract {
        #[arg(long)]
        input: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input_string(input: &mut dyn Read) -> Result<String> {
    let mut buf = String::new();
    input.read_to_string(&mut buf).context("failed reading STDIN")?;
    Ok(buf)
}

fn pick_source(inline: Option<String>, file: Option<PathBuf>) -> Option<TextSource> {
    match (inline, file) {
        (Some(text), _) => Some(TextSource::Text { text }),
        (None, Some(path)) => Some(TextSource::from_path(path)),
        (None, None) => None,
    }
}

fn print_response(
    out: &mut dyn Write,
    resp: &AnalyzeResponse,
    candidate: Option<&str>,
    verbose: bool,
) -> io::Result<()> {
    for line in resp.report.lines() {
        writeln!(out, "{line}")?;
    }
    if resp.report.flagged {
        writeln!(out, "! more than half of the reference vocabulary appears in the candidate")?;
    }
    if verbose {
        if let Some(text) = candidate {
            for tok in text_metrics::overlong_tokens(text) {
                writeln!(out, "  overlong token: {tok}")?;
            }
        }
    }
    Ok(())
}

fn save_report(resp: &AnalyzeResponse, out_dir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed creating {}", out_dir.display()))?;
    let path = out_dir.join(name);
    resp.report.write_to(&path)?;
    eprintln!("✓ wrote {}", path.display());
    Ok(path)
}

/// Execute one parsed command. `input` stands in for STDIN, `out` for STDOUT.
fn run(cli: Cli, input: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
    let extractor = LopdfExtractor;
    tracing::debug!(out_dir = %cli.out_dir.display(), "running command");

    match cli.cmd {
        Commands::Analyze {
            reference,
            reference_file,
            candidate,
            candidate_file,
            json,
            save,
            report_name,
            verbose,
        } => {
            let Some(reference) = pick_source(reference, reference_file) else {
                bail!("Please enter or upload both texts (missing reference text).");
            };
            let candidate = match pick_source(candidate, candidate_file) {
                Some(src) => src,
                None => TextSource::Text {
                    text: read_input_string(input)?,
                },
            };

            // verbose output needs the candidate text itself, so resolve it up front
            let candidate_text = if verbose {
                Some(checker::resolve(&candidate, &extractor)?)
            } else {
                None
            };
            let req = AnalyzeRequest {
                reference,
                candidate: match &candidate_text {
                    Some(text) => TextSource::Text { text: text.clone() },
                    None => candidate,
                },
            };
            let resp = handle_analyze(&req, &extractor)?;

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&resp)?)?;
            } else {
                print_response(out, &resp, candidate_text.as_deref(), verbose)?;
            }
            if save {
                save_report(&resp, &cli.out_dir, &report_name)?;
            }
        }

        // ----- DEBUG ROUTES -----
        Commands::Extract { input: pdf } => {
            let text = extractor
                .extract_text(&pdf)
                .with_context(|| format!("failed extracting text: {}", pdf.display()))?;
            write!(out, "{text}")?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli, &mut io::stdin().lock(), &mut io::stdout().lock())
}
