//! Classify extracted pages
//!
//! Reads a JSON array of pages (page index, page rectangle, blocks) and
//! writes one JSON page tree per classified page.
//!
//! Usage:
//!   cargo run --release --bin classify_pages -- pages.json
//!   cargo run --release --bin classify_pages -- pages.json --output-dir out --config tuning.json
//!   cargo run --release --bin classify_pages -- pages.json --diagnostics

use instruction_oxide::{ClassificationEngine, ClassifierConfig, Element, PageInput, PageOutcome};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

struct RunConfig {
    input: PathBuf,
    output_dir: PathBuf,
    config: Option<PathBuf>,
    diagnostics: bool,
    verbose: bool,
}

impl RunConfig {
    fn from_args() -> Option<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut input = None;
        let mut output_dir = PathBuf::from("classified");
        let mut config = None;
        let mut diagnostics = false;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output-dir" => {
                    i += 1;
                    if i < args.len() {
                        output_dir = PathBuf::from(&args[i]);
                    }
                },
                "--config" => {
                    i += 1;
                    if i < args.len() {
                        config = Some(PathBuf::from(&args[i]));
                    }
                },
                "--diagnostics" => {
                    diagnostics = true;
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                other => {
                    if input.is_none() {
                        input = Some(PathBuf::from(other));
                    }
                },
            }
            i += 1;
        }

        Some(Self {
            input: input?,
            output_dir,
            config,
            diagnostics,
            verbose,
        })
    }
}

fn write_outcome(outcome: &PageOutcome, run: &RunConfig) -> instruction_oxide::Result<Option<usize>> {
    let PageOutcome::Classified { result, page } = outcome else {
        return Ok(None);
    };
    let json = Element::from(page.clone()).to_json_pretty()?;
    let path = run.output_dir.join(format!("page_{:04}.json", page.page_index));
    fs::write(&path, &json)?;

    if run.diagnostics {
        let diag = serde_json::to_string_pretty(&result.diagnostics())?;
        let path = run
            .output_dir
            .join(format!("page_{:04}.diagnostics.json", page.page_index));
        fs::write(path, diag)?;
    }
    Ok(Some(json.len()))
}

fn main() {
    env_logger::init();

    let Some(run) = RunConfig::from_args() else {
        eprintln!("Usage: classify_pages <pages.json> [--output-dir DIR] [--config FILE] [--diagnostics] [--verbose]");
        std::process::exit(2);
    };

    let config = match &run.config {
        Some(path) => match ClassifierConfig::from_json_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            },
        },
        None => ClassifierConfig::default(),
    };
    let engine = match ClassificationEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Invalid classifier setup: {}", e);
            std::process::exit(1);
        },
    };

    let pages: Vec<PageInput> = match fs::read_to_string(&run.input)
        .map_err(instruction_oxide::Error::from)
        .and_then(|text| serde_json::from_str(&text).map_err(instruction_oxide::Error::from))
    {
        Ok(pages) => pages,
        Err(e) => {
            eprintln!("Failed to read {}: {}", run.input.display(), e);
            std::process::exit(1);
        },
    };

    if let Err(e) = fs::create_dir_all(&run.output_dir) {
        eprintln!("Failed to create output directory: {}", e);
        std::process::exit(1);
    }

    println!("Classifying {} pages from {}", pages.len(), run.input.display());
    let start_time = Instant::now();
    let report = engine.classify_document(&pages);

    let mut failed = 0;
    for outcome in &report.outcomes {
        match write_outcome(outcome, &run) {
            Ok(Some(bytes)) => {
                if run.verbose {
                    println!("  page {:4} ✓ ({} bytes)", outcome.page_index(), bytes);
                }
            },
            Ok(None) => {
                println!(
                    "  page {:4} skipped: {}",
                    outcome.page_index(),
                    outcome.skip_reason().unwrap_or("unknown")
                );
            },
            Err(e) => {
                println!("  page {:4} ✗ Error: {}", outcome.page_index(), e);
                failed += 1;
            },
        }
    }

    let elapsed = start_time.elapsed();

    println!("\n{}", "=".repeat(60));
    println!("CLASSIFICATION COMPLETE");
    println!("{}", "=".repeat(60));
    println!("Total pages:   {}", pages.len());
    println!("✓ Classified:  {}", report.classified());
    println!("- Skipped:     {}", report.skipped());
    println!("✗ Write errors: {}", failed);
    println!("Time:          {:.2}s", elapsed.as_secs_f64());
    println!("Output:        {}", run.output_dir.display());
    println!("{}", "=".repeat(60));

    if failed > 0 {
        std::process::exit(1);
    }
}
