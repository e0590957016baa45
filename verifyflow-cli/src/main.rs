use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

// Import from verifyflow-core
use verifyflow_core::{CheckError, CheckOptions, DocumentFormat, DocumentProcessor, Report};

// Import CLI utilities
use verifyflow_cli::resolve_search_dirs;

/// Exit code for extraction and profile failures
const EXIT_CHECK_FAILED: i32 = 2;

#[derive(Parser)]
#[command(name = "verifyflow")]
#[command(about = "Check a thesis document (DOCX/PDF) against a rule profile")]
struct Args {
    /// Path to the DOCX or PDF file to check
    #[arg(short, long, required_unless_present = "list_rules")]
    input: Option<PathBuf>,

    /// Profile name, looked up as <name>.yaml in the profile directories
    #[arg(short, long, default_value = verifyflow_core::DEFAULT_PROFILE)]
    profile: String,

    /// Directory to search for profiles (repeatable, earlier wins)
    #[arg(long = "profiles-dir", default_value = "profiles")]
    profiles_dir: Vec<PathBuf>,

    /// Document format; detected from the file extension when omitted
    #[arg(short, long, value_parser = parse_format)]
    format: Option<DocumentFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Evaluate rules in parallel
    #[arg(long)]
    parallel: bool,

    /// Print timings of each pipeline step
    #[arg(long)]
    profile_steps: bool,

    /// Show rule ids and available profiles, then exit
    #[arg(long)]
    list_rules: bool,
}

fn parse_format(value: &str) -> Result<DocumentFormat, String> {
    value.parse()
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ {e:#}");
            std::process::exit(EXIT_CHECK_FAILED);
        }
    }
}

fn run(args: &Args) -> Result<()> {
    eprintln!("🦀 VerifyFlow Thesis Checker");

    let search_dirs = resolve_search_dirs(&args.profiles_dir);
    for dir in &search_dirs {
        debug!("Profile search directory: {}", dir.display());
    }
    let processor = create_processor(search_dirs)?;

    if args.list_rules {
        show_rules(&processor);
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        anyhow::bail!("--input is required");
    };
    if !input.exists() {
        anyhow::bail!("input file not found: {}", input.display());
    }

    eprintln!("📄 Checking: {}", input.display());
    eprintln!("📋 Profile: {}", args.profile);

    let options = CheckOptions {
        parallel: args.parallel,
        profile_steps: args.profile_steps,
    };
    let report = processor
        .check_file(input, args.format, &args.profile, options)
        .map_err(|e| match e {
            CheckError::Extraction(_) => anyhow::Error::new(e).context("document could not be read"),
            CheckError::Profile(_) => anyhow::Error::new(e).context("profile could not be loaded"),
        })?;

    eprintln!(
        "✅ {} issues: {} critical, {} warning, {} info",
        report.summary.total, report.summary.critical, report.summary.warning, report.summary.info
    );

    save_report(&report, args.output.as_deref(), args.pretty)
}

/// Create DocumentProcessor with the pdf-extract backend
#[cfg(feature = "pdf-extract-backend")]
fn create_processor(search_dirs: Vec<PathBuf>) -> Result<DocumentProcessor> {
    Ok(DocumentProcessor::new_cli(search_dirs))
}

/// Fallback when no backend is compiled in
#[cfg(not(feature = "pdf-extract-backend"))]
fn create_processor(_search_dirs: Vec<PathBuf>) -> Result<DocumentProcessor> {
    Err(anyhow::anyhow!(
        "No PDF backend compiled in!\n\
         Compile with: --features pdf-extract-backend"
    ))
}

fn show_rules(processor: &DocumentProcessor) {
    println!("\n📋 Rules (evaluation order):");
    for id in processor.rule_ids() {
        println!("  {id}");
    }

    println!("\n📁 Available profiles:");
    for name in processor.available_profiles() {
        println!("  {name}");
    }

    println!("\n📝 Usage Examples:");
    println!("  verifyflow -i thesis.docx");
    println!("  verifyflow -i thesis.pdf -p vkr_ru --pretty -o report.json");
    println!("  verifyflow -i thesis.bin -f docx --profiles-dir ./profiles --parallel");
}

fn save_report(report: &Report, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = report.to_json(pretty)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!("💾 Report saved to: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
