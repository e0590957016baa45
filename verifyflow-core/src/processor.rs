use crate::cache::ProfileCache;
use crate::classifier::FormatClassifier;
use crate::config::Profile;
use crate::error::{CheckError, ExtractionError};
use crate::preprocessors::Preprocessor;
use crate::report::Report;
use crate::rules::RuleEngine;
use crate::storage::ProfileSource;
use crate::types::*;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

#[cfg(feature = "pdf-extract-backend")]
use crate::heuristics::NlpCapabilities;
#[cfg(feature = "pdf-extract-backend")]
use crate::preprocessors::{DocxPreprocessor, PdfPreprocessor};
#[cfg(feature = "pdf-extract-backend")]
use crate::storage::DirectoryProfileSource;
#[cfg(feature = "pdf-extract-backend")]
use std::path::PathBuf;

/// Simple profiler that collects timings for pipeline steps.
/// Output goes to stderr; stdout is left to the report.
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        eprintln!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        eprintln!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            eprintln!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        eprintln!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// Per-call switches for a check run
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Evaluate rules on the rayon pool
    pub parallel: bool,
    /// Print per-stage timings
    pub profile_steps: bool,
}

/// Facade over classification → extraction → rule evaluation → report
pub struct DocumentProcessor {
    docx: Box<dyn Preprocessor>,
    pdf: Box<dyn Preprocessor>,
    classifier: FormatClassifier,
    rule_engine: RuleEngine,
    profiles: ProfileCache,
}

impl DocumentProcessor {
    /// Create DocumentProcessor with full dependency injection
    pub fn new_with_dependencies(
        docx: Box<dyn Preprocessor>,
        pdf: Box<dyn Preprocessor>,
        rule_engine: RuleEngine,
        profiles: Box<dyn ProfileSource>,
    ) -> Self {
        Self {
            docx,
            pdf,
            classifier: FormatClassifier::new(),
            rule_engine,
            profiles: ProfileCache::new(profiles),
        }
    }

    /// Convenience constructor for CLI usage: pdf-extract backend, default
    /// NLP capabilities, profiles from the given directories then built-ins
    #[cfg(feature = "pdf-extract-backend")]
    pub fn new_cli(profile_dirs: Vec<PathBuf>) -> Self {
        Self::new_cli_with_nlp(profile_dirs, NlpCapabilities::default())
    }

    /// CLI constructor with caller-provided NER and morphology backends
    #[cfg(feature = "pdf-extract-backend")]
    pub fn new_cli_with_nlp(profile_dirs: Vec<PathBuf>, nlp: NlpCapabilities) -> Self {
        Self::new_with_dependencies(
            Box::new(DocxPreprocessor::new()),
            Box::new(PdfPreprocessor::new_with_pdf_extract()),
            RuleEngine::new(nlp),
            Box::new(DirectoryProfileSource::new(profile_dirs)),
        )
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rule_engine.rule_ids()
    }

    pub fn available_profiles(&self) -> Vec<String> {
        self.profiles.source().available()
    }

    fn preprocessor_for(&self, format: DocumentFormat) -> Result<&dyn Preprocessor, ExtractionError> {
        let preprocessor = match format {
            DocumentFormat::Docx => self.docx.as_ref(),
            DocumentFormat::Pdf => self.pdf.as_ref(),
        };
        if preprocessor.supports_format(format) {
            Ok(preprocessor)
        } else {
            Err(ExtractionError::UnsupportedFormat(format!(
                "{} cannot read {format}",
                preprocessor.name()
            )))
        }
    }

    /// Check a document against an already resolved profile
    pub fn check(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
        profile: &Profile,
        options: CheckOptions,
    ) -> Result<Report, CheckError> {
        let mut profiler = StepProfiler::new(options.profile_steps);
        let report = self.check_with_profiler(bytes, format, profile, options, &mut profiler)?;
        profiler.print_summary();
        Ok(report)
    }

    /// Check a document against a profile looked up by name
    pub fn check_named(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
        profile_name: &str,
        options: CheckOptions,
    ) -> Result<Report, CheckError> {
        let mut profiler = StepProfiler::new(options.profile_steps);
        let profile = profiler.time_step("1. Profile Lookup", || self.profiles.get(profile_name))?;
        let report = self.check_with_profiler(bytes, format, &profile, options, &mut profiler)?;
        profiler.print_summary();
        Ok(report)
    }

    /// Read a file, detect its format from the extension unless one is
    /// given, and check it against the named profile
    pub fn check_file(
        &self,
        path: &Path,
        format: Option<DocumentFormat>,
        profile_name: &str,
        options: CheckOptions,
    ) -> Result<Report, CheckError> {
        let bytes = std::fs::read(path).map_err(ExtractionError::from)?;
        let format = match format {
            Some(format) => format,
            None => self.classifier.classify(path, &bytes)?,
        };
        info!("📄 Checking {} as {}", path.display(), format);
        self.check_named(&bytes, format, profile_name, options)
    }

    fn check_with_profiler(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
        profile: &Profile,
        options: CheckOptions,
        profiler: &mut StepProfiler,
    ) -> Result<Report, CheckError> {
        let start_time = Instant::now();
        let preprocessor = self.preprocessor_for(format)?;

        let model = profiler.time_step("2. Extraction", || preprocessor.extract(bytes))?;
        info!(
            "Extracted {} chars, {} headings, {} tables via {}",
            model.text.chars().count(),
            model.headings.len(),
            model.tables.len(),
            preprocessor.name()
        );

        let issues = profiler.time_step("3. Rule Evaluation", || {
            if options.parallel {
                self.rule_engine.evaluate_parallel(&model, profile)
            } else {
                self.rule_engine.evaluate(&model, profile)
            }
        });
        info!("Rules produced {} issues with profile '{}'", issues.len(), profile.name);

        let report = profiler.time_step("4. Report Aggregation", || {
            Report::build(&model, &profile.name, issues)
        });
        info!(
            "Check finished in {:.0}ms: {} critical, {} warning, {} info",
            start_time.elapsed().as_millis(),
            report.summary.critical,
            report.summary.warning,
            report.summary.info
        );

        Ok(report)
    }
}
