use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::providers::{self, Provider};
use crate::translation::{
    BatchOptions, BatchTranslator, DocumentAnalysis, DocumentSettings, analyze, translate_document,
};

// @module: Application controller for subtitle translation runs

/// What happened to one input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Translations written to these paths, one per target language
    Written(Vec<PathBuf>),
    /// Nothing to translate
    Skipped,
    /// Dry run: the file was analyzed only
    DryRun(DocumentAnalysis),
}

/// Per-run file counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &Result<FileOutcome>) {
        self.processed += 1;
        match outcome {
            Ok(FileOutcome::Skipped) => self.skipped += 1,
            Ok(_) => self.successful += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// One-line summary for the end of a run
    pub fn summary(&self) -> String {
        format!(
            "{} processed, {} successful, {} skipped, {} failed",
            self.processed, self.successful, self.skipped, self.failed
        )
    }
}

/// Main application controller for subtitle translation
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translator shared by every file of the run, so its cache is too
    translator: BatchTranslator,
    // @field: Draw progress bars
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller using the configured translation service
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let provider = providers::create_provider(&config)
            .with_context(|| format!("Failed to set up {}", config.translation_method.display_name()))?;
        Ok(Self::with_provider(config, provider))
    }

    // @method: Create a controller around an existing provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        let translator = BatchTranslator::new(provider, BatchOptions::from_config(&config));
        Self {
            config,
            translator,
            show_progress: true,
        }
    }

    /// Disable progress bars (tests, piped output)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn translator(&self) -> &BatchTranslator {
        &self.translator
    }

    /// Translate a file, or every subtitle file under a directory
    pub async fn run(&self, input: &Path, output_dir: &Path, dry_run: bool) -> Result<RunStats> {
        if FileManager::dir_exists(input) {
            return self.run_folder(input, output_dir, dry_run).await;
        }
        if !FileManager::file_exists(input) {
            return Err(anyhow!("Input does not exist: {:?}", input));
        }

        let start_time = Instant::now();
        let multi_progress = self.multi_progress();
        let outcome = self
            .translate_file_with_progress(input, output_dir, dry_run, &multi_progress)
            .await;
        Self::report(input, &outcome);

        let mut stats = RunStats::default();
        stats.record(&outcome);
        info!("Done in {}: {}", Self::format_duration(start_time.elapsed()), stats.summary());
        Ok(stats)
    }

    /// Process every subtitle file under a directory; one file failing does
    /// not stop the others
    pub async fn run_folder(&self, input_dir: &Path, output_dir: &Path, dry_run: bool) -> Result<RunStats> {
        let start_time = Instant::now();
        let files = FileManager::find_subtitle_files(input_dir)?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }
        info!("Found {} subtitle files in {}", files.len(), input_dir.display());

        let multi_progress = self.multi_progress();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_pb.set_style(Self::bar_style("files"));
        folder_pb.set_message("Processing files");

        let mut stats = RunStats::default();
        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let outcome = self
                .translate_file_with_progress(file, output_dir, dry_run, &multi_progress)
                .await;
            Self::report(file, &outcome);
            stats.record(&outcome);

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed in {}: {}",
            Self::format_duration(start_time.elapsed()),
            stats.summary()
        );
        Ok(stats)
    }

    /// Translate one file into every target language, writing
    /// `{stem}_{lang}.{ext}` into `output_dir` for each
    pub async fn translate_file(&self, input: &Path, output_dir: &Path, dry_run: bool) -> Result<FileOutcome> {
        let multi_progress = self.multi_progress();
        self.translate_file_with_progress(input, output_dir, dry_run, &multi_progress)
            .await
    }

    async fn translate_file_with_progress(
        &self,
        input: &Path,
        output_dir: &Path,
        dry_run: bool,
        multi_progress: &MultiProgress,
    ) -> Result<FileOutcome> {
        let content = FileManager::read_to_string(input)?;

        if dry_run {
            let analysis = analyze(&content).with_context(|| format!("Failed to analyze {:?}", input))?;
            info!(
                "{}: {} with {} translatable lines ({} lines total)",
                input.display(),
                analysis.format,
                analysis.entries,
                analysis.line_count
            );
            return Ok(FileOutcome::DryRun(analysis));
        }

        let targets = self.config.target_languages();
        let mut written = Vec::with_capacity(targets.len());
        let mut failures: Vec<(String, anyhow::Error)> = Vec::new();

        for (position, target) in targets.iter().enumerate() {
            if position > 0 && !self.config.language_delay().is_zero() {
                sleep(self.config.language_delay()).await;
            }

            match self
                .translate_into(input, &content, target, output_dir, multi_progress)
                .await
            {
                Ok(Some(path)) => written.push(path),
                Ok(None) => {
                    warn!("Skipping {:?}: no translatable text", input);
                    return Ok(FileOutcome::Skipped);
                }
                Err(e) => {
                    if targets.len() > 1 {
                        error!("{} -> {} failed: {:#}", input.display(), target, e);
                    }
                    failures.push((target.clone(), e));
                }
            }
        }

        let failed = failures.len();
        match failures.into_iter().next() {
            None => Ok(FileOutcome::Written(written)),
            Some((_, e)) if targets.len() == 1 => Err(e),
            Some((target, e)) => Err(e.context(format!(
                "{} of {} target languages failed for {:?} (first: {})",
                failed,
                targets.len(),
                input,
                target
            ))),
        }
    }

    /// Translate into one language; `None` when the document has no text
    async fn translate_into(
        &self,
        input: &Path,
        content: &str,
        target: &str,
        output_dir: &Path,
        multi_progress: &MultiProgress,
    ) -> Result<Option<PathBuf>> {
        let progress_bar = multi_progress.add(ProgressBar::new(0));
        progress_bar.set_style(Self::bar_style("lines"));
        progress_bar.set_message(format!("Translating to {}", target));
        let pb = progress_bar.clone();

        let settings = DocumentSettings {
            target_language: target.to_string(),
            ..DocumentSettings::from_config(&self.config)
        };
        let result = translate_document(&self.translator, content, &settings, move |completed, total| {
            pb.set_length(total as u64);
            pb.set_position(completed as u64);
        })
        .await;
        progress_bar.finish_and_clear();

        let document = match result {
            Ok(document) => document,
            Err(e) if e.is_empty_document() => return Ok(None),
            Err(e) => return Err(Self::file_error(input, e)),
        };

        let output_path = FileManager::generate_output_path(input, output_dir, target, document.format.extension());
        FileManager::write_to_file(&output_path, &document.content)?;

        info!(
            "{} -> {} ({} lines, {} to {})",
            input.display(),
            output_path.display(),
            document.entries,
            document.source_format,
            document.format
        );
        Ok(Some(output_path))
    }

    fn file_error(input: &Path, error: TranslationError) -> anyhow::Error {
        anyhow::Error::new(error).context(format!("Failed to translate {:?}", input))
    }

    fn report(input: &Path, outcome: &Result<FileOutcome>) {
        if let Err(e) = outcome {
            error!("Error processing file {}: {:#}", input.display(), e);
        }
    }

    fn multi_progress(&self) -> MultiProgress {
        if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        }
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
