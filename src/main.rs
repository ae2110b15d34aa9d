// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use subtitle_translator::app_config::{self, Config, OutputFormat, TranslationMethod};
use subtitle_translator::app_controller::Controller;
use subtitle_translator::file_utils::FileManager;
use subtitle_translator::subtitle::BilingualPosition;
use subtitle_translator::translation::analyze;

const DEFAULT_CONFIG_PATH: &str = "conf.json";

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for BilingualPosition to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPosition {
    Above,
    Below,
}

impl From<CliPosition> for BilingualPosition {
    fn from(position: CliPosition) -> Self {
        match position {
            CliPosition::Above => BilingualPosition::Above,
            CliPosition::Below => BilingualPosition::Below,
        }
    }
}

/// CLI Wrapper for OutputFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOutputFormat {
    Auto,
    Srt,
    Vtt,
    Ass,
    Lrc,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Auto => OutputFormat::Auto,
            CliOutputFormat::Srt => OutputFormat::Srt,
            CliOutputFormat::Vtt => OutputFormat::Vtt,
            CliOutputFormat::Ass => OutputFormat::Ass,
            CliOutputFormat::Lrc => OutputFormat::Lrc,
        }
    }
}

fn parse_method(value: &str) -> Result<TranslationMethod> {
    value.parse()
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a subtitle file or every subtitle file in a directory
    Translate(TranslateArgs),

    /// Detect the format of a subtitle file
    Detect {
        /// Subtitle file to inspect
        file: PathBuf,

        /// Also show line and entry counts
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the supported translation methods
    ListMethods,

    /// Write a configuration template
    Config {
        /// Where to write the template
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        output: PathBuf,

        /// Translation method to preselect
        #[arg(long, value_parser = parse_method)]
        method: Option<TranslationMethod>,

        /// Target language to preselect
        #[arg(long)]
        target: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language code (e.g., 'en', 'fr', 'zh-hant'); repeat for several languages
    #[arg(short, long)]
    target: Vec<String>,

    /// Source language code, or 'auto'
    #[arg(short, long)]
    source: Option<String>,

    /// Translation method (gtxFreeAPI, google, deepl, azure, deeplx, openai, ...)
    #[arg(short, long, value_parser = parse_method)]
    method: Option<TranslationMethod>,

    /// API key for the translation method (falls back to the method's environment variable)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Keep the original text next to the translation
    #[arg(short, long)]
    bilingual: bool,

    /// Where the original text goes in bilingual output
    #[arg(long, value_enum)]
    position: Option<CliPosition>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<CliOutputFormat>,

    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Analyze the input without translating
    #[arg(long)]
    dry_run: bool,

    /// Concurrent requests per batch (1-10)
    #[arg(long)]
    parallel: Option<usize>,

    /// Delay between batches in milliseconds
    #[arg(long)]
    delay: Option<u64>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Subtitle Translator
///
/// Translates SRT, WebVTT, ASS/SSA and LRC subtitles while keeping their
/// structure, with optional bilingual output.
#[derive(Parser, Debug)]
#[command(name = "subtitle-translator")]
#[command(version)]
#[command(about = "Structure-preserving subtitle translation tool")]
#[command(long_about = "Translates subtitle files (SRT, WebVTT, ASS/SSA, LRC) with machine translation services while keeping timings and markup intact.

EXAMPLES:
    subtitle-translator translate movie.srt -t fr                 # Translate to French with the free GTX API
    subtitle-translator translate movie.srt -t de -m deepl -k KEY # Use DeepL
    subtitle-translator translate movie.srt -t ja -b              # Bilingual output (ASS)
    subtitle-translator translate movie.srt -t fr -t de -t ja     # One output file per language
    subtitle-translator translate ./subs -t es --format vtt       # Whole directory, WebVTT output
    subtitle-translator detect movie.ass -v                       # Show the detected format
    subtitle-translator config -o conf.json --method openai       # Write a configuration template
    subtitle-translator completions bash > subtitle-translator.bash

CONFIGURATION:
    Settings are read from conf.json by default (see the `config` subcommand).
    API keys may also come from environment variables such as OPENAI_API_KEY
    or DEEPL_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and label for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set with set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Translate(args) => run_translate(args).await,
        Commands::Detect { file, verbose } => run_detect(&file, verbose),
        Commands::ListMethods => {
            list_methods();
            Ok(())
        }
        Commands::Config { output, method, target } => write_config_template(&output, method, target),
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtitle-translator", &mut std::io::stdout());
            Ok(())
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = if options.config.exists() {
        Config::load_from_file(&options.config)?
    } else {
        info!("Config file {:?} not found, using defaults", options.config);
        Config::default()
    };

    apply_overrides(&mut config, &options);
    if config.apply_env_api_key() {
        info!("Using API key from {}", config.translation_method.api_key_env_var().unwrap_or_default());
    }

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.validate().context("Configuration validation failed")?;

    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));

    info!(
        "{} -> {} with {}",
        config.source_language,
        config.target_languages().join(", "),
        config.translation_method.display_name()
    );

    let controller = Controller::with_config(config)?;
    let stats = controller.run(&options.input_path, &output_dir, options.dry_run).await?;

    if stats.failed > 0 {
        return Err(anyhow!("{} of {} files failed", stats.failed, stats.processed));
    }
    Ok(())
}

// @modifies: Config fields given on the command line
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(method) = options.method {
        config.translation_method = method;
    }
    if let Some(key) = &options.api_key {
        let method = config.translation_method;
        config.provider_config_mut(method).api_key = key.clone();
    }
    if let Some(source) = &options.source {
        config.source_language = source.clone();
    }
    match options.target.as_slice() {
        [] => {}
        [target] => {
            config.target_language = target.clone();
            config.target_languages.clear();
        }
        [first, ..] => {
            config.target_language = first.clone();
            config.target_languages = options.target.clone();
        }
    }
    if options.bilingual {
        config.bilingual_subtitle = true;
    }
    if let Some(position) = &options.position {
        config.bilingual_position = position.clone().into();
    }
    if let Some(format) = &options.format {
        config.output_format = format.clone().into();
    }
    if let Some(parallel) = options.parallel {
        config.parallelism = parallel;
    }
    if let Some(delay) = options.delay {
        config.inter_batch_delay = delay;
    }
    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    }
}

fn run_detect(file: &Path, verbose: bool) -> Result<()> {
    let content = FileManager::read_to_string(file)?;
    let analysis = analyze(&content).with_context(|| format!("Failed to detect format of {:?}", file))?;

    println!("{}", analysis.format);
    if verbose {
        println!("lines: {}", analysis.line_count);
        println!("translatable lines: {}", analysis.entries);
        if let Some(offset) = analysis.field_offset {
            println!("ass text field offset: {}", offset);
        }
        println!(
            "size: {}",
            FileManager::format_file_size(content.len() as u64)
        );
    }
    Ok(())
}

fn list_methods() {
    println!("{:<14} {:<18} {:<22} {}", "METHOD", "NAME", "API KEY", "URL");
    for method in TranslationMethod::ALL {
        let key = match (method.requires_api_key(), method.api_key_env_var()) {
            (true, Some(var)) => var,
            _ => "-",
        };
        let url = if method.requires_url() { "required" } else { "optional" };
        println!("{:<14} {:<18} {:<22} {}", method.id(), method.display_name(), key, url);
    }
}

fn write_config_template(output: &Path, method: Option<TranslationMethod>, target: Option<String>) -> Result<()> {
    if output.exists() {
        return Err(anyhow!("Refusing to overwrite existing file: {:?}", output));
    }

    let mut config = Config::default();
    if let Some(method) = method {
        config.translation_method = method;
    }
    if let Some(target) = target {
        config.target_language = target;
    }

    config.save_to_file(output)?;
    info!("Configuration template written to {}", output.display());
    Ok(())
}
