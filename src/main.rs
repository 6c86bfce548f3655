// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};

use comply_i18n::app_config::{DEFAULT_CONFIG_FILE, LogLevel, ProjectConfig};
use comply_i18n::app_controller::Controller;
use comply_i18n::render::OutputFormat;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// Output formats accepted by `render-translated`
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Pdf,
    Html,
    All,
}

impl CliFormat {
    fn formats(self) -> Vec<OutputFormat> {
        match self {
            Self::Pdf => vec![OutputFormat::Pdf],
            Self::Html => vec![OutputFormat::Html],
            Self::All => OutputFormat::ALL.to_vec(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate policy/procedure/narrative templates
    #[command(name = "translate-templates", alias = "tt")]
    TranslateTemplates {
        /// Template file or directory; all template directories when omitted
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// LLM provider (openai, anthropic, ollama)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Render translated PDF/HTML documents for every configured language
    #[command(name = "render-translated")]
    RenderTranslated {
        /// Output format
        #[arg(short, long, value_enum, default_value = "all")]
        format: CliFormat,

        /// Output directory; `output_dir` from the configuration when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// LLM provider (openai, anthropic, ollama)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Generate shell completions for comply
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// comply - compliance documents, translated
///
/// Translates policy, procedure and narrative templates with an LLM provider while
/// keeping YAML metadata, tables and code blocks intact.
#[derive(Parser, Debug)]
#[command(name = "comply")]
#[command(version)]
#[command(about = "Structure-preserving translation of compliance documents")]
#[command(long_about = "Translates compliance templates and renders translated PDF/HTML documents.

EXAMPLES:
    comply translate-templates                    # Translate every template
    comply tt policies/access.md -p anthropic     # One file, provider override
    comply render-translated --format pdf         # Translated PDFs for every language
    comply completions bash > comply.bash         # Generate bash completions

ENVIRONMENT:
    OPENAI_API_KEY, ANTHROPIC_API_KEY             # Hosted provider credentials
    OLLAMA_URL (http://localhost:11434)           # Local provider endpoint
    OLLAMA_MODEL (llama3:8b)                      # Local provider default model")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    /// Create a logger with the specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    /// Install as the global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    /// ANSI colour for a log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "comply", &mut std::io::stdout());
        return Ok(());
    }

    let config = if cli.config.exists() {
        ProjectConfig::load(&cli.config)
            .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?
    } else {
        ProjectConfig::default()
    };

    if cli.log_level.is_none() {
        if let Some(level) = config.log_level {
            log::set_max_level(level.to_level_filter());
        }
    }

    let root = std::env::current_dir().context("Failed to determine the project directory")?;
    let controller = Controller::with_config(config, root).with_progress(true);

    match cli.command {
        Commands::TranslateTemplates { path, provider } => {
            let report = controller
                .translate_templates(path.as_deref(), provider.as_deref())
                .await
                .context("template translation failed")?;
            info!(
                "{} generated, {} up to date",
                report.generated.len(),
                report.skipped.len()
            );
        }
        Commands::RenderTranslated { format, output, provider } => {
            let summary = controller
                .render_translated(&format.formats(), output.as_deref(), provider.as_deref())
                .await
                .context("translated rendering failed")?;
            info!(
                "{} translated documents rendered, {} skipped",
                summary.rendered.len(),
                summary.skipped
            );
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
