/*!
 * Output rendering through an external document converter.
 *
 * Rendering is behind the `Renderer` trait so the pipeline can be exercised without
 * pandoc installed. `PandocRenderer` spawns the binary with tokio and surfaces its
 * standard error when it fails.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::errors::RenderError;

/// Output format for rendered documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Pdf,
    Html,
}

impl OutputFormat {
    /// Every supported format, in batch order
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Pdf, OutputFormat::Html];

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "html" => Ok(Self::Html),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Turns a markdown file into a rendered artifact
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `input` into `output` using `format`
    async fn render(&self, input: &Path, output: &Path, format: OutputFormat) -> Result<(), RenderError>;
}

/// Renderer backed by the `pandoc` binary
#[derive(Debug, Clone)]
pub struct PandocRenderer {
    /// Binary to invoke
    command: String,
    /// LaTeX template used for PDF output
    template: PathBuf,
}

impl PandocRenderer {
    /// Create a renderer that calls `pandoc` with the given PDF template
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            command: "pandoc".to_string(),
            template: template.into(),
        }
    }

    /// Use a different binary, e.g. a wrapper script
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Command-line arguments for one conversion
    pub fn args(&self, input: &Path, output: &Path, format: OutputFormat) -> Vec<String> {
        let mut args: Vec<String> = vec!["-f".into(), "markdown+smart".into(), "--toc".into(), "-N".into()];
        match format {
            OutputFormat::Pdf => {
                args.push("--template".into());
                args.push(self.template.display().to_string());
            }
            OutputFormat::Html => args.push("-s".into()),
        }
        args.push("-o".into());
        args.push(output.display().to_string());
        args.push(input.display().to_string());
        args
    }
}

#[async_trait]
impl Renderer for PandocRenderer {
    async fn render(&self, input: &Path, output: &Path, format: OutputFormat) -> Result<(), RenderError> {
        let args = self.args(input, output, format);
        debug!("{} {}", self.command, args.join(" "));

        let result = Command::new(&self.command)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| RenderError::ToolUnavailable {
                tool: self.command.clone(),
                message: e.to_string(),
            })?;

        if !result.status.success() {
            return Err(RenderError::Failed {
                tool: self.command.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
