use crate::error::ConversionError;
use std::io;
use std::path::Path;
use std::process::Command;

pub const DEFAULT_TOOL: &str = "html2text";

/// Turns one HTML file into Markdown text.
///
/// The batch only ever calls `convert` with the full path of a candidate and
/// writes whatever comes back. Implementations must be shareable across worker
/// threads when the batch runs with more than one job.
pub trait Converter: Send + Sync {
    fn convert(&self, input: &Path) -> Result<String, ConversionError>;

    fn name(&self) -> &str {
        "converter"
    }
}

impl<F> Converter for F
where
    F: Fn(&Path) -> Result<String, ConversionError> + Send + Sync,
{
    fn convert(&self, input: &Path) -> Result<String, ConversionError> {
        self(input)
    }
}

/// Runs `<program> <input>` and takes its stdout as the converted text.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: String,
}

impl ExternalTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExternalTool {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl Converter for ExternalTool {
    fn convert(&self, input: &Path) -> Result<String, ConversionError> {
        tracing::debug!(tool = %self.program, input = %input.display(), "running converter");

        let output = Command::new(&self.program)
            .arg(input)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ConversionError::ToolNotFound {
                    tool: self.program.clone(),
                },
                _ => ConversionError::Spawn {
                    tool: self.program.clone(),
                    source: e,
                },
            })?;

        if !output.status.success() {
            return Err(ConversionError::Failed {
                tool: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ConversionError::InvalidUtf8 {
            tool: self.program.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.program
    }
}
