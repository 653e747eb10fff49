//! Directory-to-directory batch conversion.
//!
//! A batch lists the immediate entries of a source directory, keeps the ones
//! named `*.html`, hands each to a [`Converter`] and writes the returned text
//! to `<stem>.md` in the destination directory. A file that fails to convert
//! is reported and skipped; only setup errors and a missing converter stop
//! the batch.

use crate::converter::{Converter, ExternalTool};
use crate::error::{BatchError, ConversionError};
use rayon::prelude::*;
use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

pub const SOURCE_EXTENSION: &str = ".html";
pub const TARGET_EXTENSION: &str = ".md";

/// Maps `page.html` to `page.md`. Names without the exact, case-sensitive
/// `.html` suffix are not candidates and yield `None`.
pub fn output_name(file_name: &str) -> Option<String> {
    file_name
        .strip_suffix(SOURCE_EXTENSION)
        .map(|stem| format!("{}{}", stem, TARGET_EXTENSION))
}

/// [`output_name`] on a raw directory entry name. Names that are not valid
/// UTF-8 still qualify when their bytes end in `.html`; the stem bytes are
/// carried over unchanged.
pub fn output_os_name(file_name: &OsStr) -> Option<OsString> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let stem = file_name.as_bytes().strip_suffix(SOURCE_EXTENSION.as_bytes())?;
        let mut name = stem.to_vec();
        name.extend_from_slice(TARGET_EXTENSION.as_bytes());
        Some(OsString::from_vec(name))
    }
    #[cfg(windows)]
    {
        use std::os::windows::ffi::{OsStrExt, OsStringExt};

        let wide: Vec<u16> = file_name.encode_wide().collect();
        let suffix: Vec<u16> = SOURCE_EXTENSION.encode_utf16().collect();
        let stem = wide.strip_suffix(suffix.as_slice())?;
        let mut name = stem.to_vec();
        name.extend(TARGET_EXTENSION.encode_utf16());
        Some(OsString::from_wide(&name))
    }
    #[cfg(not(any(unix, windows)))]
    {
        file_name.to_str().and_then(output_name).map(OsString::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub file_name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Converted {
    pub file_name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub file_name: String,
    pub source: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub converted: Vec<Converted>,
    pub failed: Vec<Failure>,
    /// Filled instead of `converted`/`failed` on a dry run.
    pub planned: Vec<Candidate>,
    /// Source entries that were not candidates.
    pub ignored: usize,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn bytes_written(&self) -> u64 {
        self.converted.iter().map(|c| c.bytes).sum()
    }

    pub fn candidates(&self) -> usize {
        self.converted.len() + self.failed.len() + self.planned.len()
    }
}

#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started { total: usize },
    Planned(&'a Candidate),
    Converted(&'a Converted),
    Failed(&'a Failure),
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker threads; 1 keeps the batch fully sequential.
    pub jobs: usize,
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            dry_run: false,
        }
    }
}

enum Outcome {
    Converted(Converted),
    Failed(Failure),
}

pub struct BatchConverter<C: Converter> {
    converter: C,
    options: BatchOptions,
}

impl<C: Converter> BatchConverter<C> {
    pub fn new(converter: C) -> Self {
        Self {
            converter,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(converter: C, options: BatchOptions) -> Self {
        Self { converter, options }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.options.jobs = jobs.max(1);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    pub fn run(&self, source_dir: &Path, dest_dir: &Path) -> Result<BatchReport, BatchError> {
        self.run_with_progress(source_dir, dest_dir, |_| {})
    }

    /// Runs the batch, calling `on_event` as each candidate is planned,
    /// converted or fails. With several jobs the callback is invoked from
    /// worker threads in completion order; the returned report is always in
    /// candidate order.
    pub fn run_with_progress<F>(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        on_event: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: Fn(&BatchEvent) + Sync,
    {
        ensure_destination(dest_dir)?;
        let (candidates, ignored) = collect_candidates(source_dir, dest_dir)?;

        tracing::info!(
            source = %source_dir.display(),
            destination = %dest_dir.display(),
            candidates = candidates.len(),
            ignored,
            "starting batch"
        );
        on_event(&BatchEvent::Started {
            total: candidates.len(),
        });

        let mut report = BatchReport {
            ignored,
            ..BatchReport::default()
        };

        if self.options.dry_run {
            for candidate in &candidates {
                on_event(&BatchEvent::Planned(candidate));
            }
            report.planned = candidates;
            return Ok(report);
        }

        let outcomes = if self.options.jobs <= 1 {
            candidates
                .iter()
                .map(|c| self.convert_one(c, &on_event))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.jobs)
                .build()
                .map_err(|e| BatchError::WorkerPool {
                    message: e.to_string(),
                })?;
            pool.install(|| {
                candidates
                    .par_iter()
                    .map(|c| self.convert_one(c, &on_event))
                    .collect::<Result<Vec<_>, _>>()
            })?
        };

        for outcome in outcomes {
            match outcome {
                Outcome::Converted(c) => report.converted.push(c),
                Outcome::Failed(f) => report.failed.push(f),
            }
        }

        tracing::info!(
            converted = report.converted.len(),
            failed = report.failed.len(),
            bytes = report.bytes_written(),
            "batch finished"
        );
        Ok(report)
    }

    fn convert_one<F>(&self, candidate: &Candidate, on_event: &F) -> Result<Outcome, BatchError>
    where
        F: Fn(&BatchEvent) + Sync,
    {
        let result = self
            .converter
            .convert(&candidate.source)
            .and_then(|text| write_output(&candidate.destination, &text));

        match result {
            Ok(bytes) => {
                let converted = Converted {
                    file_name: candidate.file_name.clone(),
                    source: candidate.source.clone(),
                    destination: candidate.destination.clone(),
                    bytes,
                };
                tracing::info!(
                    converter = self.converter.name(),
                    file = %candidate.file_name,
                    destination = %candidate.destination.display(),
                    bytes,
                    "converted"
                );
                on_event(&BatchEvent::Converted(&converted));
                Ok(Outcome::Converted(converted))
            }
            Err(ConversionError::ToolNotFound { tool }) => Err(BatchError::ConverterNotFound { tool }),
            Err(e) => {
                let failure = Failure {
                    file_name: candidate.file_name.clone(),
                    source: candidate.source.clone(),
                    error: e.to_string(),
                };
                tracing::warn!(
                    converter = self.converter.name(),
                    file = %candidate.file_name,
                    error = %e,
                    "conversion failed"
                );
                on_event(&BatchEvent::Failed(&failure));
                Ok(Outcome::Failed(failure))
            }
        }
    }
}

/// Converts every `*.html` file in `source_dir` with the default external
/// tool, printing a notice for each file that fails.
pub fn convert(source_dir: &Path, dest_dir: &Path) -> Result<BatchReport, BatchError> {
    BatchConverter::new(ExternalTool::default()).run_with_progress(source_dir, dest_dir, |event| {
        if let BatchEvent::Failed(failure) = event {
            eprintln!("Failed to convert {}: {}", failure.file_name, failure.error);
        }
    })
}

pub fn ensure_destination(dest_dir: &Path) -> Result<(), BatchError> {
    fs::create_dir_all(dest_dir).map_err(|source| BatchError::CreateDestination {
        path: dest_dir.to_path_buf(),
        source,
    })
}

/// Lists the candidates of `source_dir`, sorted by file name, together with
/// the number of entries that were passed over.
pub fn collect_candidates(
    source_dir: &Path,
    dest_dir: &Path,
) -> Result<(Vec<Candidate>, usize), BatchError> {
    let access = |source: std::io::Error| BatchError::DirectoryAccess {
        path: source_dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    let mut ignored = 0;

    for entry in fs::read_dir(source_dir).map_err(access)? {
        let entry = entry.map_err(access)?;
        let os_name = entry.file_name();

        let Some(md_name) = output_os_name(&os_name) else {
            ignored += 1;
            continue;
        };
        let name = os_name.to_string_lossy().to_string();
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            tracing::debug!(entry = %name, "skipping directory");
            ignored += 1;
            continue;
        }

        candidates.push(Candidate {
            file_name: name,
            source: entry.path(),
            destination: dest_dir.join(md_name),
        });
    }

    candidates.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok((candidates, ignored))
}

fn write_output(path: &Path, text: &str) -> Result<u64, ConversionError> {
    fs::write(path, text.as_bytes()).map_err(|source| ConversionError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.len() as u64)
}
