use crate::progress::Bar;
use anyhow::{bail, Context, Result};
use html2md_batch::batch::{BatchConverter, BatchEvent, BatchOptions, BatchReport};
use html2md_batch::converter::ExternalTool;
use html2md_batch::envconfig::{EnvConfig, DEST_VAR, SOURCE_VAR};
use html2md_batch::format::{human_bytes, human_duration, plural};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const EXIT_OK: i32 = 0;
pub const EXIT_PARTIAL_FAILURE: i32 = 3;

#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub tool: Option<String>,
    pub jobs: Option<usize>,
    pub dry_run: bool,
    pub strict: bool,
    pub json: bool,
    pub quiet: bool,
}

/// Runs one batch and returns the process exit code.
pub fn convert(args: ConvertArgs) -> Result<i32> {
    convert_with_env(args, EnvConfig::from_env())
}

/// Same as [`convert`], with the `HTML2MD_*` settings supplied by the caller.
pub fn convert_with_env(args: ConvertArgs, env: EnvConfig) -> Result<i32> {
    let ConvertArgs {
        source,
        destination,
        tool,
        jobs,
        dry_run,
        strict,
        json,
        quiet,
    } = args;

    let config = env.merge(source, destination, tool, jobs);
    let Some(source) = config.source else {
        bail!("no source directory given; pass SOURCE or set {}", SOURCE_VAR);
    };
    let Some(destination) = config.destination else {
        bail!("no destination directory given; pass DESTINATION or set {}", DEST_VAR);
    };

    let batch = BatchConverter::with_options(
        ExternalTool::new(config.tool),
        BatchOptions {
            jobs: config.jobs,
            dry_run,
        },
    );

    let bar = Bar::new("Converting", 0, quiet || json || dry_run);
    let started = Instant::now();

    let report = batch.run_with_progress(&source, &destination, |event| match event {
        BatchEvent::Started { total } => bar.set_length(*total as u64),
        BatchEvent::Planned(candidate) => {
            if !json {
                println!("{} -> {}", candidate.source.display(), candidate.destination.display());
            }
        }
        BatchEvent::Converted(_) => bar.inc(),
        BatchEvent::Failed(failure) => {
            bar.println(format!("Failed to convert {}: {}", failure.file_name, failure.error));
            bar.inc();
        }
    });
    bar.finish();
    let report = report?;

    if json {
        let out = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{}", out);
    } else if !quiet {
        println!("{}", summary_line(&report, &destination, started.elapsed(), dry_run));
    }

    Ok(exit_code(&report, strict))
}

pub fn summary_line(report: &BatchReport, destination: &Path, elapsed: Duration, dry_run: bool) -> String {
    if dry_run {
        return format!(
            "Would convert {} into {}",
            plural(report.planned.len(), "file", "files"),
            destination.display()
        );
    }

    let mut line = format!(
        "Converted {} of {} ({}) into {} in {}",
        report.converted.len(),
        plural(report.candidates(), "file", "files"),
        human_bytes(report.bytes_written()),
        destination.display(),
        human_duration(elapsed)
    );
    if !report.failed.is_empty() {
        line.push_str(&format!("; {}", plural(report.failed.len(), "failure", "failures")));
    }
    line
}

pub fn exit_code(report: &BatchReport, strict: bool) -> i32 {
    if strict && !report.is_success() {
        EXIT_PARTIAL_FAILURE
    } else {
        EXIT_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html2md_batch::batch::{Candidate, Converted, Failure};
    use std::fs;
    use tempfile::TempDir;

    fn no_env() -> EnvConfig {
        EnvConfig::from_lookup(|_| None)
    }

    fn args(source: Option<&Path>, destination: Option<&Path>) -> ConvertArgs {
        ConvertArgs {
            source: source.map(Path::to_path_buf),
            destination: destination.map(Path::to_path_buf),
            tool: Some("cat".to_string()),
            jobs: None,
            dry_run: false,
            strict: false,
            json: false,
            quiet: true,
        }
    }

    fn report_with(converted: usize, failed: usize) -> BatchReport {
        BatchReport {
            converted: (0..converted)
                .map(|i| Converted {
                    file_name: format!("{}.html", i),
                    source: PathBuf::from(format!("src/{}.html", i)),
                    destination: PathBuf::from(format!("out/{}.md", i)),
                    bytes: 512,
                })
                .collect(),
            failed: (0..failed)
                .map(|i| Failure {
                    file_name: format!("bad{}.html", i),
                    source: PathBuf::from(format!("src/bad{}.html", i)),
                    error: "exit status: 1".to_string(),
                })
                .collect(),
            planned: Vec::new(),
            ignored: 0,
        }
    }

    #[test]
    fn summary_for_clean_run() {
        let line = summary_line(&report_with(2, 0), Path::new("out"), Duration::from_millis(7), false);
        assert_eq!(line, "Converted 2 of 2 files (1.0K) into out in 7ms");
    }

    #[test]
    fn summary_counts_failures() {
        let line = summary_line(&report_with(1, 1), Path::new("out"), Duration::from_millis(7), false);
        assert_eq!(line, "Converted 1 of 2 files (512B) into out in 7ms; 1 failure");
    }

    #[test]
    fn summary_for_dry_run() {
        let mut report = BatchReport::default();
        report.planned.push(Candidate {
            file_name: "a.html".to_string(),
            source: PathBuf::from("src/a.html"),
            destination: PathBuf::from("out/a.md"),
        });
        let line = summary_line(&report, Path::new("out"), Duration::ZERO, true);
        assert_eq!(line, "Would convert 1 file into out");
    }

    #[test]
    fn failures_only_change_exit_code_in_strict_mode() {
        let partial = report_with(1, 1);
        assert_eq!(exit_code(&partial, false), EXIT_OK);
        assert_eq!(exit_code(&partial, true), EXIT_PARTIAL_FAILURE);
        assert_eq!(exit_code(&report_with(3, 0), true), EXIT_OK);
    }

    #[test]
    fn missing_source_is_an_error() {
        let out = TempDir::new().unwrap();
        let err = convert_with_env(args(None, Some(out.path())), no_env()).unwrap_err();
        assert!(err.to_string().contains(SOURCE_VAR));
    }

    #[test]
    fn missing_destination_is_an_error() {
        let src = TempDir::new().unwrap();
        let err = convert_with_env(args(Some(src.path()), None), no_env()).unwrap_err();
        assert!(err.to_string().contains(DEST_VAR));
    }

    #[test]
    fn environment_fills_in_directories() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let (s, d) = (src.path().to_path_buf(), out.path().to_path_buf());
        let env = EnvConfig::from_lookup(move |key: &str| match key {
            SOURCE_VAR => Some(s.display().to_string()),
            DEST_VAR => Some(d.display().to_string()),
            _ => None,
        });
        assert_eq!(convert_with_env(args(None, None), env).unwrap(), EXIT_OK);
    }

    #[test]
    fn missing_source_directory_is_an_error() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("nope");
        let out = root.path().join("md");
        let err = convert_with_env(args(Some(&missing), Some(&out)), no_env()).unwrap_err();
        assert!(err.to_string().contains("cannot read source directory"));
    }

    #[cfg(unix)]
    mod with_cat {
        use super::*;

        fn source_with_broken_file() -> TempDir {
            let src = TempDir::new().unwrap();
            fs::write(src.path().join("a.html"), "<p>a</p>").unwrap();
            std::os::unix::fs::symlink(src.path().join("gone.html"), src.path().join("b.html")).unwrap();
            src
        }

        #[test]
        fn partial_failure_exits_zero_by_default() {
            let src = source_with_broken_file();
            let out = TempDir::new().unwrap();
            let code = convert_with_env(args(Some(src.path()), Some(out.path())), no_env()).unwrap();
            assert_eq!(code, EXIT_OK);
            assert_eq!(fs::read_to_string(out.path().join("a.md")).unwrap(), "<p>a</p>");
            assert!(!out.path().join("b.md").exists());
        }

        #[test]
        fn strict_partial_failure_exits_three() {
            let src = source_with_broken_file();
            let out = TempDir::new().unwrap();
            let mut strict = args(Some(src.path()), Some(out.path()));
            strict.strict = true;
            assert_eq!(convert_with_env(strict, no_env()).unwrap(), EXIT_PARTIAL_FAILURE);
        }

        #[test]
        fn json_report_run_converts_files() {
            let src = source_with_broken_file();
            let out = TempDir::new().unwrap();
            let mut json = args(Some(src.path()), Some(out.path()));
            json.json = true;
            json.quiet = false;
            assert_eq!(convert_with_env(json, no_env()).unwrap(), EXIT_OK);
            assert!(out.path().join("a.md").exists());
        }

        #[test]
        fn dry_run_writes_nothing() {
            let src = source_with_broken_file();
            let root = TempDir::new().unwrap();
            let out = root.path().join("md");
            let mut dry = args(Some(src.path()), Some(&out));
            dry.dry_run = true;
            dry.strict = true;
            assert_eq!(convert_with_env(dry, no_env()).unwrap(), EXIT_OK);
            assert!(out.is_dir());
            assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
        }

        #[test]
        fn unknown_tool_is_an_error() {
            let src = source_with_broken_file();
            let out = TempDir::new().unwrap();
            let mut missing = args(Some(src.path()), Some(out.path()));
            missing.tool = Some("html2md-batch-missing-tool".to_string());
            let err = convert_with_env(missing, no_env()).unwrap_err();
            assert!(err.to_string().contains("html2md-batch-missing-tool"));
        }
    }
}
