//! Batch conversion of a directory of HTML files into Markdown.
//!
//! Each `*.html` file in a source directory is handed to an external
//! converter (by default `html2text <file>`) and its stdout is written to
//! `<stem>.md` in a destination directory.
//!
//! ```no_run
//! use html2md_batch::{BatchConverter, ExternalTool};
//! use std::path::Path;
//!
//! let report = BatchConverter::new(ExternalTool::new("html2text"))
//!     .run(Path::new("site"), Path::new("site_md"))?;
//! for failure in &report.failed {
//!     eprintln!("Failed to convert {}: {}", failure.file_name, failure.error);
//! }
//! # Ok::<(), html2md_batch::BatchError>(())
//! ```

pub mod batch;
pub mod converter;
pub mod envconfig;
pub mod error;
pub mod format;
pub mod logging;

pub use batch::{convert, output_name, BatchConverter, BatchEvent, BatchOptions, BatchReport};
pub use converter::{Converter, ExternalTool};
pub use envconfig::EnvConfig;
pub use error::{BatchError, ConversionError};
