use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    let msg = err.to_string();
    for line in wrap(&msg, 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 59) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_space_hints(err);
        collector.collect_io_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_space_hints(&mut self, err: &Error) {
        use lipid_space::SpaceError;

        let Some(space_err) = err.downcast_ref::<SpaceError>() else {
            return;
        };

        self.mark_typed();

        match space_err {
            SpaceError::Io(_) => {}

            SpaceError::File { .. } => {
                self.add("Check that the path exists and is readable");
                self.add("Relative paths resolve against the current directory");
            }

            SpaceError::MissingArtifact(path) => {
                self.add(format!(
                    "'{}' is produced by an earlier stage",
                    path.display()
                ));
                self.add("Run preprocess, train, reduce, package in order");
                self.add("Or use 'lspace run' to execute the whole pipeline");
            }

            SpaceError::ConfigParse(_) => {
                self.add("The hyperparameter file has invalid TOML syntax");
                self.add("Check for missing quotes, brackets, or invalid values");
            }

            SpaceError::EmptyCorpus => {
                self.add("No record yielded a parseable shorthand name");
                self.add("Verify the SDF and TSV files are the expected exports");
                self.add("Run with RUST_LOG=warn to see per-record skip reasons");
            }

            SpaceError::TooFewVectors { needed, .. } => {
                self.add(format!("The projection needs at least {} records", needed));
                self.add("Check how many records survived preprocessing");
            }

            SpaceError::EmptyIntersection => {
                self.add("The artifact tables share no record keys");
                self.add("Re-run the earlier stages from one preprocess output");
            }
        }
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use lipid_space::io::Error as IoError;

        let Some(io_err) = err.downcast_ref::<IoError>() else {
            return;
        };

        self.mark_typed();

        match io_err {
            IoError::Io { source } => {
                self.collect_std_io_hints(source);
            }

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} in {} format",
                    line, format
                ));
                self.add("Inspect the file around that line for malformed entries");
            }

            IoError::Csv(_) => {
                self.add("A CSV artifact could not be read");
                self.add("The working directory may hold files from another run");
            }

            IoError::Zip(_) => {
                self.add("Archive writing failed");
                self.add("Check output path permissions and disk space");
            }

            IoError::MissingColumn { format, column } => {
                self.add(format!(
                    "The {} input lacks the required '{}' column",
                    format, column
                ));
                self.add("Verify the file is the expected database export");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::WriteZero => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space");
            }

            ErrorKind::UnexpectedEof => {
                self.add("Unexpected end of file encountered");
                self.add("The file may be truncated or incomplete");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            self.add("Ensure you have the required access rights");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    let mut text = String::new();

    text.push_str(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}
