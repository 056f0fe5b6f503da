use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("CSV processing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("archive operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("missing required {format} column '{column}'")]
    MissingColumn { format: Format, column: String },
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }

    pub fn missing_column(format: Format, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            format,
            column: column.into(),
        }
    }
}
