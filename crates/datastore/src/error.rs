use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Data file '{0}' contains no rows")]
    Empty(String),

    #[error("Data file '{file}' has no '{column}' column")]
    MissingColumn { file: String, column: String },
}
