use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unable to open file {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Unable to read metadata of {}: {source}", .path.display())]
    Metadata { path: PathBuf, source: io::Error },

    #[error("Tried to fetch page number out of bounds. {page_num} >= {max}")]
    PageOutOfBounds { page_num: usize, max: usize },

    #[error("Tried to flush null page {page_num}.")]
    FlushEmptyPage { page_num: usize },

    #[error("Tried to flush {byte_count} bytes of page {page_num}, more than a page holds")]
    FlushTooLarge { page_num: usize, byte_count: usize },

    #[error("Error seeking to page {page_num}: {source}")]
    Seek { page_num: usize, source: io::Error },

    #[error("Error reading page {page_num}: {source}")]
    Read { page_num: usize, source: io::Error },

    #[error("Error writing page {page_num}: {source}")]
    Write { page_num: usize, source: io::Error },

    #[error("Error closing db file: {0}")]
    Close(#[source] io::Error),

    #[error("Database file is {file_length} bytes, larger than the {max} bytes a table can hold")]
    FileTooLarge { file_length: u64, max: u64 },

    #[error("Cursor advanced past the end of the table at row {row_num}")]
    CursorExhausted { row_num: usize },
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Unrecognized keyword at start of '{0}'.")]
    UnrecognizedStatement(String),

    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("String is too long.")]
    StringTooLong,

    #[error("String must not contain a NUL byte.")]
    EmbeddedNul,

    #[error("Input is not valid UTF-8.")]
    InvalidUtf8,

    #[error("ID must be positive.")]
    NegativeId,
}

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("Error: Table full.")]
    TableFull,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
