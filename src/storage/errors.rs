use std::fmt;

#[derive(Debug)]
pub enum StorageError {
    PageNotFound { file: String, page_id: u64 },

    Io { file: String, message: String },

    LockPoisoned { file: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn io(file: &str, err: std::io::Error) -> Self {
        StorageError::Io {
            file: file.to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::PageNotFound { file, page_id } => {
                write!(f, "storage error: page {} not found in '{}'", page_id, file)
            }

            StorageError::Io { file, message } => {
                write!(f, "storage IO error on '{}': {}", file, message)
            }

            StorageError::LockPoisoned { file } => {
                write!(f, "storage error: page file '{}' lock poisoned", file)
            }
        }
    }
}

impl std::error::Error for StorageError {}
