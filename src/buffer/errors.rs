use std::fmt;

use crate::storage::errors::StorageError;

#[derive(Debug)]
pub enum BufferError {
    /// Every frame stayed pinned through the bounded clock sweep.
    PoolExhausted { capacity: usize },

    PageNotPinned {
        file: String,
        page_id: u64,
        frame_id: usize,
    },

    PagePinned {
        file: String,
        page_id: u64,
        frame_id: usize,
    },

    /// A frame names an owner but is not valid. Indicates corruption of the
    /// frame table, not a caller mistake.
    InvalidFrameState {
        frame_id: usize,
        valid: bool,
        dirty: bool,
        ref_bit: bool,
    },

    Storage(StorageError),
}

pub type BufferResult<T> = Result<T, BufferError>;

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::PoolExhausted { capacity } => {
                write!(
                    f,
                    "buffer error: all {} frames are pinned, no frame can be freed",
                    capacity
                )
            }

            BufferError::PageNotPinned {
                file,
                page_id,
                frame_id,
            } => {
                write!(
                    f,
                    "buffer error: page {} of '{}' in frame {} is not pinned",
                    page_id, file, frame_id
                )
            }

            BufferError::PagePinned {
                file,
                page_id,
                frame_id,
            } => {
                write!(
                    f,
                    "buffer error: page {} of '{}' in frame {} is still pinned",
                    page_id, file, frame_id
                )
            }

            BufferError::InvalidFrameState {
                frame_id,
                valid,
                dirty,
                ref_bit,
            } => {
                write!(
                    f,
                    "buffer error: bad frame {} (valid={}, dirty={}, ref_bit={})",
                    frame_id, valid, dirty, ref_bit
                )
            }

            BufferError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufferError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for BufferError {
    fn from(e: StorageError) -> Self {
        BufferError::Storage(e)
    }
}
