pub mod errors;
pub mod page;
pub mod pagemgr;

pub use errors::{StorageError, StorageResult};
pub use page::{PAGE_SIZE, Page, PageId};
pub use pagemgr::{
    file::FilePageManager,
    manager::{FileHandle, FileId, PageManager, PageManagerHandle},
    memory::{InMemoryPageManager, IoStats},
};
