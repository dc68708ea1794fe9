use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::storage::{
    errors::{StorageError, StorageResult},
    page::{Page, PageId},
};

/// Durable page file. Implementations own layout and free-space handling;
/// the buffer manager only moves whole pages in and out.
pub trait PageManager: Send {
    /// Fills `page` with the stored image of `id` and labels it with `id`.
    fn read_page(&mut self, id: PageId, page: &mut Page) -> StorageResult<()>;

    fn write_page(&mut self, page: &Page) -> StorageResult<()>;

    /// Reserves a fresh zeroed page and returns its id.
    fn allocate_page(&mut self) -> StorageResult<PageId>;

    fn delete_page(&mut self, id: PageId) -> StorageResult<()>;

    fn name(&self) -> &str;
}

pub type PageManagerHandle = Arc<Mutex<dyn PageManager>>;

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u64);

impl FileId {
    fn next() -> Self {
        FileId(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Shared reference to an open page file.
///
/// Two handles are the same file iff they were cloned from the same
/// original; page contents and names play no part in the comparison.
#[derive(Clone)]
pub struct FileHandle {
    id: FileId,
    name: Arc<str>,
    inner: PageManagerHandle,
}

impl FileHandle {
    pub fn new<P: PageManager + 'static>(pm: P) -> Self {
        Self::from_shared(Arc::new(Mutex::new(pm)))
    }

    /// Wraps an already shared page manager, letting the caller keep a
    /// typed reference to it.
    pub fn from_shared<P: PageManager + 'static>(pm: Arc<Mutex<P>>) -> Self {
        let name: Arc<str> = match pm.lock() {
            Ok(guard) => Arc::from(guard.name()),
            Err(poisoned) => Arc::from(poisoned.into_inner().name()),
        };
        Self {
            id: FileId::next(),
            name,
            inner: pm,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lock(&self) -> StorageResult<MutexGuard<'_, dyn PageManager + 'static>> {
        self.inner.lock().map_err(|_| StorageError::LockPoisoned {
            file: self.name.to_string(),
        })
    }

    pub fn read_page(&self, id: PageId, page: &mut Page) -> StorageResult<()> {
        self.lock()?.read_page(id, page)
    }

    pub fn write_page(&self, page: &Page) -> StorageResult<()> {
        self.lock()?.write_page(page)
    }

    pub fn allocate_page(&self) -> StorageResult<PageId> {
        self.lock()?.allocate_page()
    }

    pub fn delete_page(&self, id: PageId) -> StorageResult<()> {
        self.lock()?.delete_page(id)
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FileHandle {}

impl Hash for FileHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("id", &self.id.0)
            .field("name", &self.name)
            .finish()
    }
}
