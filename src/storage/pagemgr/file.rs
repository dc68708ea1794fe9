use std::{
    collections::HashSet,
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

use crate::{
    db_trace,
    debugger::Component,
    storage::{
        errors::{StorageError, StorageResult},
        page::{PAGE_SIZE, Page, PageId},
        pagemgr::manager::PageManager,
    },
};

/// Page file on disk. Page `n` lives at byte offset `n * PAGE_SIZE`.
///
/// Deleted pages are zeroed on disk but only remembered in memory: after a
/// reopen they read back as zeroed pages rather than `PageNotFound`.
#[derive(Debug)]
pub struct FilePageManager {
    name: String,
    file: File,
    next_page_id: u64,
    deleted: HashSet<PageId>,
}

impl FilePageManager {
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StorageError::io(&name, e))?;

        let size = file
            .metadata()
            .map_err(|e| StorageError::io(&name, e))?
            .len();
        let next_page_id = size / PAGE_SIZE as u64;

        db_trace!(
            Component::Storage,
            "opened '{}' with {} pages",
            name,
            next_page_id
        );

        Ok(Self {
            name,
            file,
            next_page_id,
            deleted: HashSet::new(),
        })
    }

    pub fn num_pages(&self) -> u64 {
        self.next_page_id
    }

    fn check_exists(&self, id: PageId) -> StorageResult<()> {
        if id.0 >= self.next_page_id || self.deleted.contains(&id) {
            return Err(StorageError::PageNotFound {
                file: self.name.clone(),
                page_id: id.0,
            });
        }
        Ok(())
    }

    fn write_at(&mut self, id: PageId, data: &[u8; PAGE_SIZE]) -> StorageResult<()> {
        let offset = id.0 * PAGE_SIZE as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| StorageError::io(&self.name, e))?;
        self.file
            .write_all(data)
            .map_err(|e| StorageError::io(&self.name, e))
    }
}

impl PageManager for FilePageManager {
    fn read_page(&mut self, id: PageId, page: &mut Page) -> StorageResult<()> {
        self.check_exists(id)?;

        let offset = id.0 * PAGE_SIZE as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| StorageError::io(&self.name, e))?;
        self.file
            .read_exact(&mut page.data)
            .map_err(|e| StorageError::io(&self.name, e))?;

        page.id = id;
        Ok(())
    }

    fn write_page(&mut self, page: &Page) -> StorageResult<()> {
        self.check_exists(page.id)?;
        self.write_at(page.id, &page.data)
    }

    fn allocate_page(&mut self) -> StorageResult<PageId> {
        let id = PageId(self.next_page_id);
        self.write_at(id, &[0u8; PAGE_SIZE])?;
        self.next_page_id += 1;
        Ok(id)
    }

    fn delete_page(&mut self, id: PageId) -> StorageResult<()> {
        self.check_exists(id)?;
        self.write_at(id, &[0u8; PAGE_SIZE])?;
        self.deleted.insert(id);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
