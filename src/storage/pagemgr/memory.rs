use std::collections::HashMap;

use crate::storage::{
    errors::{StorageError, StorageResult},
    page::{PAGE_SIZE, Page, PageId},
    pagemgr::manager::PageManager,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub writes: u64,
    pub allocations: u64,
    pub deletions: u64,
}

/// Heap-backed page file. Counts every call so callers can check exactly
/// how much I/O an operation caused.
#[derive(Debug)]
pub struct InMemoryPageManager {
    name: String,
    pages: HashMap<PageId, Box<[u8; PAGE_SIZE]>>,
    next_page_id: u64,
    stats: IoStats,
    write_log: Vec<PageId>,
}

impl InMemoryPageManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: HashMap::new(),
            next_page_id: 0,
            stats: IoStats::default(),
            write_log: Vec::new(),
        }
    }

    /// Creates a file with `n` zeroed pages numbered `0..n`.
    pub fn with_pages(name: impl Into<String>, n: u64) -> Self {
        let mut pm = Self::new(name);
        for i in 0..n {
            pm.pages.insert(PageId(i), Box::new([0u8; PAGE_SIZE]));
        }
        pm.next_page_id = n;
        pm
    }

    pub fn stats(&self) -> IoStats {
        self.stats
    }

    /// Page ids in the order they were written.
    pub fn write_log(&self) -> &[PageId] {
        &self.write_log
    }

    pub fn contains(&self, id: PageId) -> bool {
        self.pages.contains_key(&id)
    }

    /// Stored image of a page, bypassing the counters.
    pub fn peek(&self, id: PageId) -> Option<&[u8; PAGE_SIZE]> {
        self.pages.get(&id).map(|data| &**data)
    }

    fn not_found(&self, id: PageId) -> StorageError {
        StorageError::PageNotFound {
            file: self.name.clone(),
            page_id: id.0,
        }
    }
}

impl PageManager for InMemoryPageManager {
    fn read_page(&mut self, id: PageId, page: &mut Page) -> StorageResult<()> {
        let data = self.pages.get(&id).ok_or_else(|| self.not_found(id))?;
        page.data.copy_from_slice(&data[..]);
        page.id = id;
        self.stats.reads += 1;
        Ok(())
    }

    fn write_page(&mut self, page: &Page) -> StorageResult<()> {
        let stored = match self.pages.get_mut(&page.id) {
            Some(stored) => stored,
            None => return Err(self.not_found(page.id)),
        };
        stored.copy_from_slice(&page.data);
        self.stats.writes += 1;
        self.write_log.push(page.id);
        Ok(())
    }

    fn allocate_page(&mut self) -> StorageResult<PageId> {
        let id = PageId(self.next_page_id);
        self.next_page_id += 1;
        self.pages.insert(id, Box::new([0u8; PAGE_SIZE]));
        self.stats.allocations += 1;
        Ok(id)
    }

    fn delete_page(&mut self, id: PageId) -> StorageResult<()> {
        if self.pages.remove(&id).is_none() {
            return Err(self.not_found(id));
        }
        self.stats.deletions += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
