use std::sync::{Arc, Mutex};

use bufmgr::{
    buffer::BufferManager,
    storage::{FileHandle, InMemoryPageManager, IoStats, PageId},
};

/// In-memory page file that the test can still inspect after handing it
/// to the buffer manager.
#[derive(Clone)]
pub struct MemFile {
    pub pm: Arc<Mutex<InMemoryPageManager>>,
    pub handle: FileHandle,
}

#[allow(dead_code)]
impl MemFile {
    pub fn new(name: &str, pages: u64) -> Self {
        let pm = Arc::new(Mutex::new(InMemoryPageManager::with_pages(name, pages)));
        let handle = FileHandle::from_shared(pm.clone());
        Self { pm, handle }
    }

    pub fn io(&self) -> IoStats {
        self.pm.lock().unwrap().stats()
    }

    pub fn stored(&self, page_id: PageId) -> Option<u8> {
        self.pm.lock().unwrap().peek(page_id).map(|data| data[0])
    }

    pub fn writes_of(&self, page_id: PageId) -> usize {
        self.pm
            .lock()
            .unwrap()
            .write_log()
            .iter()
            .filter(|&&id| id == page_id)
            .count()
    }
}

#[allow(dead_code)]
pub fn temp_db_path() -> String {
    format!("/tmp/bufmgr_test_{}.db", rand::random::<u64>())
}

/// Fetches `page_id`, stamps its first byte and releases it dirty.
#[allow(dead_code)]
pub fn stamp(bm: &mut BufferManager, file: &FileHandle, page_id: PageId, value: u8) {
    bm.fetch_page(file, page_id).unwrap().data[0] = value;
    bm.unpin_page(file, page_id, true).unwrap();
}
