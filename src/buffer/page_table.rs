use std::collections::HashMap;

use crate::{
    buffer::frame::FrameId,
    storage::{page::PageId, pagemgr::manager::FileId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTableError {
    AlreadyPresent { frame_id: FrameId },
}

/// Maps a cached `(file, page)` pair to the frame holding it.
#[derive(Debug, Default)]
pub struct PageTable {
    entries: HashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn lookup(&self, file: FileId, page_id: PageId) -> Option<FrameId> {
        self.entries.get(&(file, page_id)).copied()
    }

    pub fn insert(
        &mut self,
        file: FileId,
        page_id: PageId,
        frame_id: FrameId,
    ) -> Result<(), PageTableError> {
        match self.entries.get(&(file, page_id)) {
            Some(&existing) => Err(PageTableError::AlreadyPresent { frame_id: existing }),
            None => {
                self.entries.insert((file, page_id), frame_id);
                Ok(())
            }
        }
    }

    /// Removing an absent key is a no-op.
    pub fn remove(&mut self, file: FileId, page_id: PageId) -> Option<FrameId> {
        self.entries.remove(&(file, page_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, PageId, FrameId)> + '_ {
        self.entries.iter().map(|(&(f, p), &fr)| (f, p, fr))
    }
}
