use std::fmt;

use crate::storage::{
    errors::StorageResult,
    page::{Page, PageId},
    pagemgr::manager::FileHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct FrameOwner {
    pub file: FileHandle,
    pub page_id: PageId,
}

impl FrameOwner {
    /// Writes `page` to the owning file as `page_id`. The label on the
    /// cached copy is overwritten first, since callers hold `&mut Page`.
    pub fn write_back(&self, page: &mut Page) -> StorageResult<()> {
        page.id = self.page_id;
        self.file.write_page(page)
    }
}

/// Bookkeeping for one pool slot.
#[derive(Debug)]
pub struct FrameDescriptor {
    pub(crate) frame_id: FrameId,
    pub(crate) owner: Option<FrameOwner>,
    pub(crate) valid: bool,
    pub(crate) ref_bit: bool,
    pub(crate) dirty: bool,
    pub(crate) pin_count: u32,
}

impl FrameDescriptor {
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            owner: None,
            valid: false,
            ref_bit: false,
            dirty: false,
            pin_count: 0,
        }
    }

    /// Binds a free frame to `page_id` of `file`, pinned once.
    pub fn mark_occupied(&mut self, file: FileHandle, page_id: PageId) {
        debug_assert!(!self.valid, "frame {} is already occupied", self.frame_id);

        self.owner = Some(FrameOwner { file, page_id });
        self.valid = true;
        self.ref_bit = true;
        self.pin_count = 1;
        self.dirty = false;
    }

    pub fn clear(&mut self) {
        self.owner = None;
        self.valid = false;
        self.ref_bit = false;
        self.dirty = false;
        self.pin_count = 0;
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    pub fn owner(&self) -> Option<&FrameOwner> {
        self.owner.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn ref_bit(&self) -> bool {
        self.ref_bit
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    pub fn belongs_to(&self, file: &FileHandle) -> bool {
        self.owner.as_ref().is_some_and(|o| o.file == *file)
    }
}

impl fmt::Display for FrameDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "file:{} pageNo:{} ", owner.file.name(), owner.page_id)?,
            None => write!(f, "file:- pageNo:- ")?,
        }
        write!(
            f,
            "valid:{} pinCnt:{} dirty:{} refbit:{}",
            self.valid, self.pin_count, self.dirty, self.ref_bit
        )
    }
}

/// Descriptors for every frame, indexed by frame number.
#[derive(Debug)]
pub struct FrameTable {
    frames: Vec<FrameDescriptor>,
}

impl FrameTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: (0..capacity).map(|i| FrameDescriptor::new(FrameId(i))).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, id: FrameId) -> &FrameDescriptor {
        &self.frames[id.0]
    }

    pub fn get_mut(&mut self, id: FrameId) -> &mut FrameDescriptor {
        &mut self.frames[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameDescriptor> {
        self.frames.iter()
    }

    pub fn valid_count(&self) -> usize {
        self.frames.iter().filter(|f| f.valid).count()
    }
}
