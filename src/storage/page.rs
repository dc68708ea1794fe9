use std::fmt;

pub const PAGE_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u64);

impl PageId {
    /// Placeholder id carried by pool slots that hold no page.
    pub const INVALID: PageId = PageId(u64::MAX);

    pub fn is_valid(&self) -> bool {
        *self != PageId::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "-")
        }
    }
}

/// Fixed-size page image. The buffer layer moves these around whole and
/// never looks inside `data`.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: PageId,
    pub data: [u8; PAGE_SIZE],
}

impl Page {
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            data: [0u8; PAGE_SIZE],
        }
    }

    pub fn empty() -> Self {
        Self::new(PageId::INVALID)
    }

    /// Zeroes the contents and relabels the page.
    pub fn reset(&mut self, id: PageId) {
        self.id = id;
        self.data.fill(0);
    }

    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> usize {
        if offset >= PAGE_SIZE {
            return 0;
        }
        let n = bytes.len().min(PAGE_SIZE - offset);
        self.data[offset..offset + n].copy_from_slice(&bytes[..n]);
        n
    }
}
