use std::fmt;

use crate::{
    buffer::{
        clock::{self, ClockHand, Victim},
        errors::{BufferError, BufferResult},
        frame::{FrameDescriptor, FrameId, FrameTable},
        page_table::{PageTable, PageTableError},
        stats::BufStats,
    },
    config::BufferConfig,
    db_debug, db_error, db_trace, db_warn,
    debugger::{Component, set_debug_level},
    storage::{
        page::{Page, PageId},
        pagemgr::manager::FileHandle,
    },
};

/// Caches pages of any number of files in a fixed set of frames.
///
/// A page handed out by [`fetch_page`](Self::fetch_page) or
/// [`alloc_page`](Self::alloc_page) stays pinned, and therefore resident,
/// until the caller balances it with [`unpin_page`](Self::unpin_page).
pub struct BufferManager {
    frames: FrameTable,
    pool: Vec<Page>,
    page_table: PageTable,
    hand: ClockHand,
    stats: BufStats,
}

impl BufferManager {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: FrameTable::new(capacity),
            pool: vec![Page::empty(); capacity],
            page_table: PageTable::with_capacity(capacity),
            hand: ClockHand::new(capacity),
            stats: BufStats::default(),
        }
    }

    /// Validates `config`, applies its debug level and builds the pool.
    pub fn with_config(config: &BufferConfig) -> anyhow::Result<Self> {
        config.validate()?;
        set_debug_level(config.debug_level);
        Ok(Self::new(config.frames))
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn stats(&self) -> BufStats {
        self.stats
    }

    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    pub fn clock_hand(&self) -> FrameId {
        self.hand.position()
    }

    pub fn frame(&self, frame_id: FrameId) -> &FrameDescriptor {
        self.frames.get(frame_id)
    }

    pub fn frames(&self) -> impl Iterator<Item = &FrameDescriptor> {
        self.frames.iter()
    }

    #[cfg(test)]
    pub(crate) fn frame_mut(&mut self, frame_id: FrameId) -> &mut FrameDescriptor {
        self.frames.get_mut(frame_id)
    }

    /// Frame currently caching `page_id` of `file`, if any.
    pub fn frame_of(&self, file: &FileHandle, page_id: PageId) -> Option<FrameId> {
        self.page_table.lookup(file.id(), page_id)
    }

    pub fn fetch_page(&mut self, file: &FileHandle, page_id: PageId) -> BufferResult<&mut Page> {
        self.stats.accesses += 1;

        if let Some(frame_id) = self.page_table.lookup(file.id(), page_id) {
            db_trace!(
                Component::Buffer,
                "hit: page {} of '{}' in frame {}",
                page_id,
                file.name(),
                frame_id
            );
            self.pin(frame_id);
            return Ok(&mut self.pool[frame_id.0]);
        }

        let frame_id = self.allocate_frame()?;

        if let Err(e) = file.read_page(page_id, &mut self.pool[frame_id.0]) {
            self.pool[frame_id.0].reset(PageId::INVALID);
            db_error!(
                Component::Buffer,
                "reading page {} of '{}' failed: {}",
                page_id,
                file.name(),
                e
            );
            return Err(e.into());
        }
        self.stats.disk_reads += 1;

        let frame_id = self.install(frame_id, file, page_id);
        db_trace!(
            Component::Buffer,
            "miss: page {} of '{}' loaded into frame {}",
            page_id,
            file.name(),
            frame_id
        );
        Ok(&mut self.pool[frame_id.0])
    }

    /// Drops one pin. Unpinning a page that is not cached does nothing.
    /// A `dirty` of false never clears an earlier dirty mark.
    pub fn unpin_page(&mut self, file: &FileHandle, page_id: PageId, dirty: bool) -> BufferResult<()> {
        let Some(frame_id) = self.page_table.lookup(file.id(), page_id) else {
            db_trace!(
                Component::Buffer,
                "unpin of uncached page {} of '{}' ignored",
                page_id,
                file.name()
            );
            return Ok(());
        };

        let frame = self.frames.get_mut(frame_id);
        if frame.pin_count == 0 {
            return Err(BufferError::PageNotPinned {
                file: file.name().to_string(),
                page_id: page_id.0,
                frame_id: frame_id.0,
            });
        }

        frame.pin_count -= 1;
        if dirty {
            frame.dirty = true;
        }
        Ok(())
    }

    /// Creates a new page in `file` and returns it pinned.
    ///
    /// The frame is secured before the file grows, so an exhausted pool
    /// leaves the file untouched.
    pub fn alloc_page(&mut self, file: &FileHandle) -> BufferResult<(PageId, &mut Page)> {
        self.stats.accesses += 1;

        let frame_id = self.allocate_frame()?;
        let page_id = file.allocate_page()?;
        self.pool[frame_id.0].reset(page_id);

        let frame_id = self.install(frame_id, file, page_id);
        db_debug!(
            Component::Buffer,
            "allocated page {} of '{}' in frame {}",
            page_id,
            file.name(),
            frame_id
        );
        Ok((page_id, &mut self.pool[frame_id.0]))
    }

    /// Deletes a page from `file`, discarding any cached copy unwritten.
    /// Refuses while the page is pinned.
    pub fn dispose_page(&mut self, file: &FileHandle, page_id: PageId) -> BufferResult<()> {
        if let Some(frame_id) = self.page_table.lookup(file.id(), page_id) {
            let frame = self.frames.get_mut(frame_id);
            if frame.is_pinned() {
                return Err(BufferError::PagePinned {
                    file: file.name().to_string(),
                    page_id: page_id.0,
                    frame_id: frame_id.0,
                });
            }

            self.page_table.remove(file.id(), page_id);
            frame.clear();
            self.pool[frame_id.0].reset(PageId::INVALID);
        }

        file.delete_page(page_id)?;
        db_debug!(
            Component::Buffer,
            "disposed page {} of '{}'",
            page_id,
            file.name()
        );
        Ok(())
    }

    /// Writes back and evicts every dirty frame of `file`. Clean frames stay
    /// resident.
    ///
    /// All frames of the file are checked before anything is written: a
    /// pinned or corrupt frame aborts the call with nothing flushed. An I/O
    /// error midway leaves the frames already written flushed.
    pub fn flush_file(&mut self, file: &FileHandle) -> BufferResult<()> {
        for frame in self.frames.iter().filter(|f| f.belongs_to(file)) {
            if !frame.valid {
                return Err(BufferError::InvalidFrameState {
                    frame_id: frame.frame_id.0,
                    valid: frame.valid,
                    dirty: frame.dirty,
                    ref_bit: frame.ref_bit,
                });
            }
            if frame.is_pinned() {
                let page_id = frame.owner.as_ref().map_or(PageId::INVALID, |o| o.page_id);
                return Err(BufferError::PagePinned {
                    file: file.name().to_string(),
                    page_id: page_id.0,
                    frame_id: frame.frame_id.0,
                });
            }
        }

        let mut flushed = 0;
        for i in 0..self.frames.len() {
            let frame = self.frames.get_mut(FrameId(i));
            if !frame.dirty {
                continue;
            }
            let Some(owner) = frame.owner.as_ref().filter(|o| o.file == *file) else {
                continue;
            };
            let page_id = owner.page_id;

            owner.write_back(&mut self.pool[i])?;
            self.stats.disk_writes += 1;
            self.page_table.remove(file.id(), page_id);
            frame.clear();
            flushed += 1;
        }

        db_debug!(
            Component::Buffer,
            "flushed {} dirty pages of '{}'",
            flushed,
            file.name()
        );
        Ok(())
    }

    /// Writes back every dirty page and tears the pool down, reporting the
    /// first write failure.
    ///
    /// A failed frame does not stop the others from being written. Pages
    /// that could not be written are dropped with the pool; teardown does
    /// not retry them.
    pub fn close(mut self) -> BufferResult<()> {
        let mut first_err = None;
        for i in 0..self.frames.len() {
            if let Err(e) = self.write_back(FrameId(i)) {
                db_error!(Component::Buffer, "close: frame {} not written: {}", i, e);
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => {
                for i in 0..self.frames.len() {
                    self.frames.get_mut(FrameId(i)).dirty = false;
                }
                Err(e)
            }
            None => Ok(()),
        }
    }

    /// Cross-checks the frame table against the page table.
    pub fn check_invariants(&self) -> BufferResult<()> {
        let corrupt = |frame: &FrameDescriptor| BufferError::InvalidFrameState {
            frame_id: frame.frame_id.0,
            valid: frame.valid,
            dirty: frame.dirty,
            ref_bit: frame.ref_bit,
        };

        for frame in self.frames.iter() {
            match (&frame.owner, frame.valid) {
                (Some(owner), true) => {
                    let mapped = self.page_table.lookup(owner.file.id(), owner.page_id);
                    if mapped != Some(frame.frame_id) {
                        return Err(corrupt(frame));
                    }
                }
                (None, false) => {
                    if frame.pin_count != 0 || frame.dirty {
                        return Err(corrupt(frame));
                    }
                }
                _ => return Err(corrupt(frame)),
            }
        }

        for (file_id, page_id, frame_id) in self.page_table.iter() {
            let frame = self.frames.get(frame_id);
            let owned = frame
                .owner
                .as_ref()
                .is_some_and(|o| o.file.id() == file_id && o.page_id == page_id);
            if !frame.valid || !owned {
                return Err(corrupt(frame));
            }
        }
        Ok(())
    }

    fn pin(&mut self, frame_id: FrameId) {
        let frame = self.frames.get_mut(frame_id);
        frame.ref_bit = true;
        frame.pin_count += 1;
    }

    /// Produces a free frame, evicting through the clock if needed.
    fn allocate_frame(&mut self) -> BufferResult<FrameId> {
        let victim = clock::find_victim(&mut self.hand, &mut self.frames)?;
        if let Victim::Evict(frame_id) = victim {
            clock::evict(
                frame_id,
                &mut self.frames,
                &mut self.pool,
                &mut self.page_table,
                &mut self.stats,
            )?;
            self.pool[frame_id.0].reset(PageId::INVALID);
        }
        Ok(victim.frame_id())
    }

    /// Maps `page_id` to the freshly filled `frame_id` and pins it. If the
    /// page table already has the page, that frame wins and is pinned
    /// instead, leaving `frame_id` free.
    fn install(&mut self, frame_id: FrameId, file: &FileHandle, page_id: PageId) -> FrameId {
        match self.page_table.insert(file.id(), page_id, frame_id) {
            Ok(()) => {
                self.frames
                    .get_mut(frame_id)
                    .mark_occupied(file.clone(), page_id);
                frame_id
            }
            Err(PageTableError::AlreadyPresent { frame_id: existing }) => {
                db_warn!(
                    Component::Buffer,
                    "page {} of '{}' already mapped to frame {}",
                    page_id,
                    file.name(),
                    existing
                );
                self.pool[frame_id.0].reset(PageId::INVALID);
                self.pin(existing);
                existing
            }
        }
    }

    fn write_back(&mut self, frame_id: FrameId) -> BufferResult<()> {
        let frame = self.frames.get_mut(frame_id);
        if !frame.valid || !frame.dirty {
            return Ok(());
        }
        if let Some(owner) = &frame.owner {
            owner.write_back(&mut self.pool[frame_id.0])?;
            self.stats.disk_writes += 1;
        }
        frame.dirty = false;
        Ok(())
    }
}

impl Drop for BufferManager {
    fn drop(&mut self) {
        for i in 0..self.frames.len() {
            if let Err(e) = self.write_back(FrameId(i)) {
                db_error!(
                    Component::Buffer,
                    "teardown flush of frame {} failed: {}",
                    i,
                    e
                );
            }
        }
    }
}

impl fmt::Display for BufferManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.frames.iter() {
            writeln!(f, "FrameNo:{} {}", frame.frame_id, frame)?;
        }
        write!(
            f,
            "Total Number of Valid Frames:{}",
            self.frames.valid_count()
        )
    }
}
