//! Clock (second chance) replacement.
//!
//! The hand sweeps frames in circular order. A referenced frame has its
//! reference bit cleared and is skipped once; an unreferenced, unpinned
//! frame is the victim. Two laps are enough: the first clears every
//! reference bit, so a second lap can only be blocked by pins.

use crate::{
    buffer::{
        errors::{BufferError, BufferResult},
        frame::{FrameId, FrameTable},
        page_table::PageTable,
        stats::BufStats,
    },
    db_debug, db_trace, db_warn,
    debugger::Component,
    storage::page::Page,
};

pub const MAX_SWEEP_LAPS: usize = 2;

/// Cursor over frame numbers. Persists across allocations so successive
/// sweeps pick up where the last one stopped.
#[derive(Debug, Clone)]
pub struct ClockHand {
    position: usize,
    capacity: usize,
}

impl ClockHand {
    /// Starts on the last frame so the first advance lands on frame 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "clock needs at least one frame");
        Self {
            position: capacity - 1,
            capacity,
        }
    }

    pub fn position(&self) -> FrameId {
        FrameId(self.position)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn advance(&mut self) -> FrameId {
        self.position = (self.position + 1) % self.capacity;
        FrameId(self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Victim {
    /// Frame holds nothing; usable as is.
    Free(FrameId),
    /// Frame holds an unpinned, unreferenced page that must be evicted.
    Evict(FrameId),
}

impl Victim {
    pub fn frame_id(&self) -> FrameId {
        match self {
            Victim::Free(id) | Victim::Evict(id) => *id,
        }
    }
}

/// Runs the sweep and picks a frame, clearing reference bits on the way.
/// Never touches pinned frames.
pub fn find_victim(hand: &mut ClockHand, frames: &mut FrameTable) -> BufferResult<Victim> {
    let capacity = hand.capacity();
    debug_assert_eq!(capacity, frames.len());

    for lap in 1..=MAX_SWEEP_LAPS {
        let mut pinned = 0;

        for _ in 0..capacity {
            let frame_id = hand.advance();
            let frame = frames.get_mut(frame_id);

            if !frame.valid {
                return Ok(Victim::Free(frame_id));
            }

            if frame.ref_bit {
                frame.ref_bit = false;
                continue;
            }

            if frame.pin_count != 0 {
                pinned += 1;
                continue;
            }

            return Ok(Victim::Evict(frame_id));
        }

        db_trace!(
            Component::Clock,
            "lap {} found {}/{} frames pinned",
            lap,
            pinned,
            capacity
        );

        if lap == MAX_SWEEP_LAPS {
            debug_assert_eq!(pinned, capacity);
        }
    }

    db_warn!(
        Component::Clock,
        "pool exhausted after {} laps over {} frames",
        MAX_SWEEP_LAPS,
        capacity
    );
    Err(BufferError::PoolExhausted { capacity })
}

/// Frees a victim frame: writes back dirty contents through the owning
/// file, drops the index entry and clears the descriptor. If the write
/// fails the frame is left exactly as it was.
pub fn evict(
    frame_id: FrameId,
    frames: &mut FrameTable,
    pool: &mut [Page],
    page_table: &mut PageTable,
    stats: &mut BufStats,
) -> BufferResult<()> {
    let frame = frames.get_mut(frame_id);
    debug_assert!(frame.valid && frame.pin_count == 0);

    if let Some(owner) = &frame.owner {
        if frame.dirty {
            owner.write_back(&mut pool[frame_id.0])?;
            stats.disk_writes += 1;
            db_debug!(
                Component::Clock,
                "flushed dirty page {} of '{}' from frame {}",
                owner.page_id,
                owner.file.name(),
                frame_id
            );
        }
        page_table.remove(owner.file.id(), owner.page_id);
        db_trace!(
            Component::Clock,
            "evicted page {} of '{}' from frame {}",
            owner.page_id,
            owner.file.name(),
            frame_id
        );
    }

    frame.clear();
    Ok(())
}
