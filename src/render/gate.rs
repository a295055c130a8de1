// Mutual exclusion between frame producers and teardown.
//
// The gate owns the lent frame buffer plus the cover cache, and the
// dirty latch that schedules redraws. Producers hold the guard for the
// whole compose + flush sequence; teardown takes the guard before
// touching shared resources, so the panel never receives a torn frame.
//
// Re-entrant acquire from the same logical owner deadlocks; that is a
// programming error, not a handled failure.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};

use crate::display::FrameBuffer;
use crate::render::FrameCache;

/// Everything a render pass mutates: the lent frame buffer and the
/// snapshot cache. Only reachable through the gate.
pub struct Surface<'fb> {
    pub frame: &'fb mut FrameBuffer,
    pub cache: FrameCache,
}

pub type SurfaceGuard<'a, 'fb> = MutexGuard<'a, CriticalSectionRawMutex, Surface<'fb>>;

pub struct RenderGate<'fb> {
    surface: Mutex<CriticalSectionRawMutex, Surface<'fb>>,
    dirty: AtomicBool,
}

impl<'fb> RenderGate<'fb> {
    pub fn new(frame: &'fb mut FrameBuffer) -> Self {
        Self {
            surface: Mutex::new(Surface {
                frame,
                cache: FrameCache::new(),
            }),
            dirty: AtomicBool::new(false),
        }
    }

    /// Wait for exclusive access to the surface. Release is by guard
    /// drop, exactly once on every exit path.
    pub async fn acquire(&self) -> SurfaceGuard<'_, 'fb> {
        self.surface.lock().await
    }

    /// Non-blocking acquire; `None` while another owner holds the gate.
    pub fn try_acquire(&self) -> Option<SurfaceGuard<'_, 'fb>> {
        self.surface.try_lock().ok()
    }

    /// Schedule a redraw. Multiple marks before the next render pass
    /// collapse into a single frame.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Consume the dirty latch. The render consumer calls this once per
    /// poll and only composes a frame when it returns true.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}
