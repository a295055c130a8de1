// Snapshot cache for expensive sub-renders.
//
// Decoding and compositing a cover image off SD is by far the most
// expensive part of the home frame. The cache keeps one owned copy of
// the frame taken right after the static content is drawn; later passes
// restore it instead of re-decoding. At most one snapshot exists per
// screen instance.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::display::FrameBuffer;

pub struct FrameCache {
    snapshot: Option<Box<[u8]>>,
}

impl FrameCache {
    pub const fn new() -> Self {
        Self { snapshot: None }
    }

    /// Copy the frame into an owned snapshot buffer.
    ///
    /// Allocation is fallible: on heap exhaustion no snapshot is kept
    /// and the caller falls back to a full re-render next pass. A
    /// previous snapshot is always released first.
    pub fn store(&mut self, frame: &FrameBuffer) -> bool {
        self.invalidate();
        let src = frame.bytes();
        let mut buf = Vec::new();
        if buf.try_reserve_exact(src.len()).is_err() {
            return false;
        }
        buf.extend_from_slice(src);
        self.snapshot = Some(buf.into_boxed_slice());
        true
    }

    /// Copy the snapshot back into the frame.
    ///
    /// Returns false, leaving the destination untouched, when no
    /// snapshot exists or its size does not match the frame.
    pub fn restore(&self, frame: &mut FrameBuffer) -> bool {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };
        let dst = frame.bytes_mut();
        if snapshot.len() != dst.len() {
            return false;
        }
        dst.copy_from_slice(snapshot);
        true
    }

    /// Release the snapshot. Idempotent.
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new()
    }
}
