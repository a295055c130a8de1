// Render-buffer discipline: who may touch the frame, and when a new
// frame is due.

mod cache;
mod gate;

pub use cache::FrameCache;
pub use gate::{RenderGate, Surface, SurfaceGuard};

/// Poll interval of the background render consumer, in milliseconds.
/// A selection change becomes visible at most one interval later.
pub const RENDER_POLL_MS: u64 = 10;
