// App lifecycle contract, nav stack, and the Services seam to the rest
// of the firmware.

pub mod home;

use core::fmt;

use crate::book::BookSummary;
use crate::display::FrameBuffer;
use crate::input::InputFrame;
use crate::settings::{SessionState, Settings};
use crate::ui::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppId {
    Home,
    Reader,
    Files,
    Library,
    Transfer,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Push(AppId),
    Pop,
    Home,
}

/// Failure modes of the cover decode-and-composite collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverError {
    Io,
    Decode,
    Unsupported,
}

impl fmt::Display for CoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverError::Io => write!(f, "storage read failed"),
            CoverError::Decode => write!(f, "thumbnail decode failed"),
            CoverError::Unsupported => write!(f, "unsupported thumbnail format"),
        }
    }
}

/// Syscall boundary between screens and the firmware proper: storage
/// checks, book parsers, the image pipeline, and the battery gauge.
/// Screens hold it only for as long as a call takes; the render
/// service owns it while the screen is live.
pub trait Services {
    /// Storage existence check by absolute path.
    fn exists(&mut self, path: &str) -> bool;

    /// Best-effort metadata extraction; every field may independently
    /// be missing. `None` when the file could not be parsed at all.
    fn book_summary(&mut self, path: &str) -> Option<BookSummary>;

    /// Decode the thumbnail at `path` and composite it into `area` of
    /// the frame.
    fn draw_cover(
        &mut self,
        path: &str,
        frame: &mut FrameBuffer,
        area: Region,
    ) -> Result<(), CoverError>;

    /// Current charge, 0..=100.
    fn battery_percent(&mut self) -> u8;
}

/// Context handed to a screen on entry. Explicit, so screens have no
/// ambient coupling to a global application state.
pub struct Env<'a> {
    pub settings: &'a Settings,
    pub session: &'a SessionState,
}

/// Lifecycle contract every screen in the navigation stack implements.
///
/// `on_enter` runs once when the screen becomes active and returns the
/// immutable scene the platform hands to the screen's render service
/// before spawning it. `tick` is the foreground quantum: quick, input
/// driven, never blocking. `on_exit` must only be called while the
/// render service is running; it resolves once the service has wound
/// down and shared resources are released.
#[allow(async_fn_in_trait)]
pub trait App {
    type Scene;

    fn on_enter<S: Services>(&mut self, services: &mut S, env: &Env<'_>) -> Self::Scene;
    fn tick(&mut self, input: &InputFrame) -> Transition;
    async fn on_exit(&mut self);
}

const MAX_STACK_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct NavEvent {
    pub from: AppId,
    pub to: AppId,
}

/// Fixed-depth navigation stack. Pushing past the depth cap degrades
/// to replace rather than dropping the request.
pub struct Launcher {
    stack: [AppId; MAX_STACK_DEPTH],
    depth: usize,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    pub const fn new() -> Self {
        Self {
            stack: [AppId::Home; MAX_STACK_DEPTH],
            depth: 1,
        }
    }

    pub fn active(&self) -> AppId {
        self.stack[self.depth - 1]
    }

    pub fn apply(&mut self, transition: Transition) -> Option<NavEvent> {
        let old = self.active();

        match transition {
            Transition::None => return None,

            Transition::Push(id) => {
                if self.depth >= MAX_STACK_DEPTH {
                    log::warn!(
                        "nav stack full (depth {}), Push({:?}) degraded to Replace",
                        self.depth,
                        id
                    );
                    self.stack[self.depth - 1] = id;
                } else {
                    self.stack[self.depth] = id;
                    self.depth += 1;
                }
            }

            Transition::Pop => {
                if self.depth > 1 {
                    self.depth -= 1;
                } else {
                    return None;
                }
            }

            Transition::Home => {
                self.depth = 1;
                self.stack[0] = AppId::Home;
            }
        }

        let new = self.active();
        if new != old {
            Some(NavEvent { from: old, to: new })
        } else {
            None
        }
    }
}
