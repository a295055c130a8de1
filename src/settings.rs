// Settings values and session state the home screen reads.
//
// Persistence (load/save, schema, defaults file) is owned by the
// settings app elsewhere in the firmware; screens receive these by
// reference through an explicit `Env` instead of reaching into a
// global application state.

extern crate alloc;

use alloc::string::String;

/// Whether the battery percent label is drawn next to the glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatteryPercent {
    #[default]
    Show,
    Hide,
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// OPDS catalog server; empty when the library browser is not
    /// configured.
    pub opds_server_url: String,
    pub battery_percent: BatteryPercent,
}

impl Settings {
    pub fn has_opds_url(&self) -> bool {
        !self.opds_server_url.is_empty()
    }
}

/// Per-session reading state carried across screens.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Path of the most recently opened book, if any.
    pub open_book: Option<String>,
}
