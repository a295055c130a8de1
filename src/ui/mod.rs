// Drawing helpers for the 1-bit frame: region geometry, monospace text
// measurement, wrap-around list navigation.

pub mod components;

extern crate alloc;

use alloc::string::String;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_8X13, FONT_10X20};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

// UI font roles; one place to retune when the panel changes.
pub const TITLE_FONT: MonoFont<'static> = FONT_10X20;
pub const BODY_FONT: MonoFont<'static> = FONT_8X13;
pub const SMALL_FONT: MonoFont<'static> = FONT_6X10;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn to_rect(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.x, self.y),
            Size::new(self.w.max(0) as u32, self.h.max(0) as u32),
        )
    }

    pub fn top_left(self) -> Point {
        Point::new(self.x, self.y)
    }
}

// wrap-around list navigation

// advance index by one, wrapping past count-1 back to 0
#[inline]
pub fn wrap_next(current: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (current + 1) % count
}

// retreat index by one, wrapping past 0 to count-1
#[inline]
pub fn wrap_prev(current: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (current + count - 1) % count
}

// monospace text metrics

pub fn line_height(font: &MonoFont<'_>) -> i32 {
    font.character_size.height as i32
}

pub fn text_width(font: &MonoFont<'_>, text: &str) -> i32 {
    let advance = (font.character_size.width + font.character_spacing) as i32;
    text.chars().count() as i32 * advance
}

/// Shorten `text` until it fits `max_width`, appending `...` when
/// anything was removed. Removal is by whole characters, never bytes.
pub fn truncate_to_width(font: &MonoFont<'_>, text: &str, max_width: i32) -> String {
    let mut out = String::from(text);
    if text_width(font, &out) <= max_width {
        return out;
    }
    let ellipsis_width = text_width(font, "...");
    while !out.is_empty() && text_width(font, &out) > max_width - ellipsis_width {
        out.pop();
    }
    out.push_str("...");
    out
}
