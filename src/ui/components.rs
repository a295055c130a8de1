// Shared screen furniture: battery indicator, progress bar, button
// hint legend.

extern crate alloc;

use alloc::format;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::display::{FrameBuffer, HEIGHT, WIDTH};
use crate::ui::{SMALL_FONT, text_width};

const BATTERY_W: i32 = 24;
const BATTERY_H: i32 = 12;
const BATTERY_NUB_W: i32 = 3;
const BATTERY_NUB_H: i32 = 6;

/// Battery glyph at (x, y) with a fill proportional to `percent`,
/// optionally followed by the percent label.
pub fn draw_battery(frame: &mut FrameBuffer, x: i32, y: i32, percent: u8, show_percent: bool) {
    let ink = PrimitiveStyle::with_stroke(BinaryColor::Off, 1);
    let fill = PrimitiveStyle::with_fill(BinaryColor::Off);

    Rectangle::new(Point::new(x, y), Size::new(BATTERY_W as u32, BATTERY_H as u32))
        .into_styled(ink)
        .draw(frame)
        .ok();
    Rectangle::new(
        Point::new(x + BATTERY_W, y + (BATTERY_H - BATTERY_NUB_H) / 2),
        Size::new(BATTERY_NUB_W as u32, BATTERY_NUB_H as u32),
    )
    .into_styled(fill)
    .draw(frame)
    .ok();

    let inner = BATTERY_W - 4;
    let filled = inner * percent.min(100) as i32 / 100;
    if filled > 0 {
        Rectangle::new(
            Point::new(x + 2, y + 2),
            Size::new(filled as u32, (BATTERY_H - 4) as u32),
        )
        .into_styled(fill)
        .draw(frame)
        .ok();
    }

    if show_percent {
        let label = format!("{}%", percent.min(100));
        let style = MonoTextStyle::new(&SMALL_FONT, BinaryColor::Off);
        Text::with_baseline(
            &label,
            Point::new(x + BATTERY_W + BATTERY_NUB_W + 4, y + 1),
            style,
            Baseline::Top,
        )
        .draw(frame)
        .ok();
    }
}

/// Progress bar: outline plus a filled portion for `percent`.
pub fn draw_progress_bar(frame: &mut FrameBuffer, x: i32, y: i32, width: i32, height: i32, percent: u8) {
    let filled = width * percent.min(100) as i32 / 100;
    Rectangle::new(
        Point::new(x, y),
        Size::new(width.max(0) as u32, (height - 2).max(0) as u32),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::Off, 1))
    .draw(frame)
    .ok();
    if filled > 0 {
        Rectangle::new(
            Point::new(x - 1, y - 1),
            Size::new(filled as u32, height.max(0) as u32),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(frame)
        .ok();
    }
}

/// Bottom button legend: one label per physical button slot, centered
/// in its quarter of the width. Empty labels leave the slot blank.
pub fn draw_button_hints(frame: &mut FrameBuffer, labels: &[&str; 4]) {
    let style = MonoTextStyle::new(&SMALL_FONT, BinaryColor::Off);
    let slot_w = WIDTH as i32 / 4;
    let y = HEIGHT as i32 - 30;
    for (slot, label) in labels.iter().enumerate() {
        if label.is_empty() {
            continue;
        }
        let slot_x = slot as i32 * slot_w;
        let x = slot_x + (slot_w - text_width(&SMALL_FONT, label)) / 2;
        Text::with_baseline(label, Point::new(x, y), style, Baseline::Top)
            .draw(frame)
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_pixels(frame: &FrameBuffer) -> usize {
        frame
            .bytes()
            .iter()
            .map(|b| b.count_zeros() as usize)
            .sum()
    }

    #[test]
    fn battery_fill_scales_with_percent() {
        let mut empty = FrameBuffer::new();
        draw_battery(&mut empty, 400, 10, 0, false);
        let mut full = FrameBuffer::new();
        draw_battery(&mut full, 400, 10, 100, false);
        assert!(black_pixels(&full) > black_pixels(&empty));
    }

    #[test]
    fn battery_percent_label_is_optional() {
        let mut without = FrameBuffer::new();
        draw_battery(&mut without, 400, 10, 50, false);
        let mut with = FrameBuffer::new();
        draw_battery(&mut with, 400, 10, 50, true);
        assert!(black_pixels(&with) > black_pixels(&without));
    }

    #[test]
    fn progress_bar_zero_draws_outline_only() {
        let mut zero = FrameBuffer::new();
        draw_progress_bar(&mut zero, 205, 285, 230, 6, 0);
        let mut half = FrameBuffer::new();
        draw_progress_bar(&mut half, 205, 285, 230, 6, 50);
        assert!(black_pixels(&zero) > 0);
        assert!(black_pixels(&half) > black_pixels(&zero));
    }

    #[test]
    fn hints_skip_empty_slots() {
        let mut none = FrameBuffer::new();
        draw_button_hints(&mut none, &["", "", "", ""]);
        assert_eq!(black_pixels(&none), 0);
        let mut some = FrameBuffer::new();
        draw_button_hints(&mut some, &["", "Confirm", "Up", "Down"]);
        assert!(black_pixels(&some) > 0);
    }
}
