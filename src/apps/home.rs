// Home screen: continue-reading card, menu, dispatch.
//
// Two flows share the frame. The foreground tick does index arithmetic
// on button edges and marks the dirty latch; a background render
// service polls the latch every RENDER_POLL_MS, composes a full frame
// under the gate and flushes it. The expensive part of a frame (cover
// decode off SD) runs once; later passes restore the cached snapshot
// and only redraw the variable regions.
//
// Snapshot policy: the cache captures the frame right after the static
// card content (outline, cover, title, author, progress) and before
// menu tiles, hints and battery. A restore therefore never resurrects
// stale menu or battery pixels; those are redrawn every pass.

extern crate alloc;

use alloc::format;
use alloc::string::String;

use core::sync::atomic::{AtomicUsize, Ordering};

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::apps::{App, AppId, Env, Services, Transition};
use crate::book::file_stem;
use crate::display::{FrameBuffer, HEIGHT, Panel, WIDTH};
use crate::input::{Button, InputFrame};
use crate::render::{RENDER_POLL_MS, RenderGate, Surface};
use crate::settings::BatteryPercent;
use crate::ui::{
    BODY_FONT, Region, SMALL_FONT, TITLE_FONT, components, line_height, text_width,
    truncate_to_width, wrap_next, wrap_prev,
};

// card + menu layout
const CORNER_RADIUS: u32 = 5;
const MARGIN: i32 = 50;
const SIDE_MARGIN: i32 = 20;
const BOTTOM_MARGIN: i32 = 60;
const CARD_INNER_MARGIN: i32 = 25;
const MENU_TILE_H: i32 = 55;
const MENU_SPACING: i32 = 8;
const PROGRESS_BAR_H: i32 = 6;

const HINT_LABELS: [&str; 4] = ["", "Confirm", "Up", "Down"];

// ── Menu model ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuFlags {
    pub has_continue_reading: bool,
    pub has_library: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    ContinueReading,
    BrowseFiles,
    Library,
    FileTransfer,
    Settings,
}

impl MenuItem {
    pub const fn label(self) -> &'static str {
        match self {
            MenuItem::ContinueReading => "Continue Reading",
            MenuItem::BrowseFiles => "Browse Files",
            MenuItem::Library => "Calibre Library",
            MenuItem::FileTransfer => "File Transfer",
            MenuItem::Settings => "Settings",
        }
    }

    pub const fn target(self) -> AppId {
        match self {
            MenuItem::ContinueReading => AppId::Reader,
            MenuItem::BrowseFiles => AppId::Files,
            MenuItem::Library => AppId::Library,
            MenuItem::FileTransfer => AppId::Transfer,
            MenuItem::Settings => AppId::Settings,
        }
    }
}

/// The enabled menu entries, in display order. Render and dispatch
/// both call this with the same flags, so positions can never drift
/// between the two sites.
pub fn menu_entries(flags: MenuFlags) -> heapless::Vec<MenuItem, 5> {
    let mut items = heapless::Vec::new();
    if flags.has_continue_reading {
        let _ = items.push(MenuItem::ContinueReading);
    }
    let _ = items.push(MenuItem::BrowseFiles);
    if flags.has_library {
        let _ = items.push(MenuItem::Library);
    }
    let _ = items.push(MenuItem::FileTransfer);
    let _ = items.push(MenuItem::Settings);
    items
}

fn continue_label(progress_percent: u8) -> String {
    if progress_percent == 0 {
        String::from("Continue Reading")
    } else {
        format!("Continue Reading {progress_percent}%")
    }
}

// ── Shared state between the two flows ──────────────────────────────

/// State the foreground tick and the render service both reach: the
/// gated surface, the selection index, and the stop/ack pair used for
/// teardown. The platform allocates one per screen instance.
pub struct HomeShared<'fb> {
    gate: RenderGate<'fb>,
    selection: AtomicUsize,
    stop: Signal<CriticalSectionRawMutex, ()>,
    stopped: Signal<CriticalSectionRawMutex, ()>,
}

impl<'fb> HomeShared<'fb> {
    pub fn new(frame: &'fb mut FrameBuffer) -> Self {
        Self {
            gate: RenderGate::new(frame),
            selection: AtomicUsize::new(0),
            stop: Signal::new(),
            stopped: Signal::new(),
        }
    }

    pub fn gate(&self) -> &RenderGate<'fb> {
        &self.gate
    }

    pub fn selection(&self) -> usize {
        self.selection.load(Ordering::Acquire)
    }

    fn set_selection(&self, index: usize) {
        self.selection.store(index, Ordering::Release);
    }

    // Only the input flow writes the selection, so load+store is fine.
    fn select_prev(&self, count: usize) {
        self.set_selection(wrap_prev(self.selection(), count));
    }

    fn select_next(&self, count: usize) {
        self.set_selection(wrap_next(self.selection(), count));
    }
}

// ── Scene ───────────────────────────────────────────────────────────

/// Continue-reading card content, resolved once on entry.
#[derive(Debug, Clone)]
pub struct ContinueCard {
    pub title: String,
    pub author: String,
    pub progress_percent: u8,
    pub size_bytes: u64,
    pub position_bytes: u64,
    pub cover_path: Option<String>,
}

impl ContinueCard {
    fn load<S: Services>(services: &mut S, path: &str) -> Self {
        let Some(summary) = services.book_summary(path) else {
            log::warn!("home: no metadata for {path}, falling back to filename");
            return Self {
                title: String::from(file_stem(path)),
                author: String::new(),
                progress_percent: 0,
                size_bytes: 0,
                position_bytes: 0,
                cover_path: None,
            };
        };
        let progress_percent = summary.progress_percent.min(100);
        let size_bytes = summary.size_bytes;
        Self {
            title: summary
                .title
                .unwrap_or_else(|| String::from(file_stem(path))),
            author: summary.author.unwrap_or_default(),
            progress_percent,
            size_bytes,
            position_bytes: size_bytes * progress_percent as u64 / 100,
            cover_path: summary.thumb_path,
        }
    }
}

/// Everything the render service needs to compose a frame. Built by
/// `on_enter`, immutable afterwards; the live selection and battery
/// reading come from elsewhere at compose time.
pub struct HomeScene {
    pub flags: MenuFlags,
    pub card: Option<ContinueCard>,
    pub show_battery_percent: bool,
}

// ── Activity ────────────────────────────────────────────────────────

pub struct HomeApp<'s, 'fb> {
    shared: &'s HomeShared<'fb>,
    flags: MenuFlags,
}

impl<'s, 'fb> HomeApp<'s, 'fb> {
    pub fn new(shared: &'s HomeShared<'fb>) -> Self {
        Self {
            shared,
            flags: MenuFlags::default(),
        }
    }
}

impl App for HomeApp<'_, '_> {
    type Scene = HomeScene;

    fn on_enter<S: Services>(&mut self, services: &mut S, env: &Env<'_>) -> HomeScene {
        // Drain stale teardown signals from a previous session on this
        // shared state.
        self.shared.stop.reset();
        self.shared.stopped.reset();

        let has_continue_reading = env
            .session
            .open_book
            .as_deref()
            .is_some_and(|path| !path.is_empty() && services.exists(path));
        self.flags = MenuFlags {
            has_continue_reading,
            has_library: env.settings.has_opds_url(),
        };

        let card = if has_continue_reading {
            let path = env.session.open_book.as_deref().unwrap_or_default();
            Some(ContinueCard::load(services, path))
        } else {
            None
        };

        self.shared.set_selection(0);
        self.shared.gate.mark_dirty();
        log::info!(
            "home: entered, {} menu items",
            menu_entries(self.flags).len()
        );

        HomeScene {
            flags: self.flags,
            card,
            show_battery_percent: env.settings.battery_percent == BatteryPercent::Show,
        }
    }

    fn tick(&mut self, input: &InputFrame) -> Transition {
        let menu = menu_entries(self.flags);
        let prev_pressed = input.was_pressed(Button::Up) || input.was_pressed(Button::Left);
        let next_pressed = input.was_pressed(Button::Down) || input.was_pressed(Button::Right);

        if input.was_released(Button::Confirm) {
            return match menu.get(self.shared.selection()) {
                Some(item) => Transition::Push(item.target()),
                None => Transition::None,
            };
        } else if prev_pressed {
            self.shared.select_prev(menu.len());
            self.shared.gate.mark_dirty();
        } else if next_pressed {
            self.shared.select_next(menu.len());
            self.shared.gate.mark_dirty();
        }
        Transition::None
    }

    async fn on_exit(&mut self) {
        // Wind the render service down before touching shared
        // resources: request stop, wait for the acknowledgement (the
        // in-flight pass, if any, completes first), then drop the
        // snapshot under the gate.
        self.shared.stop.signal(());
        self.shared.stopped.wait().await;
        let mut surface = self.shared.gate.acquire().await;
        surface.cache.invalidate();
        log::info!("home: exited");
    }
}

// ── Render service ──────────────────────────────────────────────────

/// Background render consumer. Runs on its own task until `on_exit`
/// requests a stop; polls the dirty latch once per interval and
/// otherwise yields.
pub async fn render_service<S: Services, P: Panel>(
    shared: &HomeShared<'_>,
    scene: &HomeScene,
    services: &mut S,
    panel: &mut P,
) {
    let mut ticker = Ticker::every(Duration::from_millis(RENDER_POLL_MS));
    log::debug!("home: render service running");
    loop {
        match select(shared.stop.wait(), ticker.next()).await {
            Either::First(()) => break,
            Either::Second(()) => {
                render_pass(shared, scene, services, panel).await;
            }
        }
    }
    log::debug!("home: render service stopped");
    shared.stopped.signal(());
}

/// One dirty-check / compose / flush cycle. Returns whether a frame
/// was produced. The latch is cleared before composing, so changes
/// arriving mid-pass schedule the next frame instead of being lost.
pub async fn render_pass<S: Services, P: Panel>(
    shared: &HomeShared<'_>,
    scene: &HomeScene,
    services: &mut S,
    panel: &mut P,
) -> bool {
    if !shared.gate.take_dirty() {
        return false;
    }
    let mut surface = shared.gate.acquire().await;
    compose(&mut surface, scene, services, shared.selection());
    panel.flush(surface.frame);
    true
}

// ── Composition ─────────────────────────────────────────────────────

fn compose<S: Services>(
    surface: &mut Surface<'_>,
    scene: &HomeScene,
    services: &mut S,
    selection: usize,
) {
    let Surface { frame, cache } = surface;
    let frame = &mut **frame;

    // Static region: restore the snapshot when one exists, otherwise
    // draw from scratch and capture it before any variable content
    // lands in the buffer.
    if !cache.restore(frame) {
        frame.clear(BinaryColor::On);
        let cover_drawn = draw_card(frame, scene, services);
        if cover_drawn && !cache.store(frame) {
            log::warn!("home: snapshot allocation failed, re-rendering every pass");
        }
    }

    draw_menu(frame, scene, selection);
    components::draw_button_hints(frame, &HINT_LABELS);
    draw_battery_status(frame, scene, services);
}

// Card outline plus, when a book is open, cover/title/author/progress.
// Returns whether the cover image made it into the frame.
fn draw_card<S: Services>(frame: &mut FrameBuffer, scene: &HomeScene, services: &mut S) -> bool {
    let width = WIDTH as i32;
    let height = HEIGHT as i32;
    let card = Region::new(SIDE_MARGIN, MARGIN, width - 2 * SIDE_MARGIN, height / 3);

    RoundedRectangle::with_equal_corners(
        card.to_rect(),
        Size::new(CORNER_RADIUS, CORNER_RADIUS),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::Off, 1))
    .draw(frame)
    .ok();

    let Some(book) = &scene.card else {
        return false;
    };

    let cover_w = width / 3;
    let cover_h = card.h - 2 * CARD_INNER_MARGIN;
    let mut cover_drawn = false;
    if let Some(path) = &book.cover_path {
        let area = Region::new(
            card.x + CARD_INNER_MARGIN,
            card.y + CARD_INNER_MARGIN,
            cover_w,
            cover_h,
        );
        match services.draw_cover(path, frame, area) {
            Ok(()) => cover_drawn = true,
            Err(err) => log::warn!("home: cover draw failed: {err}"),
        }
    }

    let text_x = card.x + CARD_INNER_MARGIN + cover_w;
    let text_y = card.y + CARD_INNER_MARGIN;
    let text_max_w = card.w - cover_w - 2 * CARD_INNER_MARGIN;

    let title = truncate_to_width(&TITLE_FONT, &book.title, text_max_w);
    Text::with_baseline(
        &title,
        Point::new(text_x, text_y),
        MonoTextStyle::new(&TITLE_FONT, BinaryColor::Off),
        Baseline::Top,
    )
    .draw(frame)
    .ok();
    Text::with_baseline(
        &book.author,
        Point::new(text_x, text_y + line_height(&TITLE_FONT) + 5),
        MonoTextStyle::new(&BODY_FONT, BinaryColor::Off),
        Baseline::Top,
    )
    .draw(frame)
    .ok();

    let bar_x = text_x;
    let bar_end_x = card.x + card.w - CARD_INNER_MARGIN;
    let bar_y = card.y + card.h - CARD_INNER_MARGIN - PROGRESS_BAR_H;
    components::draw_progress_bar(
        frame,
        bar_x,
        bar_y,
        bar_end_x - bar_x,
        PROGRESS_BAR_H,
        book.progress_percent,
    );

    let percent_text = format!("{}%", book.progress_percent);
    let percent_x = card.x + card.w - CARD_INNER_MARGIN - text_width(&BODY_FONT, &percent_text);
    let percent_y = bar_y - line_height(&BODY_FONT) - 4;
    Text::with_baseline(
        &percent_text,
        Point::new(percent_x, percent_y),
        MonoTextStyle::new(&BODY_FONT, BinaryColor::Off),
        Baseline::Top,
    )
    .draw(frame)
    .ok();

    let position_text = format!("{} / {}", book.position_bytes, book.size_bytes);
    Text::with_baseline(
        &position_text,
        Point::new(text_x, percent_y),
        MonoTextStyle::new(&BODY_FONT, BinaryColor::Off),
        Baseline::Top,
    )
    .draw(frame)
    .ok();

    cover_drawn
}

fn draw_menu(frame: &mut FrameBuffer, scene: &HomeScene, selection: usize) {
    let width = WIDTH as i32;
    let height = HEIGHT as i32;
    let entries = menu_entries(scene.flags);

    let tile_w = width - 2 * SIDE_MARGIN;
    let count = entries.len() as i32;
    let total_h = count * MENU_TILE_H + (count - 1) * MENU_SPACING;

    let card_bottom = MARGIN + height / 3;
    let mut start_y = card_bottom + 15;
    // keep clear of the bottom button legend
    let max_start_y = height - BOTTOM_MARGIN - total_h - MARGIN;
    if start_y > max_start_y {
        start_y = max_start_y;
    }

    for (i, item) in entries.iter().enumerate() {
        let tile_y = start_y + i as i32 * (MENU_TILE_H + MENU_SPACING);
        let selected = i == selection;
        let tile = RoundedRectangle::with_equal_corners(
            Rectangle::new(
                Point::new(SIDE_MARGIN, tile_y),
                Size::new(tile_w as u32, MENU_TILE_H as u32),
            ),
            Size::new(CORNER_RADIUS, CORNER_RADIUS),
        );
        if selected {
            tile.into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
                .draw(frame)
                .ok();
        } else {
            tile.into_styled(PrimitiveStyle::with_stroke(BinaryColor::Off, 1))
                .draw(frame)
                .ok();
        }

        let label = match item {
            MenuItem::ContinueReading => {
                continue_label(scene.card.as_ref().map_or(0, |c| c.progress_percent))
            }
            _ => String::from(item.label()),
        };
        let text_x = SIDE_MARGIN + (tile_w - text_width(&BODY_FONT, &label)) / 2;
        let text_y = tile_y + (MENU_TILE_H - line_height(&BODY_FONT)) / 2;
        // invert the label on the filled tile
        let color = if selected {
            BinaryColor::On
        } else {
            BinaryColor::Off
        };
        Text::with_baseline(
            &label,
            Point::new(text_x, text_y),
            MonoTextStyle::new(&BODY_FONT, color),
            Baseline::Top,
        )
        .draw(frame)
        .ok();
    }
}

fn draw_battery_status<S: Services>(frame: &mut FrameBuffer, scene: &HomeScene, services: &mut S) {
    let percent = services.battery_percent();
    let label = if scene.show_battery_percent {
        format!("{percent}%")
    } else {
        String::new()
    };
    let x = WIDTH as i32 - SIDE_MARGIN * 2 - text_width(&SMALL_FONT, &label);
    components::draw_battery(frame, x, 10, percent, scene.show_battery_percent);
}
