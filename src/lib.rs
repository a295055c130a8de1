// Portable UI core for a button-driven e-paper reader.
//
// Hardware lives elsewhere: the platform crates own the HAL, panel
// driver, SD stack and input debouncing, and drive this crate through
// the Services / Panel / InputFrame seams. This crate owns the screen
// lifecycle, the render-buffer discipline and the home screen itself.

#![no_std]

#[cfg(test)]
extern crate std;

extern crate alloc;

pub mod apps;
pub mod book;
pub mod display;
pub mod input;
pub mod render;
pub mod settings;
pub mod ui;
