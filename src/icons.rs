// src/icons.rs
// SVG sprite injected next to the overlay so `<use href="#…">` resolves inside the shadow root

pub const SVG_ICONS: &str = include_str!("../assets/icons.svg");
