// src/config.rs
// Settings snapshot and fixed injection constants

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Read-only snapshot of the user settings the content script consumes.
///
/// The settings store holds many more keys; anything not listed here is
/// ignored on deserialization, and missing keys fall back to the defaults
/// the extension ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Restyle supported pages to match the overlay theme
    pub adapt_to_other_page_styles: bool,
    /// Keep the site's own top bar visible instead of hiding it
    pub use_original_bilibili_top_bar: bool,
    /// Keep the site's own homepage instead of taking it over
    pub use_original_bilibili_homepage: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            adapt_to_other_page_styles: true,
            use_original_bilibili_top_bar: false,
            use_original_bilibili_homepage: false,
        }
    }
}

impl Settings {
    /// Parse a snapshot from the settings store's JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Fixed names and timings used while injecting the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectConfig {
    /// Class toggled on the document root when adapted styling is active
    pub root_class: &'static str,
    /// Id of the single container element appended to the body
    pub container_id: &'static str,
    /// Logical stylesheet name, resolved through the extension runtime
    pub stylesheet: &'static str,
    /// Length of the container's opacity transition
    pub fade_duration: Duration,
    /// Extra wait after the stylesheet loads before fading in
    pub reveal_delay: Duration,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            root_class: "bewly-design",
            container_id: "bewly",
            stylesheet: "dist/contentScripts/style.css",
            fade_duration: Duration::from_millis(500),
            reveal_delay: Duration::from_millis(500),
        }
    }
}

impl InjectConfig {
    /// CSS `transition` value for the container fade-in
    pub fn fade_transition(&self) -> String {
        format!("opacity {}ms", self.fade_duration.as_millis())
    }
}
