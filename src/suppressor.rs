// src/suppressor.rs
// Short-lived style overrides applied before first paint

use log::debug;

use crate::error::Result;
use crate::page::HostPage;

/// Why an override exists. Each purpose gets its own handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Hide the site's top bar until the overlay's own bar is up
    TopBar,
    /// Hide the home page body and paint the theme background during takeover
    HomepageBody,
    /// Let the body fade in once it is shown again
    FadeIn,
}

impl Suppression {
    pub fn css(self) -> &'static str {
        match self {
            Suppression::TopBar => ".bili-header { visibility: hidden !important; }",
            Suppression::HomepageBody => {
                "html.bewly-design {
  background-color: var(--bew-bg);
  transition: background-color 0.2s ease-in;
}

body {
  display: none;
}"
            }
            Suppression::FadeIn => "body { transition: opacity 0.5s; }",
        }
    }
}

/// Ownership token for one injected `<style>` element.
///
/// Releasing takes the element out, so a second release finds nothing to do.
#[derive(Debug)]
pub struct SuppressionHandle<N> {
    purpose: Suppression,
    style: Option<N>,
}

impl<N> SuppressionHandle<N> {
    pub fn purpose(&self) -> Suppression {
        self.purpose
    }

    pub fn is_released(&self) -> bool {
        self.style.is_none()
    }
}

/// Inserts and removes override styles on a host page
pub struct StyleSuppressor<'p, P: HostPage> {
    page: &'p P,
}

impl<'p, P: HostPage> StyleSuppressor<'p, P> {
    pub fn new(page: &'p P) -> Self {
        Self { page }
    }

    /// Insert `css` right away and hand back the handle that removes it
    pub fn apply_override(&self, purpose: Suppression, css: &str) -> Result<SuppressionHandle<P::Node>> {
        let style = self.page.insert_style(css)?;
        debug!("Applied {:?} override", purpose);
        Ok(SuppressionHandle { purpose, style: Some(style) })
    }

    /// Apply the stock CSS for `purpose`
    pub fn apply(&self, purpose: Suppression) -> Result<SuppressionHandle<P::Node>> {
        self.apply_override(purpose, purpose.css())
    }

    /// Remove the handle's element; releasing twice is a no-op
    pub fn release(&self, handle: &mut SuppressionHandle<P::Node>) {
        if let Some(style) = handle.style.take() {
            self.page.remove_node(&style);
            debug!("Released {:?} override", handle.purpose);
        }
    }
}
