// src/rewriter.rs
// Homepage takeover: empty the body and keep only the site's top bar

use log::{debug, warn};

use crate::page::HostPage;

const CHROME_SELECTOR: &str = ".bili-header";
const BAR_CLASS: &str = "bili-header__bar";
/// Site class that keeps the bar's background showing regardless of scroll
const PINNED_CLASS: &str = "slide-down";

pub struct HomepageRewriter<'p, P: HostPage> {
    page: &'p P,
}

impl<'p, P: HostPage> HomepageRewriter<'p, P> {
    pub fn new(page: &'p P) -> Self {
        Self { page }
    }

    /// Rebuild the body around the site's top bar.
    ///
    /// Returns the relocated chrome element, or `None` (with the body left
    /// alone) when the page has no top bar to keep.
    pub fn rewrite(&self) -> Option<P::Node> {
        let Some(chrome) = self.page.query_selector(CHROME_SELECTOR) else {
            warn!("Top bar {} not found, skipping homepage rewrite", CHROME_SELECTOR);
            return None;
        };
        let Some(body) = self.page.body() else {
            warn!("Document has no body, skipping homepage rewrite");
            return None;
        };

        let (bars, extras): (Vec<_>, Vec<_>) = self
            .page
            .children(&chrome)
            .into_iter()
            .partition(|child| self.page.has_class(child, BAR_CLASS));

        for bar in &bars {
            if let Err(e) = self.page.add_class(bar, PINNED_CLASS) {
                warn!("Failed to pin top bar: {}", e);
            }
        }

        self.page.clear_children(&body);

        // Hidden, not removed: host scripts may still hold these nodes.
        for extra in &extras {
            if let Err(e) = self.page.set_style(extra, "display", "none") {
                warn!("Failed to hide top bar content: {}", e);
            }
        }

        if let Err(e) = self.page.append_child(&body, &chrome) {
            warn!("Failed to reattach top bar: {}", e);
            return None;
        }

        debug!("Homepage rewritten, {} top bar extras hidden", extras.len());
        Some(chrome)
    }
}
