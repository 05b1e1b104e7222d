// src/mounter.rs
// Builds the overlay's isolated container and hands it to the overlay app

use std::time::Duration;

use futures::channel::oneshot;
use log::{debug, info, warn};

use crate::config::InjectConfig;
use crate::error::{InjectError, Result};
use crate::icons::SVG_ICONS;
use crate::page::{ExtensionRuntime, HostPage, OverlayApp, Scheduler};

/// One-shot builder for the overlay container
pub struct OverlayMounter<'a, P: HostPage, R: ExtensionRuntime> {
    page: &'a P,
    runtime: &'a R,
    config: &'a InjectConfig,
}

impl<'a, P: HostPage, R: ExtensionRuntime> OverlayMounter<'a, P, R> {
    pub fn new(page: &'a P, runtime: &'a R, config: &'a InjectConfig) -> Self {
        Self { page, runtime, config }
    }

    /// Create the container, fill its shadow root and mount `app` inside.
    ///
    /// The container starts transparent; call [`MountedOverlay::reveal`]
    /// to fade it in once the stylesheet is ready.
    pub fn mount<A: OverlayApp<P::Node>>(self, app: &mut A) -> Result<MountedOverlay<P::Node>> {
        let page = self.page;
        let body = page.body().ok_or(InjectError::NoBody)?;

        let container = page.create_element("div")?;
        page.set_attribute(&container, "id", self.config.container_id)?;
        let root = page.create_element("div")?;
        let link = page.create_element("link")?;

        // Open shadow root so host styles stay out and ours stay in
        let (boundary, isolated) = match page.attach_shadow(&container) {
            Some(shadow) => (shadow, true),
            None => {
                warn!("Shadow DOM unavailable, overlay styles are not isolated");
                (container.clone(), false)
            }
        };

        let href = self.runtime.resolve_asset(self.config.stylesheet);
        page.set_attribute(&link, "rel", "stylesheet")?;
        page.set_attribute(&link, "href", &href)?;
        let loaded = page.load_signal(&link);
        page.append_child(&boundary, &link)?;
        page.append_child(&boundary, &root)?;

        page.set_style(&container, "opacity", "0")?;
        page.set_style(&container, "transition", &self.config.fade_transition())?;

        let icons = page.create_element("div")?;
        page.set_inner_html(&icons, SVG_ICONS)?;
        page.append_child(&boundary, &icons)?;

        page.append_child(&body, &container)?;
        app.mount(&root);
        info!("Overlay mounted (stylesheet: {}, isolated: {})", href, isolated);

        Ok(MountedOverlay {
            container,
            root,
            isolated,
            loaded,
            reveal_delay: self.config.reveal_delay,
        })
    }
}

/// How the fade-in ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Visible,
    /// The load listener went away; the overlay stays transparent
    StylesheetUnavailable,
}

/// A mounted, still transparent overlay
#[derive(Debug)]
pub struct MountedOverlay<N> {
    container: N,
    root: N,
    isolated: bool,
    loaded: oneshot::Receiver<()>,
    reveal_delay: Duration,
}

impl<N: Clone> MountedOverlay<N> {
    pub fn container(&self) -> &N {
        &self.container
    }

    /// Node the overlay app was mounted into
    pub fn root(&self) -> &N {
        &self.root
    }

    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    /// Fade the container in after its stylesheet loads.
    ///
    /// There is no timeout: if `load` never fires this never resolves and
    /// the overlay stays at opacity 0.
    pub async fn reveal<P, S>(self, page: &P, scheduler: &S) -> Result<Reveal>
    where
        P: HostPage<Node = N>,
        S: Scheduler,
    {
        if self.loaded.await.is_err() {
            warn!("Overlay stylesheet load signal lost, overlay stays hidden");
            return Ok(Reveal::StylesheetUnavailable);
        }
        debug!("Overlay stylesheet loaded, revealing in {:?}", self.reveal_delay);
        scheduler.sleep(self.reveal_delay).await;
        page.set_style(&self.container, "opacity", "1")?;
        Ok(Reveal::Visible)
    }
}
