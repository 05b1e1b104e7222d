// src/page.rs
// Host page surface and the collaborators the injection talks to

use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::error::Result;

/// Narrow view of the host document.
///
/// Everything the injection does to the page goes through here, so the
/// sequencer can run against an in-memory page in tests and against the
/// real document in the browser. `Node` is whatever handle the backend uses
/// for elements and shadow roots alike.
pub trait HostPage {
    type Node: Clone;

    /// URL of the document, captured by the caller once per run
    fn url(&self) -> String;

    /// True while the document is still parsing
    fn is_loading(&self) -> bool;

    /// Add or remove a class on the document root element
    fn set_root_class(&self, class: &str, enabled: bool);

    /// Append a `<style>` element with `css` to the document root element
    fn insert_style(&self, css: &str) -> Result<Self::Node>;

    /// Detach `node` from its parent; no-op if it is already detached
    fn remove_node(&self, node: &Self::Node);

    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// Element children of `node`, in document order
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn add_class(&self, node: &Self::Node, class: &str) -> Result<()>;

    /// Set an inline style property
    fn set_style(&self, node: &Self::Node, property: &str, value: &str) -> Result<()>;

    fn body(&self) -> Option<Self::Node>;

    /// Drop every child of `node` (the `innerHTML = ''` reset)
    fn clear_children(&self, node: &Self::Node);

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    fn create_element(&self, tag: &str) -> Result<Self::Node>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    fn set_inner_html(&self, node: &Self::Node, html: &str) -> Result<()>;

    /// Attach an open shadow root to `host`.
    ///
    /// Returns `None` when the environment has no shadow DOM support.
    fn attach_shadow(&self, host: &Self::Node) -> Option<Self::Node>;

    /// One-shot signal that fires when `node` dispatches `load`.
    ///
    /// A dropped sender means the listener could not be installed.
    fn load_signal(&self, node: &Self::Node) -> oneshot::Receiver<()>;
}

/// Suspension points supplied by the host environment
#[async_trait(?Send)]
pub trait Scheduler {
    /// Resolves once `DOMContentLoaded` fires
    async fn dom_content_loaded(&self);

    /// Resolves when the host reports the main thread as idle
    async fn idle(&self);

    async fn sleep(&self, duration: Duration);
}

/// Extension-side services: asset URLs and the theme toggle
pub trait ExtensionRuntime {
    /// Turn a packaged resource path into a loadable URL
    fn resolve_asset(&self, path: &str) -> String;

    fn activate_theme(&self);
}

/// The overlay application, opaque apart from its mount call
pub trait OverlayApp<N> {
    fn mount(&mut self, target: &N);
}
