// src/web/dom.rs
// HostPage over the live document via web-sys

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DocumentReadyState, Element, HtmlElement, Node, ShadowRootInit, ShadowRootMode, Window};

use crate::error::{InjectError, Result};
use crate::page::HostPage;

pub(crate) fn js_err(e: JsValue) -> InjectError {
    InjectError::Dom(format!("{:?}", e))
}

#[derive(Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| InjectError::Dom("no window".into()))?;
        let document = window.document().ok_or_else(|| InjectError::Dom("no document".into()))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn root(&self) -> Result<Element> {
        self.document
            .document_element()
            .ok_or_else(|| InjectError::Dom("document has no root element".into()))
    }

    fn as_element(node: &Node) -> Result<&Element> {
        node.dyn_ref::<Element>().ok_or_else(|| InjectError::Dom("node is not an element".into()))
    }
}

impl HostPage for WebPage {
    type Node = Node;

    fn url(&self) -> String {
        self.document.url().unwrap_or_default()
    }

    fn is_loading(&self) -> bool {
        self.document.ready_state() == DocumentReadyState::Loading
    }

    fn set_root_class(&self, class: &str, enabled: bool) {
        let Ok(root) = self.root() else { return };
        let list = root.class_list();
        let toggled = if enabled { list.add_1(class) } else { list.remove_1(class) };
        if let Err(e) = toggled {
            log::warn!("Failed to toggle root class {}: {:?}", class, e);
        }
    }

    fn insert_style(&self, css: &str) -> Result<Node> {
        let style = self.document.create_element("style").map_err(js_err)?;
        style.set_text_content(Some(css));
        self.root()?.append_child(&style).map_err(js_err)?;
        Ok(style.into())
    }

    fn remove_node(&self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(node);
        }
    }

    fn query_selector(&self, selector: &str) -> Option<Node> {
        self.document.query_selector(selector).ok().flatten().map(Into::into)
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let Some(element) = node.dyn_ref::<Element>() else {
            return Vec::new();
        };
        let children = element.children();
        (0..children.length()).filter_map(|i| children.item(i)).map(Into::into).collect()
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        node.dyn_ref::<Element>().is_some_and(|el| el.class_list().contains(class))
    }

    fn add_class(&self, node: &Node, class: &str) -> Result<()> {
        Self::as_element(node)?.class_list().add_1(class).map_err(js_err)
    }

    fn set_style(&self, node: &Node, property: &str, value: &str) -> Result<()> {
        let element = node
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| InjectError::Dom("node has no inline style".into()))?;
        element.style().set_property(property, value).map_err(js_err)
    }

    fn body(&self) -> Option<Node> {
        self.document.body().map(Into::into)
    }

    fn clear_children(&self, node: &Node) {
        if let Some(element) = node.dyn_ref::<Element>() {
            element.set_inner_html("");
        }
    }

    fn append_child(&self, parent: &Node, child: &Node) -> Result<()> {
        parent.append_child(child).map(drop).map_err(js_err)
    }

    fn create_element(&self, tag: &str) -> Result<Node> {
        self.document.create_element(tag).map(Into::into).map_err(js_err)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<()> {
        Self::as_element(node)?.set_attribute(name, value).map_err(js_err)
    }

    fn set_inner_html(&self, node: &Node, html: &str) -> Result<()> {
        Self::as_element(node)?.set_inner_html(html);
        Ok(())
    }

    fn attach_shadow(&self, host: &Node) -> Option<Node> {
        let element = host.dyn_ref::<Element>()?;
        // Old engines lack the method entirely
        if !js_sys::Reflect::has(element, &JsValue::from_str("attachShadow")).unwrap_or(false) {
            return None;
        }
        match element.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open)) {
            Ok(shadow) => Some(shadow.into()),
            Err(e) => {
                log::warn!("attachShadow failed: {:?}", e);
                None
            }
        }
    }

    fn load_signal(&self, node: &Node) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let slot = Rc::new(RefCell::new(Some(tx)));
        let fire = slot.clone();
        let on_load = Closure::once_into_js(move || {
            if let Some(tx) = fire.borrow_mut().take() {
                let _ = tx.send(());
            }
        });
        if let Err(e) = node.add_event_listener_with_callback("load", on_load.unchecked_ref()) {
            log::warn!("Failed to listen for load: {:?}", e);
            // dropping the sender tells the receiver no signal is coming
            slot.borrow_mut().take();
        }
        rx
    }
}
