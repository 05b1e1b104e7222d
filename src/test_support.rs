// src/test_support.rs
// In-memory page, scheduler, runtime and overlay for tests

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::error::{InjectError, Result};
use crate::page::{ExtensionRuntime, HostPage, OverlayApp, Scheduler};

/// Everything the collaborators were asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    DomContentLoaded,
    Idle,
    Sleep(Duration),
    Theme,
    Mount(FakeNode),
}

pub type Journal = Rc<RefCell<Vec<Event>>>;

pub fn events(journal: &Journal) -> Vec<Event> {
    journal.borrow().clone()
}

// ============================================================================
// FakePage
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeNode(usize);

const HTML: usize = 0;
const HEAD: usize = 1;
const BODY: usize = 2;

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    children: Vec<usize>,
    parent: Option<usize>,
    /// Set on shadow roots
    host: Option<usize>,
}

struct Inner {
    url: String,
    loading: Cell<bool>,
    shadow_dom: Cell<bool>,
    load_listeners: Cell<bool>,
    nodes: RefCell<Vec<NodeData>>,
    loads: RefCell<HashMap<usize, oneshot::Sender<()>>>,
}

/// Arena-backed document with `html`, `head` and `body` preallocated.
///
/// Clones share the same document, so a test can keep one handle and give
/// another to the code under test.
#[derive(Clone)]
pub struct FakePage {
    inner: Rc<Inner>,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        let nodes = vec![
            NodeData { tag: "html".into(), children: vec![HEAD, BODY], ..Default::default() },
            NodeData { tag: "head".into(), parent: Some(HTML), ..Default::default() },
            NodeData { tag: "body".into(), parent: Some(HTML), ..Default::default() },
        ];
        Self {
            inner: Rc::new(Inner {
                url: url.to_string(),
                loading: Cell::new(false),
                shadow_dom: Cell::new(true),
                load_listeners: Cell::new(true),
                nodes: RefCell::new(nodes),
                loads: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Document still parsing when the script starts
    pub fn loading(self) -> Self {
        self.inner.loading.set(true);
        self
    }

    pub fn without_shadow_dom(self) -> Self {
        self.inner.shadow_dom.set(false);
        self
    }

    /// `load` listeners cannot be installed; signals are dropped at once
    pub fn with_broken_load_listeners(self) -> Self {
        self.inner.load_listeners.set(false);
        self
    }

    /// Body holding the site header (bar + banner) and the feed
    pub fn with_homepage_markup(self) -> Self {
        let body = FakeNode(BODY);
        let header = self.element("div", &["bili-header"]);
        let bar = self.element("div", &["bili-header__bar"]);
        let banner = self.element("div", &["bili-header__banner"]);
        let feed = self.element("main", &["bili-feed4"]);
        self.append_child(&header, &bar).unwrap();
        self.append_child(&header, &banner).unwrap();
        self.append_child(&body, &header).unwrap();
        self.append_child(&body, &feed).unwrap();
        self
    }

    fn element(&self, tag: &str, classes: &[&str]) -> FakeNode {
        let node = self.create_element(tag).unwrap();
        for class in classes {
            self.add_class(&node, class).unwrap();
        }
        node
    }

    pub fn root_has_class(&self, class: &str) -> bool {
        self.has_class(&FakeNode(HTML), class)
    }

    /// CSS text of every `<style>` attached to the root element
    pub fn root_styles(&self) -> Vec<String> {
        let nodes = self.inner.nodes.borrow();
        nodes[HTML]
            .children
            .iter()
            .filter(|&&id| nodes[id].tag == "style")
            .map(|&id| nodes[id].text.clone())
            .collect()
    }

    /// Reachable from the root element, crossing shadow boundaries
    pub fn is_attached(&self, node: &FakeNode) -> bool {
        let nodes = self.inner.nodes.borrow();
        let mut current = node.0;
        loop {
            if current == HTML {
                return true;
            }
            match (nodes[current].parent, nodes[current].host) {
                (Some(parent), _) => current = parent,
                (None, Some(host)) => current = host,
                (None, None) => return false,
            }
        }
    }

    pub fn style_of(&self, node: &FakeNode, property: &str) -> Option<String> {
        self.inner.nodes.borrow()[node.0].styles.get(property).cloned()
    }

    pub fn attribute(&self, node: &FakeNode, name: &str) -> Option<String> {
        self.inner.nodes.borrow()[node.0].attributes.get(name).cloned()
    }

    pub fn inner_html(&self, node: &FakeNode) -> String {
        self.inner.nodes.borrow()[node.0].text.clone()
    }

    pub fn tag(&self, node: &FakeNode) -> String {
        self.inner.nodes.borrow()[node.0].tag.clone()
    }

    pub fn shadow_root(&self, host: &FakeNode) -> Option<FakeNode> {
        let nodes = self.inner.nodes.borrow();
        nodes.iter().position(|n| n.host == Some(host.0)).map(FakeNode)
    }

    /// Attached elements carrying `id`
    pub fn elements_with_id(&self, id: &str) -> Vec<FakeNode> {
        let count = self.inner.nodes.borrow().len();
        (0..count)
            .map(FakeNode)
            .filter(|n| self.attribute(n, "id").as_deref() == Some(id) && self.is_attached(n))
            .collect()
    }

    /// Every element with `tag`, attached or not, in creation order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<FakeNode> {
        let nodes = self.inner.nodes.borrow();
        nodes.iter().enumerate().filter(|(_, n)| n.tag == tag).map(|(i, _)| FakeNode(i)).collect()
    }

    /// Dispatch `load` on `node`
    pub fn fire_load(&self, node: &FakeNode) {
        if let Some(tx) = self.inner.loads.borrow_mut().remove(&node.0) {
            let _ = tx.send(());
        }
    }

    fn detach(nodes: &mut [NodeData], id: usize) {
        if let Some(parent) = nodes[id].parent.take() {
            nodes[parent].children.retain(|&c| c != id);
        }
    }

    fn push(&self, data: NodeData) -> FakeNode {
        let mut nodes = self.inner.nodes.borrow_mut();
        nodes.push(data);
        FakeNode(nodes.len() - 1)
    }
}

impl HostPage for FakePage {
    type Node = FakeNode;

    fn url(&self) -> String {
        self.inner.url.clone()
    }

    fn is_loading(&self) -> bool {
        self.inner.loading.get()
    }

    fn set_root_class(&self, class: &str, enabled: bool) {
        let mut nodes = self.inner.nodes.borrow_mut();
        let classes = &mut nodes[HTML].classes;
        classes.retain(|c| c != class);
        if enabled {
            classes.push(class.to_string());
        }
    }

    fn insert_style(&self, css: &str) -> Result<FakeNode> {
        let style = self.push(NodeData { tag: "style".into(), text: css.to_string(), ..Default::default() });
        self.append_child(&FakeNode(HTML), &style)?;
        Ok(style)
    }

    fn remove_node(&self, node: &FakeNode) {
        Self::detach(&mut self.inner.nodes.borrow_mut(), node.0);
    }

    fn query_selector(&self, selector: &str) -> Option<FakeNode> {
        let class = selector.strip_prefix('.')?;
        let nodes = self.inner.nodes.borrow();
        let mut stack = vec![HTML];
        while let Some(id) = stack.pop() {
            if nodes[id].classes.iter().any(|c| c == class) {
                return Some(FakeNode(id));
            }
            stack.extend(nodes[id].children.iter().rev());
        }
        None
    }

    fn children(&self, node: &FakeNode) -> Vec<FakeNode> {
        self.inner.nodes.borrow()[node.0].children.iter().copied().map(FakeNode).collect()
    }

    fn has_class(&self, node: &FakeNode, class: &str) -> bool {
        self.inner.nodes.borrow()[node.0].classes.iter().any(|c| c == class)
    }

    fn add_class(&self, node: &FakeNode, class: &str) -> Result<()> {
        let mut nodes = self.inner.nodes.borrow_mut();
        let classes = &mut nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        Ok(())
    }

    fn set_style(&self, node: &FakeNode, property: &str, value: &str) -> Result<()> {
        let mut nodes = self.inner.nodes.borrow_mut();
        nodes[node.0].styles.insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn body(&self) -> Option<FakeNode> {
        Some(FakeNode(BODY))
    }

    fn clear_children(&self, node: &FakeNode) {
        let mut nodes = self.inner.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[node.0].children);
        for child in children {
            nodes[child].parent = None;
        }
        nodes[node.0].text.clear();
    }

    fn append_child(&self, parent: &FakeNode, child: &FakeNode) -> Result<()> {
        if parent == child {
            return Err(InjectError::Dom("cannot append a node to itself".into()));
        }
        let mut nodes = self.inner.nodes.borrow_mut();
        Self::detach(&mut nodes, child.0);
        nodes[child.0].parent = Some(parent.0);
        nodes[parent.0].children.push(child.0);
        Ok(())
    }

    fn create_element(&self, tag: &str) -> Result<FakeNode> {
        Ok(self.push(NodeData { tag: tag.to_string(), ..Default::default() }))
    }

    fn set_attribute(&self, node: &FakeNode, name: &str, value: &str) -> Result<()> {
        let mut nodes = self.inner.nodes.borrow_mut();
        nodes[node.0].attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_inner_html(&self, node: &FakeNode, html: &str) -> Result<()> {
        self.clear_children(node);
        self.inner.nodes.borrow_mut()[node.0].text = html.to_string();
        Ok(())
    }

    fn attach_shadow(&self, host: &FakeNode) -> Option<FakeNode> {
        if !self.inner.shadow_dom.get() {
            return None;
        }
        Some(self.push(NodeData { tag: "#shadow-root".into(), host: Some(host.0), ..Default::default() }))
    }

    fn load_signal(&self, node: &FakeNode) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        if self.inner.load_listeners.get() {
            self.inner.loads.borrow_mut().insert(node.0, tx);
        }
        rx
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Scheduler whose waits resolve at once unless idle is gated
#[derive(Clone, Default)]
pub struct FakeScheduler {
    journal: Journal,
    idle_gate: Rc<RefCell<Option<oneshot::Receiver<()>>>>,
}

impl FakeScheduler {
    pub fn new(journal: &Journal) -> Self {
        Self { journal: journal.clone(), idle_gate: Rc::default() }
    }

    /// Hold the next idle callback until the returned sender fires
    pub fn gate_idle(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.idle_gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl Scheduler for FakeScheduler {
    async fn dom_content_loaded(&self) {
        self.journal.borrow_mut().push(Event::DomContentLoaded);
    }

    async fn idle(&self) {
        self.journal.borrow_mut().push(Event::Idle);
        let gate = self.idle_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }

    async fn sleep(&self, duration: Duration) {
        self.journal.borrow_mut().push(Event::Sleep(duration));
    }
}

pub struct FakeRuntime {
    journal: Journal,
}

impl FakeRuntime {
    pub fn new(journal: &Journal) -> Self {
        Self { journal: journal.clone() }
    }
}

impl ExtensionRuntime for FakeRuntime {
    fn resolve_asset(&self, path: &str) -> String {
        format!("chrome-extension://bewly/{}", path)
    }

    fn activate_theme(&self) {
        self.journal.borrow_mut().push(Event::Theme);
    }
}

pub struct FakeOverlay {
    journal: Journal,
}

impl FakeOverlay {
    pub fn new(journal: &Journal) -> Self {
        Self { journal: journal.clone() }
    }
}

impl OverlayApp<FakeNode> for FakeOverlay {
    fn mount(&mut self, target: &FakeNode) {
        self.journal.borrow_mut().push(Event::Mount(*target));
    }
}
