// src/sequencer.rs
// Injection state machine: classify, suppress, wait for DOM, rewrite, release, mount

use log::{debug, info, warn};

use crate::classifier::{Classification, PageClassifier};
use crate::config::{InjectConfig, Settings};
use crate::error::Result;
use crate::mounter::{MountedOverlay, OverlayMounter};
use crate::page::{ExtensionRuntime, HostPage, OverlayApp, Scheduler};
use crate::rewriter::HomepageRewriter;
use crate::suppressor::{StyleSuppressor, Suppression, SuppressionHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Loading,
    DomReady,
    Rewriting,
    SuppressionReleased,
    ImmediateMount,
    IdleScheduled,
    Mounted,
    Skipped,
}

impl SequencerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SequencerState::Mounted | SequencerState::Skipped)
    }
}

/// What a finished run left behind
#[derive(Debug)]
pub struct Injection<N> {
    /// `Mounted` or `Skipped`
    pub state: SequencerState,
    /// Every state entered, starting at `Loading`
    pub transitions: Vec<SequencerState>,
    pub classification: Classification,
    /// Top bar relocated by the homepage takeover
    pub chrome: Option<N>,
    pub overlay: Option<MountedOverlay<N>>,
}

/// One injection run for one page load.
///
/// [`start`](Self::start) does the synchronous part (classification, root
/// class, style overrides) and must be called while the script is first
/// evaluated. [`run`](Self::run) consumes the sequencer and does the rest.
pub struct InjectionSequencer<P: HostPage, S: Scheduler, R: ExtensionRuntime> {
    page: P,
    scheduler: S,
    runtime: R,
    settings: Settings,
    config: InjectConfig,
    classification: Classification,
    handles: Vec<SuppressionHandle<P::Node>>,
    transitions: Vec<SequencerState>,
}

impl<P: HostPage, S: Scheduler, R: ExtensionRuntime> InjectionSequencer<P, S, R> {
    pub fn start(
        page: P,
        scheduler: S,
        runtime: R,
        classifier: &PageClassifier,
        settings: Settings,
        config: InjectConfig,
    ) -> Self {
        let url = page.url();
        let classification = classifier.classify(&url);
        debug!("Classified {} as {:?}", url, classification);

        let mut sequencer = Self {
            page,
            scheduler,
            runtime,
            settings,
            config,
            classification,
            handles: Vec::new(),
            transitions: vec![SequencerState::Loading],
        };
        sequencer.prepare();
        sequencer
    }

    fn prepare(&mut self) {
        let page_kind = self.classification;
        let adapt = self.settings.adapt_to_other_page_styles;

        if page_kind.eligible && adapt {
            self.runtime.activate_theme();
            self.page.set_root_class(self.config.root_class, true);
        } else {
            self.page.set_root_class(self.config.root_class, false);
        }

        let mut wanted = Vec::new();
        if adapt && page_kind.home {
            wanted.extend([Suppression::HomepageBody, Suppression::FadeIn]);
        }
        if page_kind.eligible && !self.settings.use_original_bilibili_top_bar {
            wanted.push(Suppression::TopBar);
        }

        let suppressor = StyleSuppressor::new(&self.page);
        for purpose in wanted {
            match suppressor.apply(purpose) {
                Ok(handle) => self.handles.push(handle),
                Err(e) => warn!("Could not apply {:?} override: {}", purpose, e),
            }
        }
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn state(&self) -> SequencerState {
        self.transitions.last().copied().unwrap_or(SequencerState::Loading)
    }

    fn enter(&mut self, state: SequencerState) {
        debug!("Injection state: {:?} -> {:?}", self.state(), state);
        self.transitions.push(state);
    }

    fn homepage_takeover(&self) -> bool {
        self.classification.home && !self.settings.use_original_bilibili_homepage
    }

    fn release_all(&mut self) {
        let suppressor = StyleSuppressor::new(&self.page);
        for handle in &mut self.handles {
            suppressor.release(handle);
        }
        self.handles.clear();
    }

    /// Drive the run to `Mounted` or `Skipped`.
    ///
    /// Style overrides are released before any mount attempt, so an `Err`
    /// from mounting never leaves one attached.
    pub async fn run<A: OverlayApp<P::Node>>(mut self, mut app: A) -> Result<Injection<P::Node>> {
        // Checked once; a document past `loading` has already fired DOMContentLoaded
        if self.page.is_loading() {
            self.scheduler.dom_content_loaded().await;
        }
        self.enter(SequencerState::DomReady);

        let takeover = self.homepage_takeover();
        let chrome = if takeover {
            self.enter(SequencerState::Rewriting);
            HomepageRewriter::new(&self.page).rewrite()
        } else {
            None
        };

        self.release_all();
        self.enter(SequencerState::SuppressionReleased);

        if !self.classification.eligible {
            info!("Page not supported, overlay skipped");
            self.enter(SequencerState::Skipped);
            return Ok(self.finish(chrome, None));
        }

        if takeover {
            // The body is already rebuilt; nothing to gain from waiting
            self.enter(SequencerState::ImmediateMount);
        } else {
            self.enter(SequencerState::IdleScheduled);
            self.scheduler.idle().await;
        }

        let overlay = OverlayMounter::new(&self.page, &self.runtime, &self.config).mount(&mut app)?;
        self.enter(SequencerState::Mounted);
        Ok(self.finish(chrome, Some(overlay)))
    }

    fn finish(&mut self, chrome: Option<P::Node>, overlay: Option<MountedOverlay<P::Node>>) -> Injection<P::Node> {
        Injection {
            state: self.state(),
            transitions: std::mem::take(&mut self.transitions),
            classification: self.classification,
            chrome,
            overlay,
        }
    }
}

impl<P: HostPage, S: Scheduler, R: ExtensionRuntime> Drop for InjectionSequencer<P, S, R> {
    fn drop(&mut self) {
        // A sequencer dropped before `run` finishes still owes its releases
        self.release_all();
    }
}
