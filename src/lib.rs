// src/lib.rs
// BewlyBewly content script core: decides whether a page gets the overlay
// and sequences the injection around the host page's own load

pub mod classifier;
pub mod config;
pub mod error;
pub mod icons;
pub mod mounter;
pub mod page;
pub mod rewriter;
pub mod sequencer;
pub mod suppressor;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

pub use classifier::{Classification, PageClassifier};
pub use config::{InjectConfig, Settings};
pub use error::{InjectError, Result};
pub use mounter::{MountedOverlay, OverlayMounter, Reveal};
pub use page::{ExtensionRuntime, HostPage, OverlayApp, Scheduler};
pub use rewriter::HomepageRewriter;
pub use sequencer::{Injection, InjectionSequencer, SequencerState};
pub use suppressor::{StyleSuppressor, Suppression, SuppressionHandle};
