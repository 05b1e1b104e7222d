// src/web/mod.rs
// Browser entry point: wires the sequencer to the live page and the extension bridge

mod dom;
mod schedule;

pub use dom::WebPage;
pub use schedule::WebScheduler;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Node;

use crate::classifier::PageClassifier;
use crate::config::{InjectConfig, Settings};
use crate::error::InjectError;
use crate::mounter::Reveal;
use crate::page::{ExtensionRuntime, OverlayApp};
use crate::sequencer::InjectionSequencer;

#[wasm_bindgen]
extern "C" {
    /// Collaborators supplied by the extension's JS loader
    pub type ContentBridge;

    #[wasm_bindgen(method, js_name = resolveAsset)]
    fn resolve_asset(this: &ContentBridge, path: &str) -> String;

    #[wasm_bindgen(method, js_name = activateTheme)]
    fn activate_theme(this: &ContentBridge);

    #[wasm_bindgen(method, js_name = mountOverlay)]
    fn mount_overlay(this: &ContentBridge, target: &Node);
}

struct BridgeRuntime(ContentBridge);

impl ExtensionRuntime for BridgeRuntime {
    fn resolve_asset(&self, path: &str) -> String {
        self.0.resolve_asset(path)
    }

    fn activate_theme(&self) {
        self.0.activate_theme();
    }
}

struct BridgeOverlay(ContentBridge);

impl OverlayApp<Node> for BridgeOverlay {
    fn mount(&mut self, target: &Node) {
        self.0.mount_overlay(target);
    }
}

fn to_js(err: InjectError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Run the injection for the current page.
///
/// Classification and style overrides happen before this returns; the
/// DOM-ready wait, mount and fade-in continue on the microtask queue.
#[wasm_bindgen(js_name = runContentScript)]
pub fn run_content_script(settings_json: &str, bridge: ContentBridge) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Info);

    let settings = Settings::from_json(settings_json).map_err(to_js)?;
    let page = WebPage::from_window().map_err(to_js)?;
    let scheduler = WebScheduler::new(page.window().clone());

    let sequencer = InjectionSequencer::start(
        page.clone(),
        scheduler.clone(),
        BridgeRuntime(bridge.clone()),
        PageClassifier::builtin(),
        settings,
        InjectConfig::default(),
    );
    log::info!("BewlyBewly content script started ({:?})", sequencer.classification());

    spawn_local(async move {
        let injection = match sequencer.run(BridgeOverlay(bridge)).await {
            Ok(injection) => injection,
            Err(e) => {
                log::error!("Overlay injection failed: {}", e);
                return;
            }
        };
        let Some(overlay) = injection.overlay else {
            return;
        };
        match overlay.reveal(&page, &scheduler).await {
            Ok(Reveal::Visible) => log::debug!("Overlay visible"),
            Ok(Reveal::StylesheetUnavailable) => {}
            Err(e) => log::error!("Overlay reveal failed: {}", e),
        }
    });

    Ok(())
}
