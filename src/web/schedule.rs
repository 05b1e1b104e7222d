// src/web/schedule.rs
// Scheduler over DOMContentLoaded, requestIdleCallback and gloo timers

use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Window};

use crate::page::Scheduler;

#[derive(Clone)]
pub struct WebScheduler {
    window: Window,
}

impl WebScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn has_idle_callback(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("requestIdleCallback")).unwrap_or(false)
    }
}

#[async_trait(?Send)]
impl Scheduler for WebScheduler {
    async fn dom_content_loaded(&self) {
        let Some(document) = self.window.document() else {
            return;
        };
        let (tx, rx) = oneshot::channel::<()>();
        let on_ready = Closure::once_into_js(move || {
            let _ = tx.send(());
        });
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        if let Err(e) = document.add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            on_ready.unchecked_ref(),
            &options,
        ) {
            log::warn!("Failed to listen for DOMContentLoaded, continuing now: {:?}", e);
            return;
        }
        let _ = rx.await;
    }

    async fn idle(&self) {
        let (tx, rx) = oneshot::channel::<()>();
        let callback = Closure::once_into_js(move || {
            let _ = tx.send(());
        });
        // Safari has no requestIdleCallback
        let scheduled = if self.has_idle_callback() {
            self.window.request_idle_callback(callback.unchecked_ref()).map(drop)
        } else {
            self.window
                .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 1)
                .map(drop)
        };
        if let Err(e) = scheduled {
            log::warn!("Idle scheduling failed, continuing now: {:?}", e);
            return;
        }
        let _ = rx.await;
    }

    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}
