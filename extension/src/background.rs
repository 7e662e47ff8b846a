// Background service worker for Speckle
// JavaScript glue owns the chrome.* event registrations and calls in here.

use speckle_extension::messaging::{background_reply, NavigationSignal};
use wasm_bindgen::prelude::*;

// Dummy main for binary target
fn main() {}

#[wasm_bindgen]
pub fn init_background() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Speckle background service initialized");
}

#[wasm_bindgen]
pub fn handle_install() {
    log::info!("Extension installed or updated");
}

/// Handle a runtime message from a content script or the popup.
/// Returns `{"open": url}` when the glue should open a popup window.
#[wasm_bindgen]
pub fn handle_message(message: JsValue) -> JsValue {
    let json = match js_sys::JSON::stringify(&message) {
        Ok(json) => String::from(json),
        Err(e) => {
            log::warn!("Unreadable message: {:?}", e);
            return JsValue::UNDEFINED;
        }
    };
    let reply = background_reply(&json);
    js_sys::JSON::parse(&reply.to_string()).unwrap_or(JsValue::UNDEFINED)
}

/// Navigation signal to forward to a tab after `chrome.tabs.onUpdated`,
/// or `undefined` when the update is not interesting.
#[wasm_bindgen]
pub fn tab_navigation_signal(url_changed: bool, load_complete: bool) -> JsValue {
    match NavigationSignal::for_tab_update(url_changed, load_complete) {
        Some(signal) => {
            log::debug!("Forwarding {} to tab", signal);
            JsValue::from_str(signal.as_str())
        }
        None => JsValue::UNDEFINED,
    }
}
