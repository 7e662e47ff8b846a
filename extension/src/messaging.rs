// Extension message channel
// Content script -> background: ExtensionMessage (JSON). Background -> tab: NavigationSignal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    fn runtime_send_message(
        message: JsValue,
        callback: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    fn runtime_get_url(path: &str) -> String;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message_add_listener(handler: &Closure<dyn FnMut(JsValue, JsValue, JsValue)>);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtensionMessage {
    /// Open an extension page in its own window
    CreateWindow { url: String },
}

/// Page-navigation notifications the background forwards to content scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationSignal {
    /// The host page changed its URL without reloading.
    UrlUpdate,
    /// The host page rebuilt its document; observers must be reinstalled.
    SoftReload,
}

impl NavigationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationSignal::UrlUpdate => "url-update",
            NavigationSignal::SoftReload => "softreload",
        }
    }

    /// Signal to send for a tab update, if any.
    pub fn for_tab_update(url_changed: bool, load_complete: bool) -> Option<Self> {
        match (url_changed, load_complete) {
            (true, _) => Some(NavigationSignal::UrlUpdate),
            (false, true) => Some(NavigationSignal::SoftReload),
            (false, false) => None,
        }
    }
}

impl fmt::Display for NavigationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url-update" => Ok(NavigationSignal::UrlUpdate),
            "softreload" => Ok(NavigationSignal::SoftReload),
            other => Err(format!("unknown navigation signal '{}'", other)),
        }
    }
}

/// Absolute URL of a page bundled with the extension.
pub fn extension_url(path: &str) -> String {
    runtime_get_url(path)
}

/// Fire-and-forget message to the background worker.
pub fn send_message(message: &ExtensionMessage) {
    let payload = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Could not encode {:?}: {}", message, e);
            return;
        }
    };
    let payload = match js_sys::JSON::parse(&payload) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Could not build message object: {:?}", e);
            return;
        }
    };
    // freed by wasm-bindgen after the browser invokes it
    let on_reply = Closure::once_into_js(move |reply: JsValue| {
        log::debug!("Background replied: {:?}", reply);
    });
    if let Err(e) = runtime_send_message(payload, &on_reply) {
        log::error!("chrome.runtime.sendMessage failed: {:?}", e);
    }
}

/// What the background worker answers to a message: `{"open": url}` asks
/// the glue to open a popup window, anything unrecognised is ignored.
pub fn background_reply(message_json: &str) -> serde_json::Value {
    match serde_json::from_str::<ExtensionMessage>(message_json) {
        Ok(ExtensionMessage::CreateWindow { url }) => serde_json::json!({ "open": url }),
        Err(e) => {
            log::debug!("Ignoring message {}: {}", message_json, e);
            serde_json::json!({ "ignored": true })
        }
    }
}

/// Invoke `handler` for every navigation signal delivered to this script.
pub fn listen_for_navigation(handler: impl Fn(NavigationSignal) + 'static) {
    let listener = Closure::<dyn FnMut(JsValue, JsValue, JsValue)>::new(
        move |message: JsValue, _sender: JsValue, _send_response: JsValue| {
            let Some(text) = message.as_string() else {
                return;
            };
            match text.parse::<NavigationSignal>() {
                Ok(signal) => handler(signal),
                Err(e) => log::debug!("{}", e),
            }
        },
    );
    runtime_on_message_add_listener(&listener);
    listener.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_window_wire_format() {
        let message = ExtensionMessage::CreateWindow {
            url: "chrome-extension://id/popup.html#/vote/kusama/12".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["action"], "createWindow");
        assert_eq!(json["url"], "chrome-extension://id/popup.html#/vote/kusama/12");

        let back: ExtensionMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_navigation_signal_strings() {
        assert_eq!("url-update".parse(), Ok(NavigationSignal::UrlUpdate));
        assert_eq!("softreload".parse(), Ok(NavigationSignal::SoftReload));
        assert!("reload".parse::<NavigationSignal>().is_err());
        assert_eq!(NavigationSignal::SoftReload.to_string(), "softreload");
    }

    #[test]
    fn test_signal_for_tab_update() {
        assert_eq!(NavigationSignal::for_tab_update(true, false), Some(NavigationSignal::UrlUpdate));
        assert_eq!(NavigationSignal::for_tab_update(true, true), Some(NavigationSignal::UrlUpdate));
        assert_eq!(NavigationSignal::for_tab_update(false, true), Some(NavigationSignal::SoftReload));
        assert_eq!(NavigationSignal::for_tab_update(false, false), None);
    }

    #[test]
    fn test_background_reply() {
        let reply = background_reply(r#"{"action":"createWindow","url":"popup.html#/vote/kusama/3"}"#);
        assert_eq!(reply, serde_json::json!({ "open": "popup.html#/vote/kusama/3" }));

        assert_eq!(background_reply(r#"{"action":"ping"}"#), serde_json::json!({ "ignored": true }));
        assert_eq!(background_reply("not json"), serde_json::json!({ "ignored": true }));
    }
}
