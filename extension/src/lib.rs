// Speckle browser extension
// The popup (Dioxus) and the content script share this crate; the service
// worker lives in the `background` binary.

pub mod chain;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod governance;
pub mod injection;
pub mod messaging;
pub mod networks;
pub mod poller;
pub mod routes;
pub mod services;

#[cfg(feature = "dioxus")]
mod app_context;
#[cfg(feature = "dioxus")]
mod components;
#[cfg(feature = "dioxus")]
pub mod icons;

#[cfg(feature = "dioxus")]
pub use popup::launch_popup;

#[cfg(feature = "dioxus")]
mod popup {
    use crate::app_context::AppContext;
    use crate::chain::JsChainClient;
    use crate::components::{Home, Vote};
    use crate::config::ExtensionConfig;
    use crate::icons;
    use crate::routes::Route;
    use crate::services::storage::{Settings, StorageManager};
    use dioxus::prelude::*;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    fn current_route() -> Route {
        let hash = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default();
        Route::from_hash(&hash)
    }

    #[component]
    fn App() -> Element {
        let boot = use_resource(|| async {
            let storage = StorageManager::new();
            let config = storage.load_config().await;
            let settings = storage.load_settings().await.unwrap_or_else(|e| {
                log::warn!("Starting with empty settings: {}", e);
                Settings::default()
            });
            (config, settings)
        });

        match &*boot.read_unchecked() {
            Some((config, settings)) => rsx! {
                Shell { config: config.clone(), settings: settings.clone() }
            },
            None => rsx! {
                div { class: "min-h-screen flex items-center justify-center text-gray-500",
                    icons::Loader { class: Some("w-6 h-6 animate-spin".to_string()) }
                }
            },
        }
    }

    #[component]
    fn Shell(config: ExtensionConfig, settings: Settings) -> Element {
        let settings = use_signal(|| settings);
        use_context_provider(|| AppContext::new(Rc::new(JsChainClient), config, settings));
        let route = use_hook(current_route);

        rsx! {
            div { class: "min-h-screen bg-gray-50 p-4",
                match route {
                    Route::Home => rsx! { Home {} },
                    Route::Vote { network, id } => rsx! { Vote { network, id } },
                    Route::Unsupported { action, network, identifier } => rsx! {
                        Unsupported { action, network, identifier }
                    },
                }
            }
        }
    }

    #[component]
    fn Unsupported(action: String, network: String, identifier: String) -> Element {
        log::warn!("No view for {} on {} ({})", action, network, identifier);
        rsx! {
            div { class: "max-w-md mx-auto mt-20 p-8 bg-white rounded-lg shadow-lg text-center",
                icons::AlertCircle { class: Some("w-8 h-8 mx-auto mb-4 text-yellow-500".to_string()) }
                p { class: "text-gray-700", "'{action}' is not available in the popup yet." }
                p { class: "mt-2 font-mono text-xs text-gray-500", "{network} / {identifier}" }
            }
        }
    }

    /// Popup entry point, called by popup.js once the wasm is loaded.
    #[wasm_bindgen]
    pub fn launch_popup() {
        wasm_logger::init(wasm_logger::Config::default());
        log::info!("Speckle popup starting...");
        dioxus::launch(App);
    }
}
