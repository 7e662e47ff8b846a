// Content script: adds action buttons to posts that carry a directive
// (`#<network><vote|tip|stake><identifier>`), each opening the popup.

mod directive;
mod watcher;
mod web_page;

pub use directive::{Directive, UserAction};
pub use watcher::{HostPage, MutationWatcher};
pub use web_page::WebPage;

use crate::config::ExtensionConfig;
use crate::error::InjectionError;
use crate::event_loop::BrowserEventLoop;
use crate::messaging;
use crate::services::storage::StorageManager;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Document;

type PageWatcher = MutationWatcher<BrowserEventLoop, WebPage>;

/// Content-script entry point, called by the injected JS glue.
#[wasm_bindgen]
pub fn start_injection() {
    wasm_logger::init(wasm_logger::Config::default());
    wasm_bindgen_futures::spawn_local(async {
        let config = StorageManager::new().load_config().await;
        if let Err(e) = install(config) {
            log::error!("Content script not started: {}", e);
        }
    });
}

fn install(config: ExtensionConfig) -> Result<(), InjectionError> {
    let page = WebPage::new(config.watcher.clone(), &config.popup_page)?;
    let document = page.document().clone();
    let root_id = config.watcher.root_element_id.clone();
    let watcher = MutationWatcher::new(BrowserEventLoop, config.watcher, page);

    let on_navigation = watcher.clone();
    messaging::listen_for_navigation(move |signal| on_navigation.on_navigation(signal));

    if document.ready_state() == "complete" {
        on_document_complete(&watcher, &document, &root_id);
        return Ok(());
    }

    let doc = document.clone();
    let on_ready_state = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        match doc.ready_state().as_str() {
            "interactive" => log::debug!("Host page interactive"),
            "complete" => on_document_complete(&watcher, &doc, &root_id),
            _ => {}
        }
    });
    document.add_event_listener_with_callback(
        "readystatechange",
        on_ready_state.as_ref().unchecked_ref(),
    )?;
    on_ready_state.forget();
    Ok(())
}

fn on_document_complete(watcher: &PageWatcher, document: &Document, root_id: &str) {
    if document.get_element_by_id(root_id).is_none() {
        log::debug!("No #{} on this page, nothing to augment", root_id);
        return;
    }
    log::info!("Host page loaded, watching for posts");
    watcher.attach_observer();
    watcher.rescan();
}
