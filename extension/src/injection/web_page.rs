// HostPage over the live DOM (web-sys)

use super::directive::Directive;
use super::watcher::HostPage;
use crate::config::WatcherConfig;
use crate::error::InjectionError;
use crate::messaging::{self, ExtensionMessage};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MutationObserver, MutationObserverInit};

pub struct WebPage {
    document: Document,
    config: WatcherConfig,
    /// Absolute URL of the popup page, without route
    popup_url: String,
}

/// Installed MutationObserver. Disconnects on drop.
pub struct DomObserver {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl Drop for DomObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

impl WebPage {
    pub fn new(config: WatcherConfig, popup_page: &str) -> Result<Self, InjectionError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(InjectionError::NoDocument)?;
        Ok(Self {
            document,
            config,
            popup_url: messaging::extension_url(popup_page),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn collect(collection: web_sys::HtmlCollection) -> Vec<Element> {
    (0..collection.length())
        .filter_map(|i| collection.item(i))
        .collect()
}

impl HostPage for WebPage {
    type Element = Element;
    type Observer = DomObserver;

    fn content_elements(&self) -> Vec<Element> {
        collect(
            self.document
                .get_elements_by_class_name(&self.config.content_class),
        )
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn text(&self, element: &Element) -> String {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => html.inner_text(),
            None => element.text_content().unwrap_or_default(),
        }
    }

    fn button_container(&self, element: &Element) -> Option<Element> {
        element
            .get_elements_by_class_name(&self.config.button_container_class)
            .item(0)
    }

    fn is_augmented(&self, container: &Element) -> bool {
        container
            .class_list()
            .contains(&self.config.augmented_marker)
    }

    fn mark_augmented(&self, container: &Element) {
        if let Err(e) = container.class_list().add_1(&self.config.augmented_marker) {
            log::warn!("Could not mark button row: {:?}", e);
        }
    }

    fn inject_control(&self, container: &Element, directive: &Directive) -> Result<(), InjectionError> {
        let wrapper = self.document.create_element("div")?;
        wrapper.set_class_name(&self.config.button_wrapper_class);

        let button = self.document.create_element("button")?;
        button.set_class_name(&directive.action.button_class());

        let message = ExtensionMessage::CreateWindow {
            url: directive.popup_url(&self.popup_url),
        };
        let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            messaging::send_message(&message);
        });
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        // the listener lives as long as the button does
        on_click.forget();

        wrapper.append_child(&button)?;
        container.append_child(&wrapper)?;
        Ok(())
    }

    fn observe_child_list(
        &self,
        target: &Element,
        on_change: Box<dyn Fn()>,
    ) -> Result<DomObserver, InjectionError> {
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                log::debug!("{} mutation records", records.length());
                on_change();
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

        let options = MutationObserverInit::new();
        options.set_child_list(true);
        observer.observe_with_options(target, &options)?;

        Ok(DomObserver {
            observer,
            _callback: callback,
        })
    }
}
