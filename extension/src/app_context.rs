// Popup-wide state shared through the Dioxus context API

use crate::chain::{ChainClient, ChainProperties};
use crate::config::ExtensionConfig;
use crate::error::ChainError;
use crate::event_loop::BrowserEventLoop;
use crate::poller::{ContextCache, Loadable, ReadinessCheck, ReadinessPoller};
use crate::services::storage::{Settings, StorageManager};
use dioxus::prelude::*;
use std::rc::Rc;

pub type Poller<T> = ReadinessPoller<BrowserEventLoop, T>;

#[derive(Clone)]
pub struct AppContext {
    pub client: Rc<dyn ChainClient>,
    pub config: Rc<ExtensionConfig>,
    pub settings: Signal<Settings>,
    /// Chain properties, fetched by the first query that needs them
    pub properties: ContextCache<ChainProperties>,
    pub storage: StorageManager,
}

// Contexts don't need real equality
impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config)
    }
}

impl AppContext {
    pub fn new(client: Rc<dyn ChainClient>, config: ExtensionConfig, settings: Signal<Settings>) -> Self {
        Self {
            client,
            config: Rc::new(config),
            settings,
            properties: ContextCache::new(),
            storage: StorageManager::new(),
        }
    }

    pub fn readiness(&self) -> ReadinessCheck {
        let client = self.client.clone();
        Rc::new(move || client.status())
    }

    pub fn poller<T: 'static>(&self, on_update: impl FnMut(Loadable<T>) + 'static) -> Poller<T> {
        ReadinessPoller::new(
            BrowserEventLoop,
            self.config.poller.clone(),
            self.readiness(),
            on_update,
        )
    }

    pub async fn chain_properties(&self) -> Result<ChainProperties, ChainError> {
        let client = self.client.clone();
        self.properties
            .get_or_fetch(|| async move { client.properties().await })
            .await
    }

    pub fn selected_account(&self) -> Option<String> {
        self.settings.read().selected_account.clone()
    }

    /// Apply a change to the settings and persist it in the background.
    pub fn update_settings(&self, change: impl FnOnce(&mut Settings)) {
        let mut settings = self.settings;
        change(&mut *settings.write());
        let snapshot = settings.read().clone();
        let storage = self.storage;
        spawn(async move {
            if let Err(e) = storage.store_settings(&snapshot).await {
                log::error!("Failed to store settings: {}", e);
            }
        });
    }
}
