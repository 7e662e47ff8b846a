// Chrome Storage API Integration
// Settings and config overrides live in chrome.storage.local as JSON strings.

use crate::config::ExtensionConfig;
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"])]
    fn get(keys: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"])]
    fn set(items: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"])]
    fn clear() -> Result<js_sys::Promise, JsValue>;
}

const SETTINGS_KEY: &str = "speckle_settings";
const CONFIG_KEY: &str = "speckle_config";

/// User choices that survive popup restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SS58 address of the account shown in the popup
    pub selected_account: Option<String>,
    pub network: String,
}

impl Settings {
    pub fn from_json(json: Option<&str>) -> Result<Self, StorageError> {
        match json {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StorageManager;

impl StorageManager {
    pub fn new() -> Self {
        Self
    }

    async fn read_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        let keys = js_sys::Array::new();
        keys.push(&key.into());

        let result = JsFuture::from(get(keys.into())?).await?;
        Ok(js_sys::Reflect::get(&result, &key.into())?.as_string())
    }

    async fn write_string(&self, key: &str, value: String) -> Result<(), StorageError> {
        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &key.into(), &value.into())?;
        JsFuture::from(set(obj.into())?).await?;
        Ok(())
    }

    pub async fn load_settings(&self) -> Result<Settings, StorageError> {
        let json = self.read_string(SETTINGS_KEY).await?;
        Settings::from_json(json.as_deref())
    }

    pub async fn store_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        log::info!("Storing settings...");
        let json = serde_json::to_string(settings)?;
        self.write_string(SETTINGS_KEY, json).await?;
        log::info!("Settings stored");
        Ok(())
    }

    /// Stored config override, or the defaults when there is none or it
    /// cannot be read.
    pub async fn load_config(&self) -> ExtensionConfig {
        match self.read_string(CONFIG_KEY).await {
            Ok(json) => ExtensionConfig::from_override(json.as_deref()),
            Err(e) => {
                log::warn!("Using default config, storage unavailable: {}", e);
                ExtensionConfig::default()
            }
        }
    }

    /// Clear all storage
    pub async fn clear(&self) -> Result<(), StorageError> {
        log::info!("Clearing storage...");
        JsFuture::from(clear()?).await?;
        log::info!("Storage cleared");
        Ok(())
    }
}
