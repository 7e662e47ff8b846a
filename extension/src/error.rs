use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("chain rpc error: {0}")]
    Rpc(String),

    #[error("could not decode chain response: {0}")]
    Decode(String),

    #[error("Your account has 0 balance.")]
    ZeroBalance,

    #[error("no account selected")]
    NoAccount,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("chrome.storage error: {0}")]
    Browser(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("no document available")]
    NoDocument,

    #[error("dom error: {0}")]
    Dom(String),
}

/// Render a thrown JS value as text; JS exceptions are usually `Error`
/// objects whose useful part is the string form.
pub(crate) fn js_error_text(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

impl From<JsValue> for ChainError {
    fn from(value: JsValue) -> Self {
        ChainError::Rpc(js_error_text(&value))
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(e: serde_json::Error) -> Self {
        ChainError::Decode(e.to_string())
    }
}

impl From<JsValue> for StorageError {
    fn from(value: JsValue) -> Self {
        StorageError::Browser(js_error_text(&value))
    }
}

impl From<JsValue> for InjectionError {
    fn from(value: JsValue) -> Self {
        InjectionError::Dom(js_error_text(&value))
    }
}
