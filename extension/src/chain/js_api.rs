// Bindings to the chain-client glue
// The JS side exposes `speckleChain`; every async call resolves to a JSON string.

use super::{ApiStatus, ChainClient, ChainProperties, TxStatus, TxStatusStream, VoteRequest};
use crate::error::{js_error_text, ChainError};
use crate::governance::{Referendum, ReferendumVote};
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::stream::Stream;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::task::{Context, Poll};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = speckleChain, js_name = status)]
    fn chain_status() -> Result<String, JsValue>;

    #[wasm_bindgen(catch, js_namespace = speckleChain, js_name = properties)]
    fn chain_properties() -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = speckleChain, js_name = freeBalance)]
    fn chain_free_balance(address: &str) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = speckleChain, js_name = referendum)]
    fn chain_referendum(id: u32) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = speckleChain, js_name = referendumVotes)]
    fn chain_referendum_votes(id: u32) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = speckleChain, js_name = submitVote)]
    fn chain_submit_vote(
        request: &str,
        on_status: &Closure<dyn FnMut(String)>,
    ) -> Result<js_sys::Promise, JsValue>;
}

/// Chain client backed by the `speckleChain` JS namespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsChainClient;

async fn resolve_json<T: DeserializeOwned>(
    promise: Result<js_sys::Promise, JsValue>,
) -> Result<T, ChainError> {
    let value = JsFuture::from(promise?).await?;
    let text = value
        .as_string()
        .ok_or_else(|| ChainError::Decode("expected a JSON string from speckleChain".into()))?;
    Ok(serde_json::from_str(&text)?)
}

/// Status updates pushed by the JS callback. Owns the callback so it lives
/// exactly as long as someone listens.
struct StatusStream {
    rx: mpsc::UnboundedReceiver<TxStatus>,
    _on_status: Closure<dyn FnMut(String)>,
}

impl Stream for StatusStream {
    type Item = TxStatus;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<TxStatus>> {
        self.get_mut().rx.poll_next_unpin(cx)
    }
}

#[async_trait(?Send)]
impl ChainClient for JsChainClient {
    fn status(&self) -> ApiStatus {
        match chain_status() {
            Ok(status) => match status.as_str() {
                "ready" => ApiStatus::Ready,
                "connecting" => ApiStatus::Connecting,
                other => ApiStatus::Failed(format!("unexpected chain status '{}'", other)),
            },
            // glue not loaded yet
            Err(e) if js_error_text(&e).contains("speckleChain") => ApiStatus::Connecting,
            Err(e) => ApiStatus::Failed(js_error_text(&e)),
        }
    }

    async fn properties(&self) -> Result<ChainProperties, ChainError> {
        resolve_json(chain_properties()).await
    }

    async fn free_balance(&self, address: &str) -> Result<u128, ChainError> {
        let text: String = resolve_json(chain_free_balance(address)).await?;
        text.parse()
            .map_err(|e| ChainError::Decode(format!("balance '{}': {}", text, e)))
    }

    async fn referendum(&self, id: u32) -> Result<Option<Referendum>, ChainError> {
        resolve_json(chain_referendum(id)).await
    }

    async fn referendum_votes(&self, id: u32) -> Result<Vec<ReferendumVote>, ChainError> {
        resolve_json(chain_referendum_votes(id)).await
    }

    async fn submit_vote(&self, request: VoteRequest) -> Result<TxStatusStream, ChainError> {
        let payload = serde_json::to_string(&request)?;
        let (tx, rx) = mpsc::unbounded::<TxStatus>();

        let on_status = Closure::<dyn FnMut(String)>::new(move |json: String| {
            match serde_json::from_str::<TxStatus>(&json) {
                Ok(status) => {
                    let terminal = status.is_terminal();
                    let _ = tx.unbounded_send(status);
                    if terminal {
                        tx.close_channel();
                    }
                }
                Err(e) => log::warn!("Unreadable transaction status {}: {}", json, e),
            }
        });

        JsFuture::from(chain_submit_vote(&payload, &on_status)?).await?;
        log::info!(
            "Vote on referendum #{} submitted from {}",
            request.referendum_id,
            request.address
        );

        Ok(StatusStream {
            rx,
            _on_status: on_status,
        }
        .boxed_local())
    }
}
