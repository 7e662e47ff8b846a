use crate::app_context::AppContext;
use crate::chain::format_balance;
use crate::icons;
use crate::poller::{Loadable, PollFailure, Query};
use dioxus::prelude::*;
use futures::FutureExt;
use std::cell::RefCell;
use std::rc::Rc;

fn balance_query(ctx: &AppContext, address: String) -> Query<String> {
    let ctx = ctx.clone();
    Rc::new(move || {
        let ctx = ctx.clone();
        let address = address.clone();
        async move {
            let properties = ctx.chain_properties().await?;
            let free = ctx.client.free_balance(&address).await?;
            Ok(format_balance(free, &properties))
        }
        .boxed_local()
    })
}

#[component]
pub fn Balance(address: String) -> Element {
    let ctx = use_context::<AppContext>();
    let mut balance = use_signal(|| Loadable::<String>::Unresolved);

    let poller = use_hook(|| Rc::new(ctx.poller(move |update| balance.set(update))));
    let polled_for = use_hook(|| Rc::new(RefCell::new(None::<String>)));

    // A new address restarts polling from attempt 1
    if polled_for.borrow().as_deref() != Some(address.as_str()) {
        *polled_for.borrow_mut() = Some(address.clone());
        let query = balance_query(&ctx, address.clone());
        let poller = poller.clone();
        spawn(async move {
            balance.set(Loadable::Unresolved);
            poller.poll(query);
        });
    }

    {
        let poller = poller.clone();
        use_drop(move || poller.teardown());
    }

    rsx! {
        div { class: "bg-gradient-to-br from-pink-500 to-pink-700 rounded-lg p-6 text-white mb-6",
            div { class: "flex items-center text-sm opacity-80 mb-2",
                icons::Wallet { class: Some("w-4 h-4 mr-2".to_string()) }
                span { "Free balance" }
            }
            match balance() {
                Loadable::Unresolved => rsx! {
                    p { class: "text-lg opacity-80", "Getting balance..." }
                },
                Loadable::Loaded(value) => rsx! {
                    h2 { class: "text-3xl font-bold", "{value}" }
                },
                Loadable::Failed(PollFailure::Unavailable) => rsx! {
                    p { class: "text-lg", "Balance not available" }
                },
                Loadable::Failed(failure) => rsx! {
                    p { class: "text-sm", "Balance not available: {failure}" }
                },
            }
            p { class: "mt-4 font-mono text-xs opacity-80 truncate", "{address}" }
        }
    }
}
